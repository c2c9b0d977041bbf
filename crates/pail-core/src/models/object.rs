use serde::{Deserialize, Serialize};

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    /// Object size in bytes. Listings that omit the size (delete markers in
    /// versioned buckets, some S3-compatible stores) report 0 here, which is
    /// indistinguishable from a genuinely empty object.
    pub size: u64,
    pub last_modified: Option<jiff::Timestamp>,
    pub etag: Option<String>,
}

/// Normalized subset of the headers returned by a HEAD request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_length: Option<u64>,
    pub last_modified: Option<jiff::Timestamp>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}
