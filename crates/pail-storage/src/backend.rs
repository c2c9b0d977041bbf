//! The capabilities [`crate::StorageClient`] needs from an object store.
//!
//! [`crate::s3::S3Backend`] is the production implementation; anything else
//! (an in-memory store in tests, say) can stand in for it.

use std::path::Path;
use std::time::Duration;

use pail_core::models::{ObjectEntry, ObjectMetadata, PresignMethod};

use crate::error::StorageError;

/// One page of a listing request.
#[derive(Debug, Clone, Copy)]
pub struct ListPageRequest<'a> {
    pub bucket: &'a str,
    pub prefix: &'a str,
    pub max_keys: i32,
    pub delimiter: Option<&'a str>,
    pub continuation_token: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub entries: Vec<ObjectEntry>,
    /// Present when the backend has more entries after this page.
    pub next_continuation_token: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait ObjectBackend {
    async fn list_page(&self, request: ListPageRequest<'_>) -> Result<ListPage, StorageError>;

    /// Stream the object body into `dest`, creating or truncating it.
    /// Returns the number of bytes written.
    async fn download_to_path(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, StorageError>;

    async fn get_bytes(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn presign(
        &self,
        bucket: &str,
        key: &str,
        method: PresignMethod,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StorageError>;
}
