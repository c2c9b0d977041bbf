use std::path::PathBuf;

use aws_sdk_s3::presigning::PresigningConfigError;
use pail_core::error::CoreError;
use thiserror::Error;

/// Errors surfaced by [`crate::StorageClient`].
///
/// Backend failures keep the SDK's own error as the source; nothing is
/// retried or translated.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 ListObjectsV2 error (prefix {prefix:?}): {source}")]
    ListObjects {
        prefix: String,
        #[source]
        source: Box<aws_sdk_s3::Error>,
    },

    #[error("S3 GetObject error for {key}: {source}")]
    GetObject {
        key: String,
        #[source]
        source: Box<aws_sdk_s3::Error>,
    },

    #[error("S3 HeadObject error for {key}: {source}")]
    HeadObject {
        key: String,
        #[source]
        source: Box<aws_sdk_s3::Error>,
    },

    #[error("S3 presign error for {key}: {source}")]
    Presign {
        key: String,
        #[source]
        source: Box<aws_sdk_s3::Error>,
    },

    #[error("failed to read body of {key}: {source}")]
    Body {
        key: String,
        #[source]
        source: aws_smithy_types::byte_stream::error::Error,
    },

    #[error("invalid presigning config: {0}")]
    PresignConfig(#[from] PresigningConfigError),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("listing of prefix {prefix:?} repeated continuation token {token:?}")]
    Pagination { prefix: String, token: String },

    #[error("failed to start I/O runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("blocking storage client used from inside an async runtime")]
    AsyncContext,
}

impl StorageError {
    /// The native SDK error behind a backend failure, if any.
    pub fn sdk_error(&self) -> Option<&aws_sdk_s3::Error> {
        match self {
            StorageError::ListObjects { source, .. }
            | StorageError::GetObject { source, .. }
            | StorageError::HeadObject { source, .. }
            | StorageError::Presign { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// `NoSuchKey` from GET or the bare 404 `NotFound` from HEAD.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.sdk_error(),
            Some(aws_sdk_s3::Error::NoSuchKey(_) | aws_sdk_s3::Error::NotFound(_))
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StorageError::Io { path, source }
    }
}
