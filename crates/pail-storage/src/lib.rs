//! pail-storage
//!
//! Blocking S3 client bound to one bucket. Thin wrapper around the AWS S3
//! SDK that logs every call through a [`pail_log::Logger`].

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod s3;

pub use client::{ListOptions, StorageClient, DEFAULT_PRESIGN_EXPIRY};
pub use config::{CredentialSource, Overrides, StorageConfig};
pub use error::StorageError;
pub use pail_core::keys::DownloadTarget;
pub use pail_core::models::{ObjectEntry, ObjectMetadata, PresignMethod};
