pub mod stub;

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use aws_sdk_s3::types::error::{NoSuchKey, NotFound};
use pail_log::{LogOptions, Logger};
use pail_storage::backend::{ListPage, ListPageRequest, ObjectBackend};
use pail_storage::{ObjectEntry, ObjectMetadata, PresignMethod, StorageClient, StorageError};

/// Sorted in-memory bucket that pages like ListObjectsV2.
#[derive(Default)]
pub struct MemoryBackend {
    objects: BTreeMap<String, Vec<u8>>,
    pub pages_served: Cell<usize>,
}

impl MemoryBackend {
    pub fn with_objects<'a>(objects: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        Self {
            objects: objects
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect(),
            pages_served: Cell::new(0),
        }
    }

    fn fetch(&self, key: &str) -> Result<&Vec<u8>, StorageError> {
        self.objects.get(key).ok_or_else(|| StorageError::GetObject {
            key: key.to_string(),
            source: Box::new(aws_sdk_s3::Error::NoSuchKey(
                NoSuchKey::builder().message("The specified key does not exist.").build(),
            )),
        })
    }
}

impl ObjectBackend for MemoryBackend {
    async fn list_page(&self, request: ListPageRequest<'_>) -> Result<ListPage, StorageError> {
        self.pages_served.set(self.pages_served.get() + 1);
        let page_size = if request.max_keys > 0 { request.max_keys as usize } else { 1000 };

        let mut matching = self
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(request.prefix))
            .filter(|(key, _)| match request.delimiter {
                Some(d) => !key[request.prefix.len()..].contains(d),
                None => true,
            })
            .filter(|(key, _)| match request.continuation_token {
                Some(after) => key.as_str() > after,
                None => true,
            });

        let entries: Vec<ObjectEntry> = matching
            .by_ref()
            .take(page_size)
            .map(|(key, body)| ObjectEntry {
                key: key.clone(),
                size: body.len() as u64,
                last_modified: None,
                etag: Some(format!("\"{:x}\"", body.len())),
            })
            .collect();

        let next_continuation_token = match matching.next() {
            Some(_) => entries.last().map(|e| e.key.clone()),
            None => None,
        };

        Ok(ListPage {
            entries,
            next_continuation_token,
        })
    }

    async fn download_to_path(&self, _bucket: &str, key: &str, dest: &Path) -> Result<u64, StorageError> {
        let body = self.fetch(key)?;
        std::fs::write(dest, body).map_err(|source| StorageError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(body.len() as u64)
    }

    async fn get_bytes(&self, _bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.fetch(key).cloned()
    }

    async fn presign(
        &self,
        bucket: &str,
        key: &str,
        method: PresignMethod,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "https://{bucket}.memory.local/{key}?op={method}&X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    async fn head_object(&self, _bucket: &str, key: &str) -> Result<ObjectMetadata, StorageError> {
        match self.objects.get(key) {
            Some(body) => Ok(ObjectMetadata {
                content_length: Some(body.len() as u64),
                content_type: Some("text/plain".to_string()),
                ..ObjectMetadata::default()
            }),
            None => Err(StorageError::HeadObject {
                key: key.to_string(),
                source: Box::new(aws_sdk_s3::Error::NotFound(NotFound::builder().build())),
            }),
        }
    }
}

/// File-only logger writing to `<dir>/logs/pail.log`.
pub fn file_logger(dir: &Path) -> (Logger, LogOptions) {
    let options = LogOptions {
        to_console: false,
        log_dir: dir.join("logs"),
        level: tracing::level_filters::LevelFilter::DEBUG,
        ..LogOptions::default()
    };
    (Logger::configure(&options).unwrap(), options)
}

/// `test-bucket` holding `a.txt` (5 bytes) and `uploads/b.txt` (10 bytes).
pub fn sample_client(dir: &Path) -> (StorageClient<MemoryBackend>, LogOptions) {
    let backend = MemoryBackend::with_objects([
        ("a.txt", b"hello".as_slice()),
        ("uploads/b.txt", b"0123456789".as_slice()),
    ]);
    let (logger, options) = file_logger(dir);
    let client = StorageClient::with_backend("test-bucket", "ru-central1", backend, Some(logger)).unwrap();
    (client, options)
}
