use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use aws_smithy_types::error::display::DisplayErrorContext;
use pail_core::keys::DownloadTarget;
use pail_core::models::{ObjectEntry, ObjectMetadata, PresignMethod};
use pail_log::{default_logger, Logger};
use tokio::runtime::{Handle, Runtime};
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info};

use crate::backend::{ListPageRequest, ObjectBackend};
use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::s3::S3Backend;

pub const DEFAULT_MAX_KEYS: i32 = 1000;
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub prefix: String,
    /// Page size requested from the backend. Every page is fetched.
    pub max_keys: i32,
    pub delimiter: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            max_keys: DEFAULT_MAX_KEYS,
            delimiter: None,
        }
    }
}

impl ListOptions {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }
}

/// Blocking client for a single bucket.
///
/// Each call runs to completion on a private current-thread runtime, so a
/// client belongs to one caller at a time. It must not be constructed or
/// called from inside an async runtime: those calls return
/// [`StorageError::AsyncContext`]. From async code, wrap it in
/// `tokio::task::spawn_blocking` or use [`S3Backend`] directly.
pub struct StorageClient<B = S3Backend> {
    bucket: String,
    region: String,
    backend: B,
    logger: Logger,
    /// Always `Some` until drop.
    runtime: Option<Runtime>,
}

impl StorageClient<S3Backend> {
    /// Build the SDK session and client for `config`.
    ///
    /// Without an explicit logger the process default is used.
    pub fn connect(config: StorageConfig, logger: Option<Logger>) -> Result<Self, StorageError> {
        let logger = logger.unwrap_or_else(|| default_logger().clone());

        let result = start(&config, &logger);

        let (runtime, backend) = match result {
            Ok(parts) => parts,
            Err(err) => {
                logger.in_scope(|| error!(bucket = %config.bucket, error = %DisplayErrorContext(&err), "storage client init failed"));
                return Err(err);
            }
        };

        logger.in_scope(|| {
            info!(
                bucket = %config.bucket,
                region = %config.region,
                endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
                credentials = %config.credentials.describe(),
                "storage client initialized"
            )
        });

        Ok(Self {
            bucket: config.bucket,
            region: config.region,
            backend,
            logger,
            runtime: Some(runtime),
        })
    }
}

impl<B: ObjectBackend> StorageClient<B> {
    /// Wrap an already-built backend.
    pub fn with_backend(
        bucket: impl Into<String>,
        region: impl Into<String>,
        backend: B,
        logger: Option<Logger>,
    ) -> Result<Self, StorageError> {
        let bucket = bucket.into();
        if bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket name is empty".to_string()));
        }
        let runtime = new_runtime()?;
        let logger = logger.unwrap_or_else(|| default_logger().clone());
        let region = region.into();
        logger.in_scope(|| info!(bucket = %bucket, region = %region, "storage client initialized"));

        Ok(Self {
            bucket,
            region,
            backend,
            logger,
            runtime: Some(runtime),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// List every object under `options.prefix`, following continuation
    /// tokens until the backend reports the listing complete.
    pub fn list_objects(&self, options: &ListOptions) -> Result<Vec<ObjectEntry>, StorageError> {
        self.run(async {
            debug!(prefix = %options.prefix, max_keys = options.max_keys, "list_objects");

            let mut entries = Vec::new();
            let mut continuation_token: Option<String> = None;
            let mut seen_tokens = HashSet::new();

            let result = loop {
                let request = ListPageRequest {
                    bucket: &self.bucket,
                    prefix: &options.prefix,
                    max_keys: options.max_keys,
                    delimiter: options.delimiter.as_deref(),
                    continuation_token: continuation_token.as_deref(),
                };

                match self.backend.list_page(request).await {
                    Ok(page) => {
                        entries.extend(page.entries);
                        match page.next_continuation_token {
                            Some(token) if !seen_tokens.insert(token.clone()) => {
                                break Err(StorageError::Pagination {
                                    prefix: options.prefix.clone(),
                                    token,
                                });
                            }
                            Some(token) => continuation_token = Some(token),
                            None => break Ok(entries),
                        }
                    }
                    Err(err) => break Err(err),
                }
            };

            match &result {
                Ok(entries) => info!(count = entries.len(), prefix = %options.prefix, "list_objects: done"),
                Err(err) => error!(prefix = %options.prefix, error = %DisplayErrorContext(err), "list_objects failed"),
            }
            result
        })
    }

    /// Download `key` to the file chosen by `target`, creating parent
    /// directories. Returns the path written.
    pub fn download_file(&self, key: &str, target: &DownloadTarget) -> Result<PathBuf, StorageError> {
        self.run(async {
            let result: Result<PathBuf, StorageError> = async {
                let dest = target.resolve(key)?;
                if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(StorageError::io(parent))?;
                }
                info!(key, dest = %dest.display(), "download_file");

                self.backend.download_to_path(&self.bucket, key, &dest).await?;
                let size = std::fs::metadata(&dest).map_err(StorageError::io(&dest))?.len();
                info!(key, size, "download_file: done");
                Ok(dest)
            }
            .await;

            if let Err(err) = &result {
                error!(key, error = %DisplayErrorContext(err), "download_file failed");
            }
            result
        })
    }

    /// Read the whole object into memory. No size limit is applied.
    pub fn download_file_to_buffer(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.run(async {
            debug!(key, "download_file_to_buffer");
            let result = self.backend.get_bytes(&self.bucket, key).await;
            match &result {
                Ok(data) => info!(key, size = data.len(), "download_file_to_buffer: done"),
                Err(err) => error!(key, error = %DisplayErrorContext(err), "download_file_to_buffer failed"),
            }
            result
        })
    }

    /// Presign `method` on `key`, valid for `expires_in`.
    pub fn get_presigned_url(
        &self,
        key: &str,
        expires_in: Duration,
        method: PresignMethod,
    ) -> Result<String, StorageError> {
        self.run(async {
            debug!(key, expires_in = expires_in.as_secs(), %method, "get_presigned_url");
            let result = self.backend.presign(&self.bucket, key, method, expires_in).await;
            match &result {
                Ok(_) => info!(key, %method, "get_presigned_url: generated"),
                Err(err) => error!(key, error = %DisplayErrorContext(err), "get_presigned_url failed"),
            }
            result
        })
    }

    /// HEAD the object and return a normalized subset of its headers.
    pub fn get_object_metadata(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
        self.run(async {
            debug!(key, "get_object_metadata");
            let result = self.backend.head_object(&self.bucket, key).await;
            match &result {
                Ok(meta) => info!(key, size = ?meta.content_length, "get_object_metadata: done"),
                Err(err) => error!(key, error = %DisplayErrorContext(err), "get_object_metadata failed"),
            }
            result
        })
    }

    fn run<T, F>(&self, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        let runtime = match (&self.runtime, Handle::try_current()) {
            (Some(runtime), Err(_)) => runtime,
            _ => {
                let err = StorageError::AsyncContext;
                self.logger.in_scope(|| error!(bucket = %self.bucket, error = %err, "storage call rejected"));
                return Err(err);
            }
        };
        runtime.block_on(fut.with_subscriber(self.logger.dispatch()))
    }
}

impl<B> Drop for StorageClient<B> {
    fn drop(&mut self) {
        // A blocking shutdown panics inside an async context.
        if let Some(runtime) = self.runtime.take()
            && Handle::try_current().is_ok()
        {
            runtime.shutdown_background();
        }
    }
}

fn start(config: &StorageConfig, logger: &Logger) -> Result<(Runtime, S3Backend), StorageError> {
    config.validate()?;
    let runtime = new_runtime()?;
    let backend = runtime.block_on(S3Backend::connect(config).with_subscriber(logger.dispatch()));
    Ok((runtime, backend))
}

fn new_runtime() -> Result<Runtime, StorageError> {
    if Handle::try_current().is_ok() {
        return Err(StorageError::AsyncContext);
    }
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(StorageError::Runtime)
}
