use std::path::Path;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_smithy_types::DateTime;
use tokio::io::AsyncWriteExt;

use pail_core::models::{ObjectEntry, ObjectMetadata, PresignMethod};

use crate::backend::{ListPage, ListPageRequest, ObjectBackend};
use crate::config::{CredentialSource, StorageConfig};
use crate::error::StorageError;

/// [`ObjectBackend`] over the AWS S3 SDK.
#[derive(Debug, Clone)]
pub struct S3Backend {
    sdk_config: SdkConfig,
    client: Client,
}

impl S3Backend {
    /// Build the SDK config and S3 client described by `config`.
    pub async fn connect(config: &StorageConfig) -> Self {
        let sdk_config = build_sdk_config(config).await;
        let client = build_client(&sdk_config, config);
        Self { sdk_config, client }
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Build an `SdkConfig` from a region and credential source.
pub async fn build_sdk_config(config: &StorageConfig) -> SdkConfig {
    let mut builder = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    match &config.credentials {
        CredentialSource::Static {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            builder = builder.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                session_token.clone(),
                None,
                "pail-config",
            ));
        }
        CredentialSource::Profile { profile_name } => {
            builder = builder.profile_name(profile_name);
        }
        CredentialSource::DefaultChain => {}
    }

    builder.load().await
}

/// Build the S3 client, applying the custom endpoint and addressing style.
pub fn build_client(sdk_config: &SdkConfig, config: &StorageConfig) -> Client {
    let mut builder =
        aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(config.force_path_style);

    if let Some(url) = &config.endpoint_url {
        builder = builder.endpoint_url(url);
    }

    Client::from_conf(builder.build())
}

impl ObjectBackend for S3Backend {
    async fn list_page(&self, request: ListPageRequest<'_>) -> Result<ListPage, StorageError> {
        let mut req = self
            .client
            .list_objects_v2()
            .bucket(request.bucket)
            .prefix(request.prefix)
            .max_keys(request.max_keys);

        if let Some(delimiter) = request.delimiter {
            req = req.delimiter(delimiter);
        }
        if let Some(token) = request.continuation_token {
            req = req.continuation_token(token);
        }

        let resp = req.send().await.map_err(|e| StorageError::ListObjects {
            prefix: request.prefix.to_string(),
            source: Box::new(e.into()),
        })?;

        let entries = resp
            .contents()
            .iter()
            .filter_map(|obj| {
                Some(ObjectEntry {
                    key: obj.key()?.to_string(),
                    // Missing size reads as 0; see `ObjectEntry::size`.
                    size: obj.size().and_then(to_len).unwrap_or(0),
                    last_modified: obj.last_modified().and_then(to_timestamp),
                    etag: obj.e_tag().map(|s| s.to_string()),
                })
            })
            .collect();

        let next_continuation_token = if resp.is_truncated() == Some(true) {
            resp.next_continuation_token().map(|s| s.to_string())
        } else {
            None
        };

        Ok(ListPage {
            entries,
            next_continuation_token,
        })
    }

    async fn download_to_path(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, StorageError> {
        let mut resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::GetObject {
                key: key.to_string(),
                source: Box::new(e.into()),
            })?;

        // Staged next to `dest`; renamed over it only after the last chunk.
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = tempfile::NamedTempFile::new_in(dir).map_err(StorageError::io(dir))?;
        let handle = staged.as_file().try_clone().map_err(StorageError::io(staged.path()))?;
        let mut file = tokio::fs::File::from_std(handle);

        let mut written = 0_u64;
        while let Some(chunk) = resp.body.try_next().await.map_err(|source| StorageError::Body {
            key: key.to_string(),
            source,
        })? {
            file.write_all(&chunk).await.map_err(StorageError::io(staged.path()))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(StorageError::io(staged.path()))?;
        drop(file);

        staged
            .persist(dest)
            .map_err(|e| StorageError::Io {
                path: dest.to_path_buf(),
                source: e.error,
            })?;

        Ok(written)
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::GetObject {
                key: key.to_string(),
                source: Box::new(e.into()),
            })?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|source| StorageError::Body {
                key: key.to_string(),
                source,
            })?
            .into_bytes()
            .to_vec();

        Ok(body)
    }

    async fn presign(
        &self,
        bucket: &str,
        key: &str,
        method: PresignMethod,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presign_config = PresigningConfig::expires_in(expires_in)?;

        let presign_err = |source: aws_sdk_s3::Error| StorageError::Presign {
            key: key.to_string(),
            source: Box::new(source),
        };

        let presigned = match method {
            PresignMethod::GetObject => self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .presigned(presign_config)
                .await
                .map_err(|e| presign_err(e.into()))?,
            PresignMethod::PutObject => self
                .client
                .put_object()
                .bucket(bucket)
                .key(key)
                .presigned(presign_config)
                .await
                .map_err(|e| presign_err(e.into()))?,
            PresignMethod::HeadObject => self
                .client
                .head_object()
                .bucket(bucket)
                .key(key)
                .presigned(presign_config)
                .await
                .map_err(|e| presign_err(e.into()))?,
            PresignMethod::DeleteObject => self
                .client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .presigned(presign_config)
                .await
                .map_err(|e| presign_err(e.into()))?,
        };

        Ok(presigned.uri().to_string())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StorageError> {
        let resp = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::HeadObject {
                key: key.to_string(),
                source: Box::new(e.into()),
            })?;

        Ok(ObjectMetadata {
            content_length: resp.content_length().and_then(to_len),
            last_modified: resp.last_modified().and_then(to_timestamp),
            content_type: resp.content_type().map(|s| s.to_string()),
            etag: resp.e_tag().map(|s| s.to_string()),
        })
    }
}

fn to_len(len: i64) -> Option<u64> {
    u64::try_from(len).ok()
}

fn to_timestamp(dt: &DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}
