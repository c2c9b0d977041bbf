//! Smoke test against a real bucket.
//!
//! Loads `.env` if present, then lists the bucket and logs the first few
//! entries. Set `PAIL_KEY` to also fetch metadata for that key, download it
//! into `./downloads` and print a presigned GET URL.
//!
//! Usage:
//!   S3_BUCKET=my-bucket \
//!   AWS_ACCESS_KEY_ID=... \
//!   AWS_SECRET_ACCESS_KEY=... \
//!   AWS_ENDPOINT_URL=https://storage.yandexcloud.net \
//!   cargo run -p pail-storage --example list_bucket

use std::path::PathBuf;

use pail_log::{LogOptions, Logger};
use pail_storage::config::bucket_from_env;
use pail_storage::{
    DownloadTarget, ListOptions, Overrides, PresignMethod, StorageClient, StorageConfig,
    DEFAULT_PRESIGN_EXPIRY,
};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let logger = Logger::configure(&LogOptions {
        level: LevelFilter::DEBUG,
        directives: std::env::var("RUST_LOG").ok(),
        ..LogOptions::default()
    })?;
    let _guard = tracing::dispatcher::set_default(&logger.dispatch());

    let Some(bucket) = bucket_from_env() else {
        warn!("set S3_BUCKET or AWS_BUCKET (or add it to .env)");
        return Ok(());
    };

    let config = StorageConfig::resolve(bucket, Overrides::default());
    let client = StorageClient::connect(config, Some(logger.clone()))?;

    info!("--- listing ---");
    let options = ListOptions {
        max_keys: 20,
        ..ListOptions::default()
    };
    let objects = match client.list_objects(&options) {
        Ok(objects) => objects,
        Err(e) => {
            error!(error = %e, "listing failed");
            return Err(e.into());
        }
    };
    info!(count = objects.len(), "objects found");
    for obj in objects.iter().take(5) {
        let modified = obj
            .last_modified
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        info!("  {} | {} bytes | {}", obj.key, obj.size, modified);
    }

    if let Ok(key) = std::env::var("PAIL_KEY") {
        let meta = client.get_object_metadata(&key)?;
        info!(?meta, "metadata");

        let path = client.download_file(&key, &DownloadTarget::Dir(PathBuf::from("downloads")))?;
        info!(path = %path.display(), "downloaded");

        let url = client.get_presigned_url(&key, DEFAULT_PRESIGN_EXPIRY, PresignMethod::GetObject)?;
        info!(%url, "presigned");
    }

    info!("done");
    Ok(())
}
