use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use tracing::level_filters::LevelFilter;
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::error::LogError;
use crate::format::LineFormat;
use crate::rotate::RotatingFile;

pub const DEFAULT_NAME: &str = "pail";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_FILE_NAME: &str = "pail.log";
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_BACKUP_COUNT: usize = 3;

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Printed in every line; identifies the logger, not the module.
    pub name: String,
    pub level: LevelFilter,
    /// Extra `EnvFilter` directives layered over `level`,
    /// e.g. `aws_smithy_runtime=warn,pail_storage=trace`.
    pub directives: Option<String>,
    pub to_file: bool,
    pub to_console: bool,
    pub log_dir: PathBuf,
    pub file_name: String,
    pub max_bytes: u64,
    pub backup_count: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            level: LevelFilter::INFO,
            directives: None,
            to_file: true,
            to_console: true,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
        }
    }
}

impl LogOptions {
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }
}

#[derive(Debug)]
struct Inner {
    name: String,
    dispatch: Dispatch,
}

/// A named logging context.
///
/// Clones share sinks: [`Logger::reconfigure`] on any clone swaps the sinks
/// seen by all of them.
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<RwLock<Inner>>,
}

impl Logger {
    /// Build a logger with the sinks described by `options`.
    pub fn configure(options: &LogOptions) -> Result<Self, LogError> {
        let inner = build(options)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
        })
    }

    /// Drop the current sinks and attach the ones described by `options`.
    pub fn reconfigure(&self, options: &LogOptions) -> Result<(), LogError> {
        let fresh = build(options)?;
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }

    pub fn name(&self) -> String {
        self.read(|inner| inner.name.clone())
    }

    /// The dispatcher currently backing this logger.
    pub fn dispatch(&self) -> Dispatch {
        self.read(|inner| inner.dispatch.clone())
    }

    /// Run `f` with this logger as the thread's default subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch(), f)
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        f(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }
}

fn build(options: &LogOptions) -> Result<Inner, LogError> {
    let file = if options.to_file {
        fs::create_dir_all(&options.log_dir).map_err(|source| LogError::Io {
            path: options.log_dir.clone(),
            source,
        })?;
        Some(RotatingFile::open(
            options.log_path(),
            options.max_bytes,
            options.backup_count,
        )?)
    } else {
        None
    };
    Ok(assemble(options, file))
}

fn assemble(options: &LogOptions, file: Option<RotatingFile>) -> Inner {
    let filter = EnvFilter::builder()
        .with_default_directive(options.level.into())
        .parse_lossy(options.directives.as_deref().unwrap_or_default());

    let file_layer = file.map(|file| {
        fmt::layer()
            .event_format(LineFormat::new(&options.name))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });
    let console_layer = options.to_console.then(|| {
        fmt::layer()
            .event_format(LineFormat::new(&options.name))
            .with_writer(std::io::stderr)
    });

    let subscriber = Registry::default()
        .with(filter)
        .with(file_layer)
        .with(console_layer);

    Inner {
        name: options.name.clone(),
        dispatch: Dispatch::new(subscriber),
    }
}

static DEFAULT: OnceLock<Logger> = OnceLock::new();

/// The process-wide default logger, created with [`LogOptions::default`] on
/// first use. Later calls return the same instance untouched.
///
/// Falls back to console-only output if the log file cannot be opened.
pub fn default_logger() -> &'static Logger {
    DEFAULT.get_or_init(|| {
        let options = LogOptions::default();
        Logger::configure(&options).unwrap_or_else(|err| {
            let console = LogOptions {
                to_file: false,
                ..options
            };
            let logger = Logger {
                inner: Arc::new(RwLock::new(assemble(&console, None))),
            };
            logger.in_scope(|| tracing::warn!(error = %err, "file logging disabled"));
            logger
        })
    })
}
