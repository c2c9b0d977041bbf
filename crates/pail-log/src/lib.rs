//! pail-log
//!
//! Logging context for the pail crates: a named dispatcher with optional
//! stderr and size-rotated file sinks, plus a lazily created default.

pub mod error;
pub mod format;
pub mod logger;
pub mod rotate;

pub use logger::{default_logger, LogOptions, Logger};
