//! Error types for the headless runner.
//!
//! Uses `thiserror` to gather every failure that can stop a run: bad
//! arguments, configuration, the save directory, and runtime startup.

use simsims_core::serialize::LoadError;
use simsims_data::{DataLoadError, SaveStoreError};

/// Errors that end a headless run.
#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    /// The command line could not be understood.
    #[error("usage error: {0}")]
    Usage(String),

    /// The configuration file could not be found or parsed.
    #[error("config error: {0}")]
    Config(#[from] DataLoadError),

    /// Reading or writing the save directory failed.
    #[error("save directory error: {0}")]
    Store(#[from] SaveStoreError),

    /// The newest save could not be applied to the economy.
    #[error("restore error: {0}")]
    Restore(#[from] LoadError),

    /// The tokio runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}
