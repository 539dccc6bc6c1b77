//! Errors surfaced by the command-line shell.

use std::path::PathBuf;

use ravelock_core::{LockError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no ravel called {0}")]
    UnknownRavel(String),
    #[error("ravel {0} is not in a lock group")]
    NotLocked(String),
    /// A `--handle` argument not of the form `name=label,label,...`.
    #[error("invalid handle spec {0:?}, expected name=label,label,...")]
    InvalidHandleSpec(String),
}

pub type AppResult<T> = Result<T, AppError>;
