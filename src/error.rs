use crate::signature::SignatureConflict;
use std::path::PathBuf;
use thiserror::Error;

/// Anything wrong with the on-disk store. None of these are recoverable
/// within a pass: once the store can't be trusted neither can the registry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access message store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("message store {} is corrupt at line {line}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("message store {} holds conflicting signatures: {conflict}", path.display())]
    Conflict {
        path: PathBuf,
        conflict: SignatureConflict,
    },
    #[error("message store {} is empty", path.display())]
    Empty { path: PathBuf },
    #[error("failed to replace message store {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum EventsError {
    #[error("failed to read unit {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse unit {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}
