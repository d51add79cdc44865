//! Error types for locked file operations.

use std::path::PathBuf;
use thiserror::Error;

/// A fault raised by an operation while it holds the lock.
///
/// Faults are the only failures eligible for retry. Expected outcomes such as
/// a busy lock or an unopenable file are reported through
/// [`AttemptOutcome`](crate::outcome::AttemptOutcome) instead.
#[derive(Error, Debug)]
pub enum OperationFault {
    /// The operation's own I/O failed (e.g. a rename or copy).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A move was asked to overwrite an existing destination.
    #[error("destination '{}' already exists", .0.display())]
    DestinationExists(PathBuf),

    /// The operation cannot be run at all (e.g. none was supplied).
    #[error("invalid operation: {0}")]
    Invalid(String),

    /// The operation panicked while the lock was held.
    #[error("operation panicked: {0}")]
    Panicked(String),

    /// Any other caller-defined failure.
    #[error("operation error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors surfaced by the retrying executor.
#[derive(Error, Debug)]
pub enum LockError {
    /// Every attempt raised a fault; carries the last one.
    #[error("operation failed after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: OperationFault,
    },

    /// The retry policy was configured with impossible values.
    #[error("invalid retry configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
