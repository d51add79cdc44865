//! Expected outcomes of a single lock attempt.

use std::io::ErrorKind;

/// How one open→lock→run→release attempt ended, when it did not fault.
///
/// `LockUnavailable` and `IoFailure` are terminal: they are never retried by
/// the [`RetryPolicy`](crate::retry::RetryPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The lock was acquired and the operation completed.
    Success,
    /// Another holder owns the lock.
    LockUnavailable,
    /// The file could not be opened, or the lock machinery itself failed.
    IoFailure(ErrorKind),
}

impl AttemptOutcome {
    /// Whether the operation ran to completion under the lock.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short label used in tracing fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::LockUnavailable => "lock_unavailable",
            Self::IoFailure(_) => "io_failure",
        }
    }
}
