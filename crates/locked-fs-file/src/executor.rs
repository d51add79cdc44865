//! Lock-acquire-execute-release over a single file.

use std::any::Any;
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use locked_fs_core::error::{LockResult, OperationFault};
use locked_fs_core::outcome::AttemptOutcome;
use locked_fs_core::retry::{Backoff, RetryPolicy, RetryPolicyBuilder};
use locked_fs_core::traits::FileOperation;
use tracing::{Span, debug, error, field, instrument, warn};

use crate::handle::{FileLockHandle, is_contended};
use crate::operations::{DeleteFile, MoveFile};

/// Builder for [`LockedExecutor`] configuration.
#[derive(Debug, Clone, Default)]
pub struct LockedExecutorBuilder {
    retry: RetryPolicyBuilder,
}

impl LockedExecutorBuilder {
    /// Creates a builder with the default retry policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total number of attempts for faulting operations.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry = self.retry.max_attempts(max_attempts);
        self
    }

    /// Sets the delay between faulted attempts.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.retry = self.retry.backoff(backoff);
        self
    }

    /// Builds the executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry settings are invalid.
    pub fn build(self) -> LockResult<LockedExecutor> {
        Ok(LockedExecutor::new(self.retry.build()?))
    }
}

/// Runs operations on a file while holding an exclusive advisory lock on it.
///
/// Every attempt opens its own descriptor, so two attempts on the same path
/// exclude each other whether they run in one process or in two. The lock
/// is taken without blocking: a busy file is reported, not waited for.
///
/// Outcomes split into two channels:
///
/// - a busy lock or an unopenable file is an expected [`AttemptOutcome`],
///   logged as a warning and never retried;
/// - an [`OperationFault`] raised (or a panic) inside the operation re-runs the
///   whole open→lock→run→release cycle under the executor's [`RetryPolicy`].
///
/// # Example
///
/// ```rust,ignore
/// let executor = LockedExecutor::builder().max_attempts(5).build()?;
/// if !executor.move_file("inbox/job.json", "claimed/job.json") {
///     // someone else got it, or the move kept failing
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LockedExecutor {
    retry: RetryPolicy,
}

impl LockedExecutor {
    /// Creates an executor using `retry` for faulting operations.
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Returns a new builder for configuring the executor.
    pub fn builder() -> LockedExecutorBuilder {
        LockedExecutorBuilder::new()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Runs one open→lock→run→release attempt, with no retry.
    ///
    /// The file is opened read+write and never created. The lock is released
    /// and the descriptor closed before this returns, on every path.
    ///
    /// # Returns
    ///
    /// * `Ok(Success)` - Lock acquired and the operation completed
    /// * `Ok(LockUnavailable)` - Another holder owns the lock; operation not run
    /// * `Ok(IoFailure(kind))` - The file could not be opened or locked
    /// * `Err(fault)` - The operation faulted or panicked while holding the lock
    ///
    /// # Panicking operations
    ///
    /// A panicking operation does not unwind past this call, but the process
    /// panic hook still runs first, so the default hook prints a report to
    /// stderr for every panicking attempt (up to `max_attempts` per call under
    /// [`run`](Self::run)). Operations that expect to fail should return an
    /// [`OperationFault`] instead.
    #[instrument(
        skip(self, operation),
        fields(
            lock.path = %path.display(),
            backend = "file",
            acquired = field::Empty,
            outcome = field::Empty,
        )
    )]
    pub fn attempt<O>(&self, path: &Path, operation: &mut O) -> Result<AttemptOutcome, OperationFault>
    where
        O: FileOperation + ?Sized,
    {
        let name = file_name(path);

        let file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "{name} cannot be locked");
                return Ok(finish(AttemptOutcome::IoFailure(e.kind())));
            }
        };

        let mut lock = RwLock::new(file);
        let handle = match FileLockHandle::try_new(&mut lock, path) {
            Ok(handle) => handle,
            Err(e) if is_contended(&e) => {
                Span::current().record("acquired", false);
                warn!("{name} is already locked");
                return Ok(finish(AttemptOutcome::LockUnavailable));
            }
            Err(e) => {
                Span::current().record("acquired", false);
                warn!(error = %e, "{name} cannot be locked");
                return Ok(finish(AttemptOutcome::IoFailure(e.kind())));
            }
        };
        Span::current().record("acquired", true);

        let result = panic::catch_unwind(AssertUnwindSafe(|| operation.run(handle.file())));

        // Unlock before the descriptor closes with `lock`
        drop(handle);

        match result {
            Ok(Ok(())) => Ok(finish(AttemptOutcome::Success)),
            Ok(Err(fault)) => {
                Span::current().record("outcome", "fault");
                Err(fault)
            }
            Err(payload) => {
                Span::current().record("outcome", "panic");
                Err(OperationFault::Panicked(panic_message(payload.as_ref())))
            }
        }
    }

    /// Runs attempts under the retry policy until one returns an outcome.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::RetriesExhausted`](locked_fs_core::LockError) when
    /// every attempt faulted.
    #[instrument(
        skip(self, operation),
        fields(
            lock.path = %path.display(),
            backend = "file",
            max_attempts = self.retry.max_attempts(),
        )
    )]
    pub fn run<O: FileOperation>(&self, path: &Path, mut operation: O) -> LockResult<AttemptOutcome> {
        self.retry.execute(|_| self.attempt(path, &mut operation))
    }

    /// Runs `operation` while holding the lock on `path`.
    ///
    /// Returns `true` only when the lock was acquired and the operation
    /// completed. A busy lock or an I/O failure returns `false` after a single
    /// attempt; a faulting operation returns `false` once the retry policy
    /// gives up. Never panics on behalf of the operation.
    pub fn execute_with_lock<O: FileOperation>(&self, path: impl AsRef<Path>, operation: O) -> bool {
        self.settle(path.as_ref(), operation)
            .is_some_and(|outcome| outcome.is_success())
    }

    /// Moves `source` to `destination` while holding the lock on `source`.
    ///
    /// Fails (after retrying) if `destination` already exists.
    pub fn move_file(&self, source: impl AsRef<Path>, destination: impl Into<PathBuf>) -> bool {
        let source = source.as_ref();
        self.execute_with_lock(source, MoveFile::new(source, destination))
    }

    /// Deletes `source` while holding the lock on it.
    ///
    /// A source that is already gone counts as deleted. Errors from the
    /// removal itself are suppressed.
    pub fn delete_file(&self, source: impl AsRef<Path>) -> bool {
        let source = source.as_ref();
        match self.settle(source, DeleteFile::new(source)) {
            Some(AttemptOutcome::Success) => true,
            Some(AttemptOutcome::IoFailure(ErrorKind::NotFound)) => {
                debug!(lock.path = %source.display(), "nothing to delete");
                true
            }
            _ => false,
        }
    }

    /// Runs the retrying cycle and absorbs exhaustion into a logged error.
    fn settle<O: FileOperation>(&self, path: &Path, operation: O) -> Option<AttemptOutcome> {
        match self.run(path, operation) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(lock.path = %path.display(), error = %e, "locked operation failed");
                None
            }
        }
    }
}

fn finish(outcome: AttemptOutcome) -> AttemptOutcome {
    Span::current().record("outcome", outcome.as_str());
    outcome
}

fn file_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
