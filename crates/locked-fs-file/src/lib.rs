//! File system backend for locked file operations.
//!
//! Uses OS advisory locks (`flock` on Unix, `LockFileEx` on Windows) through
//! `fd-lock`. Locks only bind cooperating lockers on the same machine;
//! network filesystems may not honour them.
//!
//! The free functions below use [`LockedExecutor::default`]: 30 attempts for
//! faulting operations, no delay between them.

pub mod executor;
pub mod handle;
pub mod operations;

use std::path::{Path, PathBuf};

use locked_fs_core::traits::FileOperation;

pub use executor::{LockedExecutor, LockedExecutorBuilder};
pub use handle::FileLockHandle;
pub use operations::{DeleteFile, MoveFile};

/// Runs `operation` while holding the lock on `path`.
///
/// See [`LockedExecutor::execute_with_lock`].
pub fn execute_with_lock<O: FileOperation>(path: impl AsRef<Path>, operation: O) -> bool {
    LockedExecutor::default().execute_with_lock(path, operation)
}

/// Moves `source` to `destination` while holding the lock on `source`.
pub fn move_file(source: impl AsRef<Path>, destination: impl Into<PathBuf>) -> bool {
    LockedExecutor::default().move_file(source, destination)
}

/// Deletes `source` while holding the lock on it.
pub fn delete_file(source: impl AsRef<Path>) -> bool {
    LockedExecutor::default().delete_file(source)
}
