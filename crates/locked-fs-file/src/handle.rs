//! File lock handle implementation.

use std::fs::File;
use std::io;
use std::path::Path;

use fd_lock::{RwLock, RwLockWriteGuard};
use tracing::trace;

/// Handle for a held exclusive lock on an open file.
///
/// Dropping this handle releases the lock. The descriptor itself belongs to
/// the [`RwLock`] the handle borrows from and is closed when that is dropped,
/// so the lock is always released before the file is closed.
pub struct FileLockHandle<'a> {
    guard: RwLockWriteGuard<'a, File>,
    path: &'a Path,
}

impl<'a> FileLockHandle<'a> {
    /// Tries to take the exclusive lock without blocking.
    ///
    /// Fails with [`io::ErrorKind::WouldBlock`] (or the platform's lock
    /// violation code) when another descriptor holds the lock.
    pub(crate) fn try_new(lock: &'a mut RwLock<File>, path: &'a Path) -> io::Result<Self> {
        let guard = lock.try_write()?;
        trace!(lock.path = %path.display(), "file lock acquired");
        Ok(Self { guard, path })
    }

    /// The open, locked file.
    pub fn file(&self) -> &File {
        &self.guard
    }

    /// The path the lock was taken on.
    pub fn path(&self) -> &Path {
        self.path
    }
}

impl Drop for FileLockHandle<'_> {
    fn drop(&mut self) {
        // The guard field drops right after this and unlocks the descriptor
        trace!(lock.path = %self.path.display(), "releasing file lock");
    }
}

/// Whether a failed `try_write` means another holder owns the lock.
pub(crate) fn is_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // ERROR_LOCK_VIOLATION
    #[cfg(windows)]
    if err.raw_os_error() == Some(33) {
        return true;
    }

    false
}
