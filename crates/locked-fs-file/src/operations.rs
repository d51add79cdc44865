//! Move and delete, as operations run under the lock.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use locked_fs_core::error::OperationFault;
use locked_fs_core::traits::FileOperation;
use tracing::debug;

/// Moves a file to a new path. The locked handle is not used.
///
/// Refuses to overwrite an existing destination and creates its missing
/// parent directories. Renames when possible and falls back to
/// copy-then-remove across filesystems, keeping the modification time. Every
/// failure is raised as a fault, so the executor retries it.
#[derive(Debug, Clone)]
pub struct MoveFile {
    source: PathBuf,
    destination: PathBuf,
}

impl MoveFile {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn copy_then_remove(&self) -> Result<(), OperationFault> {
        if let Err(e) = fs::copy(&self.source, &self.destination) {
            let _ = fs::remove_file(&self.destination);
            return Err(e.into());
        }

        // Best effort, the content is already in place
        if let Err(e) = self.copy_modified_time() {
            debug!(destination = %self.destination.display(), error = %e, "could not keep modification time");
        }

        if let Err(e) = fs::remove_file(&self.source) {
            // Leave the source as the only copy
            let _ = fs::remove_file(&self.destination);
            return Err(e.into());
        }

        Ok(())
    }

    fn copy_modified_time(&self) -> std::io::Result<()> {
        let modified = fs::metadata(&self.source)?.modified()?;
        File::options()
            .write(true)
            .open(&self.destination)?
            .set_modified(modified)
    }
}

impl FileOperation for MoveFile {
    fn run(&mut self, _file: &File) -> Result<(), OperationFault> {
        if fs::symlink_metadata(&self.destination).is_ok() {
            return Err(OperationFault::DestinationExists(self.destination.clone()));
        }

        if let Some(parent) = self.destination.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        match fs::rename(&self.source, &self.destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                debug!(
                    source = %self.source.display(),
                    destination = %self.destination.display(),
                    "rename crosses devices, copying instead"
                );
                self.copy_then_remove()
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Deletes a file. The locked handle is not used.
///
/// Removal errors are suppressed: a file that cannot be deleted is treated as
/// nothing to do.
#[derive(Debug, Clone)]
pub struct DeleteFile {
    path: PathBuf,
}

impl DeleteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileOperation for DeleteFile {
    fn run(&mut self, _file: &File) -> Result<(), OperationFault> {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "delete failed, ignoring");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempfile};

    #[test]
    fn move_renames_and_keeps_content() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let destination = dir.path().join("destination.txt");
        fs::write(&source, b"contents").unwrap();

        let mut op = MoveFile::new(&source, &destination);
        op.run(&tempfile().unwrap()).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"contents");
    }

    #[test]
    fn move_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let destination = dir.path().join("nested/deeper/destination.txt");
        fs::write(&source, b"contents").unwrap();

        MoveFile::new(&source, &destination)
            .run(&tempfile().unwrap())
            .unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"contents");
    }

    #[test]
    fn move_raises_when_parent_cannot_be_created() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let blocker = dir.path().join("blocker");
        fs::write(&source, b"contents").unwrap();
        fs::write(&blocker, b"a file, not a directory").unwrap();

        let err = MoveFile::new(&source, blocker.join("destination.txt"))
            .run(&tempfile().unwrap())
            .unwrap_err();

        assert!(matches!(err, OperationFault::Io(_)));
        assert!(source.exists());
    }

    #[test]
    fn move_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let destination = dir.path().join("destination.txt");
        fs::write(&source, b"new").unwrap();
        fs::write(&destination, b"old").unwrap();

        let mut op = MoveFile::new(&source, &destination);
        let err = op.run(&tempfile().unwrap()).unwrap_err();

        assert!(matches!(err, OperationFault::DestinationExists(ref p) if p == &destination));
        assert_eq!(fs::read(&source).unwrap(), b"new");
        assert_eq!(fs::read(&destination).unwrap(), b"old");
    }

    #[test]
    fn move_of_missing_source_is_a_fault() {
        let dir = TempDir::new().unwrap();
        let mut op = MoveFile::new(dir.path().join("nope"), dir.path().join("dest"));
        let err = op.run(&tempfile().unwrap()).unwrap_err();
        assert!(matches!(err, OperationFault::Io(ref e) if e.kind() == ErrorKind::NotFound));
    }

    #[test]
    fn copy_fallback_moves_content() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let destination = dir.path().join("copied.txt");
        fs::write(&source, b"bytes").unwrap();

        MoveFile::new(&source, &destination)
            .copy_then_remove()
            .unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"bytes");
    }

    #[test]
    fn copy_fallback_keeps_modification_time() {
        use std::time::{Duration, SystemTime};

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let destination = dir.path().join("copied.txt");
        fs::write(&source, b"bytes").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();

        MoveFile::new(&source, &destination)
            .copy_then_remove()
            .unwrap();

        let modified = fs::metadata(&destination).unwrap().modified().unwrap();
        assert_eq!(modified, past);
    }

    #[test]
    fn delete_suppresses_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");
        fs::write(&path, b"x").unwrap();

        let mut op = DeleteFile::new(&path);
        op.run(&tempfile().unwrap()).unwrap();
        assert!(!path.exists());

        // Second run has nothing to remove
        op.run(&tempfile().unwrap()).unwrap();
    }
}
