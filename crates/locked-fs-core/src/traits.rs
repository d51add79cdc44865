//! The operation seam between the executor and its callers.

use std::fs::File;

use crate::error::OperationFault;

/// Work performed while the executor holds the lock on a file.
///
/// The operation borrows the open, locked handle for the duration of the call
/// and never owns it. It may be invoked more than once when a previous
/// attempt faulted, so implementations take `&mut self`.
///
/// # Example
///
/// ```rust,ignore
/// let executor = LockedExecutor::default();
/// let ok = executor.execute_with_lock(&path, from_fn(|file| {
///     file.sync_all()?;
///     Ok(())
/// }));
/// ```
pub trait FileOperation {
    /// Runs the operation against the locked handle.
    fn run(&mut self, file: &File) -> Result<(), OperationFault>;
}

/// Operation backed by a closure. Created by [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

/// Wraps a closure as a [`FileOperation`].
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&File) -> Result<(), OperationFault>,
{
    FromFn(f)
}

impl<F> FileOperation for FromFn<F>
where
    F: FnMut(&File) -> Result<(), OperationFault>,
{
    fn run(&mut self, file: &File) -> Result<(), OperationFault> {
        (self.0)(file)
    }
}

/// A missing operation faults every time it is invoked.
impl<T: FileOperation> FileOperation for Option<T> {
    fn run(&mut self, file: &File) -> Result<(), OperationFault> {
        match self {
            Some(op) => op.run(file),
            None => Err(OperationFault::Invalid("no operation supplied".to_string())),
        }
    }
}

impl<T: FileOperation + ?Sized> FileOperation for &mut T {
    fn run(&mut self, file: &File) -> Result<(), OperationFault> {
        (**self).run(file)
    }
}

impl<T: FileOperation + ?Sized> FileOperation for Box<T> {
    fn run(&mut self, file: &File) -> Result<(), OperationFault> {
        (**self).run(file)
    }
}
