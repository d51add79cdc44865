//! Mutually-exclusive, retrying move and delete of a single file.
//!
//! Several independent processes may race to move or delete the same file.
//! Each call here opens the file, takes an exclusive advisory lock without
//! waiting, runs the operation and releases the lock. Whoever gets the lock
//! first wins; the others get `false` back immediately.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use locked_fs::*;
//!
//! // Claim a job file: only one worker's move can succeed
//! if move_file("/var/spool/jobs/42.json", "/var/spool/claimed/42.json") {
//!     println!("claimed job 42");
//! }
//!
//! // Custom operation under the lock, with a smaller retry ceiling
//! let executor = LockedExecutor::builder().max_attempts(5).build()?;
//! let flushed = executor.execute_with_lock("/var/spool/jobs/43.json", from_fn(|file| {
//!     file.sync_all()?;
//!     Ok(())
//! }));
//! # Ok::<(), LockError>(())
//! ```
//!
//! # Failure model
//!
//! Every public operation returns a `bool`:
//!
//! | Outcome | Retried? | Result |
//! |---|---|---|
//! | Operation completed under the lock | n/a | `true` |
//! | Lock already held | No | `false` |
//! | File could not be opened or locked | No | `false` |
//! | Operation raised a fault or panicked | Yes, up to the ceiling | `false` once exhausted |
//!
//! Use [`LockedExecutor::run`] or [`LockedExecutor::attempt`] to see which
//! case happened.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `locked-fs-core`: outcomes, errors, retry policy, the operation trait
//! - `locked-fs-file`: the advisory-lock executor and move/delete operations

pub use locked_fs_core::*;
pub use locked_fs_file::*;
