//! Core types for mutually-exclusive, retrying file operations.
//!
//! This crate holds the pieces shared by every executor: the
//! [`FileOperation`] seam, the expected [`AttemptOutcome`]s of one lock
//! attempt, the [`OperationFault`] channel for unexpected failures, and the
//! [`RetryPolicy`] that re-runs faulting attempts.

pub mod error;
pub mod outcome;
pub mod prelude;
pub mod retry;
pub mod traits;

pub use error::{LockError, LockResult, OperationFault};
pub use prelude::*;
