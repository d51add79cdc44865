//! Convenience prelude for locked file operation types.

pub use crate::error::{LockError, LockResult, OperationFault};
pub use crate::outcome::AttemptOutcome;
pub use crate::retry::{Backoff, DEFAULT_MAX_ATTEMPTS, RetryPolicy, RetryPolicyBuilder};
pub use crate::traits::{FileOperation, FromFn, from_fn};
