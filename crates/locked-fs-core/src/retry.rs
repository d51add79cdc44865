//! Bounded retry of faulting attempts.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{LockError, LockResult, OperationFault};

/// Attempt ceiling used by [`RetryPolicy::default`].
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Delay inserted between a faulted attempt and the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Re-attempt immediately.
    #[default]
    None,
    /// Sleep the same duration before every re-attempt.
    Fixed(Duration),
    /// Double the delay after every fault, starting at `initial` and capped
    /// at `max`, with ±25% jitter.
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay to sleep before re-attempt number `retry` (1-based).
    ///
    /// `seed` drives the jitter of exponential backoff; any varying value
    /// works, callers pass elapsed nanoseconds.
    pub fn delay(&self, retry: u32, seed: u64) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let factor = 1u32
                    .checked_shl(retry.saturating_sub(1))
                    .unwrap_or(u32::MAX);
                let base = initial.saturating_mul(factor).min(max);

                // Jitter (±25%) keeps concurrent retriers from re-colliding
                let base_ms = base.as_millis() as u64;
                let jitter_range = base_ms / 4;
                if jitter_range == 0 {
                    return base;
                }
                let offset = seed % (jitter_range * 2 + 1);
                let jittered_ms = (base_ms - jitter_range) + offset;
                Duration::from_millis(jittered_ms).min(max)
            }
        }
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicyBuilder {
    /// Creates a builder with the default ceiling and no backoff.
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::None,
        }
    }

    /// Sets the total number of attempts, the first one included.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay between attempts.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Builds the policy.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::InvalidConfig`] if `max_attempts` is zero or an
    /// exponential backoff starts above its own cap.
    pub fn build(self) -> LockResult<RetryPolicy> {
        if self.max_attempts == 0 {
            return Err(LockError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if let Backoff::Exponential { initial, max } = self.backoff
            && initial > max
        {
            return Err(LockError::InvalidConfig(format!(
                "exponential backoff starts at {initial:?}, above its cap of {max:?}"
            )));
        }

        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: self.backoff,
        })
    }
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-runs a unit of work while it raises [`OperationFault`]s, up to a fixed
/// number of attempts.
///
/// A unit that returns `Ok` is done, whatever the value: expected outcomes
/// like a busy lock are not retried here. Policies are plain values; build one
/// per executor rather than sharing a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Returns a new builder for configuring the policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// Creates a policy with `max_attempts` and no backoff.
    pub fn new(max_attempts: u32) -> LockResult<Self> {
        Self::builder().max_attempts(max_attempts).build()
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Runs `unit` until it returns `Ok` or the attempt ceiling is reached.
    ///
    /// `unit` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::RetriesExhausted`] with the last fault when every
    /// attempt faulted.
    pub fn execute<T, F>(&self, mut unit: F) -> LockResult<T>
    where
        F: FnMut(u32) -> Result<T, OperationFault>,
    {
        let start = Instant::now();
        let mut attempt = 1;

        loop {
            match unit(attempt) {
                Ok(value) => return Ok(value),
                Err(fault) if attempt >= self.max_attempts => {
                    return Err(LockError::RetriesExhausted {
                        attempts: attempt,
                        source: fault,
                    });
                }
                Err(fault) => {
                    debug!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %fault,
                        "attempt faulted, retrying"
                    );

                    let delay = self
                        .backoff
                        .delay(attempt, start.elapsed().as_nanos() as u64);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::None,
        }
    }
}
