//! Bounded linear-backoff polling.
//!
//! Attach and detach return before the operating system reflects the change
//! on the filesystem. [`poll_until`] re-checks an observation on a fixed
//! schedule and gives up after a bounded number of attempts.

use std::future::Future;
use std::time::Duration;

/// Linear backoff schedule: the n-th wait (0-based) is `initial + n * increment`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearBackoff {
    /// Wait after the first failed observation
    pub initial: Duration,
    /// Added to the wait after every further failed observation
    pub increment: Duration,
    /// Total observations before giving up (at least one is always made)
    pub max_attempts: u32,
}

impl LinearBackoff {
    /// Creates a schedule.
    pub const fn new(initial: Duration, increment: Duration, max_attempts: u32) -> Self {
        Self {
            initial,
            increment,
            max_attempts,
        }
    }

    /// Wait following the given failed attempt (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial + self.increment.saturating_mul(attempt)
    }

    /// Observations made by a full run, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Sum of every wait a run that never succeeds sleeps through.
    pub fn total_wait(&self) -> Duration {
        (0..self.attempts().saturating_sub(1))
            .map(|attempt| self.delay_for(attempt))
            .sum()
    }
}

/// The observation never held within the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exhausted {
    /// Observations made
    pub attempts: u32,
}

/// Why a poll ended without the observation holding.
#[derive(Debug, PartialEq, Eq)]
pub enum PollError<E> {
    /// Every attempt observed `false`
    Exhausted(Exhausted),
    /// An observation itself failed; polling stops immediately
    Observe(E),
}

/// Repeats `observe` until it yields true or the schedule runs out.
///
/// Returns the number of observations made on success. There is no sleep
/// after the last failed observation.
pub async fn poll_until<F, Fut, E>(
    backoff: &LinearBackoff,
    mut observe: F,
) -> Result<u32, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let attempts = backoff.attempts();
    for attempt in 0..attempts {
        if observe().await.map_err(PollError::Observe)? {
            return Ok(attempt + 1);
        }
        if attempt + 1 < attempts {
            let delay = backoff.delay_for(attempt);
            log::debug!(
                "observation {}/{} not satisfied, retrying in {:?}",
                attempt + 1,
                attempts,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
    Err(PollError::Exhausted(Exhausted { attempts }))
}
