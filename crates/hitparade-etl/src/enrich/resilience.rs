//! Resilience primitives for enrichment lookups.

use std::cell::Cell;
use std::time::{Duration, Instant};

use backon::{BlockingRetryable, ExponentialBuilder};

use crate::error::{EnrichError, EnrichResult};

/// Minimum-interval limiter for sequential calls to one source.
///
/// Sleeps the calling thread until `interval` has passed since the previous
/// call. Lookups run one at a time, so no locking is involved.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last: Cell<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Cell::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the interval since the previous call has elapsed.
    pub fn acquire(&self) {
        if let Some(last) = self.last.get() {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last.set(Some(Instant::now()));
    }
}

/// How often a transient lookup failure is retried.
///
/// Not-found results and permanent errors are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub transient_retries: usize,
    pub min_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::never()
    }
}

impl RetryPolicy {
    /// At most one attempt per call.
    pub const fn never() -> Self {
        Self {
            transient_retries: 0,
            min_delay: Duration::from_secs(1),
        }
    }

    pub const fn transient(retries: usize, min_delay: Duration) -> Self {
        Self {
            transient_retries: retries,
            min_delay,
        }
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    pub fn run<T>(&self, op: impl FnMut() -> EnrichResult<T>) -> EnrichResult<T> {
        let mut op = op;
        if self.transient_retries == 0 {
            return op();
        }

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.transient_retries);

        op.retry(backoff)
            .sleep(std::thread::sleep)
            .when(EnrichError::is_transient)
            .notify(|err: &EnrichError, after: Duration| {
                log::warn!("Transient failure ({}), retrying in {:?}", err, after);
            })
            .call()
    }
}
