//! Bounded polling shared by every completion detector

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Interval and overall bound of a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSpec {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for PollSpec {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError<E> {
    #[error("condition not met after {waited:?}")]
    Timeout { waited: Duration },
    #[error(transparent)]
    Check(E),
}

/// Poll `check` until it yields `Some`, fails, or `spec.timeout` elapses.
///
/// The check runs at least once, and once more when the deadline is reached,
/// so a condition that becomes true exactly at the bound still succeeds.
/// Sleeps go through `tokio::time`, which lets a paused clock drive tests.
pub async fn await_predicate<T, E, F, Fut>(
    mut check: F,
    spec: PollSpec,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = Instant::now();
    let deadline = started + spec.timeout;
    let interval = spec.interval.max(MIN_INTERVAL);

    loop {
        if let Some(value) = check().await.map_err(PollError::Check)? {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::Timeout {
                waited: now - started,
            });
        }
        sleep(interval.min(deadline - now)).await;
    }
}
