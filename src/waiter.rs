use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::errors::RelayError;

/// Deadline for any single element-interaction wait
pub const INTERACTION_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// The probe reports "not yet" by returning `None`; transient driver
/// errors are expected to be swallowed into `None` by the caller so a
/// slow render is indistinguishable from a not-yet-attached element.
/// One wait, no retries: callers compose multiple waits explicitly.
pub async fn wait_until<T, F, Fut>(timeout: Duration, mut probe: F) -> Result<T, RelayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(RelayError::Timeout(timeout));
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[path = "waiter_test.rs"]
mod waiter_test;
