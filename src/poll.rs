//! Bounded readiness polling.
//!
//! Every "wait until X is ready" in the workflow goes through
//! [`wait_until`]: the control port answering, the tweet's action bar
//! rendering, the quote menu opening, the compose box appearing. It only
//! reports whether the condition was met; callers decide whether a miss is
//! fatal.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::trace;

// ============================================================================
// Constants
// ============================================================================

/// Floor applied to the poll interval so a zero interval cannot spin.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// Functions
// ============================================================================

/// Re-evaluates `predicate` every `interval` until it returns `true` or
/// `timeout` has elapsed.
///
/// The predicate is evaluated first at time zero and then after each
/// interval for as long as less than `timeout` has passed, so an
/// always-false predicate runs `ceil(timeout / interval)` times and the
/// call returns only after at least `timeout`.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
///
/// let found = x_quote::poll::wait_until(
///     || async { true },
///     Duration::from_secs(1),
///     Duration::from_millis(100),
/// )
/// .await;
/// assert!(found);
/// # }
/// ```
pub async fn wait_until<F, Fut>(mut predicate: F, timeout: Duration, interval: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let interval = interval.max(MIN_INTERVAL);
    let start = Instant::now();
    let mut attempts = 0_u32;

    while start.elapsed() < timeout {
        attempts += 1;
        if predicate().await {
            trace!(attempts, "Condition met");
            return true;
        }
        sleep(interval).await;
    }

    trace!(attempts, timeout_ms = timeout.as_millis() as u64, "Condition not met before deadline");
    false
}

/// Fixed delay giving the page time to settle. Zero skips it.
pub async fn grace_delay(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
