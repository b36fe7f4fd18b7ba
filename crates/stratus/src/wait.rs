//! Bounded predicate polling for asynchronous server-side convergence.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::trace;

use crate::error::Error;

/// Delay between predicate invocations.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Block until `predicate` reports completion or `timeout` elapses.
///
/// The predicate is invoked repeatedly with a fixed [`POLL_INTERVAL`] between
/// calls. `Ok(true)` ends the wait successfully; an error aborts immediately
/// and is propagated; once the budget is exhausted the wait fails with
/// [`Error::Timeout`].
///
/// The predicate owns one round-trip classification per call — typically
/// mapping a reported state string to done / still converging / error.
///
/// There is no built-in cancellation; callers wanting early cancellation
/// should run the wait in a separately cancellable task.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use stratus::wait_for;
///
/// # async fn example() -> Result<(), stratus::Error> {
/// wait_for(Duration::from_secs(30), || async {
///     // one status round-trip per call
///     Ok(true)
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn wait_for<F, Fut>(timeout: Duration, mut predicate: F) -> Result<(), Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, Error>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate().await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::Timeout {
                seconds: timeout.as_secs(),
            });
        }
        trace!("condition not met, polling again");
        sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn times_out_when_predicate_never_completes() {
        let start = Instant::now();
        let result = wait_for(Duration::from_secs(2), || async { Ok(false) }).await;
        assert!(matches!(result, Err(Error::Timeout { seconds: 2 })));
        // within one poll interval of the budget
        assert!(start.elapsed() <= Duration::from_secs(2) + POLL_INTERVAL);
    }

    #[tokio::test]
    async fn propagates_predicate_error_immediately() {
        let start = std::time::Instant::now();
        let result = wait_for(Duration::from_secs(60), || async {
            Err(Error::UnknownState {
                state: "zombie".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(Error::UnknownState { .. })));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_once_predicate_completes() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = wait_for(Duration::from_secs(60), || {
            let counter = counter.clone();
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) >= 2) }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_allows_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = wait_for(Duration::ZERO, || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            }
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout { seconds: 0 })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
