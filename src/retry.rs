//! Client-side retry with exponential backoff.
//!
//! The server never retries; callers may wrap transient failures with this
//! helper. For money movements the closure must capture the SAME
//! idempotency key on every attempt, so a retried transfer either commits
//! once or reports the duplicate.

use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const BACKOFF_COEFFICIENT: u32 = 2;
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Run `operation` until it succeeds or `max_attempts` is reached,
/// sleeping 100ms, 200ms, 400ms, ... between attempts. The last error is
/// returned when every attempt fails. Cancellation is the usual story:
/// drop the returned future and no further attempt starts.
pub async fn retry<F, Fut, T, E>(mut operation: F, max_attempts: u32) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(err);
                }

                tokio::time::sleep(backoff).await;
                backoff *= BACKOFF_COEFFICIENT;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            },
            DEFAULT_MAX_ATTEMPTS,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = retry(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err("transient") } else { Ok(n) } }
            },
            DEFAULT_MAX_ATTEMPTS,
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("permanent") }
            },
            3,
        )
        .await;

        assert_eq!(result.unwrap_err(), "permanent");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
