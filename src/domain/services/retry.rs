use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::domain::ports::SendOutcome;

/// Backoff schedule that doubles per attempt: `base`, `2*base`, `4*base`, ...
/// `attempt` is 1-based (the attempt that just failed).
pub fn exponential_backoff(base: Duration) -> impl Fn(u32) -> Duration {
    move |attempt| base * 2u32.saturating_pow(attempt.saturating_sub(1))
}

/// Bounded retry around a single send operation. Runs `op` up to
/// `max_attempts` times; between a retryable failure and the next attempt it
/// waits `backoff(attempt)`. A non-retryable failure or exhaustion returns
/// the last outcome unchanged. Independent of any particular transport.
pub async fn send_with_retry<F, Fut>(
    mut op: F,
    max_attempts: u32,
    backoff: impl Fn(u32) -> Duration,
) -> SendOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SendOutcome>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            SendOutcome::Delivered { message_id } => {
                return SendOutcome::Delivered { message_id };
            }
            SendOutcome::Failed { kind, retryable } => {
                if !retryable || attempt >= max_attempts {
                    return SendOutcome::Failed { kind, retryable };
                }
                let wait = backoff(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    ?kind,
                    backoff_ms = wait.as_millis() as u64,
                    "send attempt failed, backing off before retry"
                );
                sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
