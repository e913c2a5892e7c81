//! Exponential backoff retry for model runtime invocations.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::debug;

/// Total attempts per generation request.
pub const MAX_ATTEMPTS: u32 = 3;

fn backoff_schedule() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_secs(1),
        max_interval: Duration::from_secs(20),
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Run `attempt` up to [`MAX_ATTEMPTS`] times, sleeping an exponentially
/// increasing interval between failures. The final error is passed through
/// `wrap_exhausted` so callers can tag it as a retries-exhausted failure.
pub async fn retry_with_backoff<T, E, Fut, F, W>(mut attempt: F, wrap_exhausted: W) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    W: FnOnce(E) -> E,
{
    let mut schedule = backoff_schedule();
    let mut last_error = None;

    for attempt_no in 1..=MAX_ATTEMPTS {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!("Generation attempt {attempt_no}/{MAX_ATTEMPTS} failed: {e}");
                last_error = Some(e);
            }
        }

        if attempt_no < MAX_ATTEMPTS
            && let Some(wait) = schedule.next_backoff()
        {
            tokio::time::sleep(wait).await;
        }
    }

    Err(wrap_exhausted(
        last_error.expect("at least one attempt ran"),
    ))
}
