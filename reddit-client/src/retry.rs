use std::future::Future;
use std::time::Duration;
use subreply_core::{BotError, Sleeper};
use tracing::{debug, error, warn};

/// Bounded retry around rate-limited platform calls.
///
/// Only a rate-limit response with a server-supplied retry-after hint is
/// retried; the hint plus one second is slept before the next attempt. A
/// rate-limit without a hint aborts immediately rather than guessing a
/// delay, and every other error is the caller's problem.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Runs `operation` up to `max_attempts` times. Returns the first
    /// success, or the error that ended the attempt sequence.
    pub async fn run<S, F, Fut, T>(
        &self,
        sleeper: &S,
        operation_name: &str,
        mut operation: F,
    ) -> Result<T, BotError>
    where
        S: Sleeper + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BotError>>,
    {
        let mut last_error: Option<BotError> = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                debug!("Retry attempt {} for {}", attempt, operation_name);
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let hint = match err.rate_limit_hint() {
                        Some(hint) => hint,
                        // Not a rate limit; nothing to wait out.
                        None => return Err(err),
                    };

                    match hint {
                        Some(retry_after) if attempt < self.max_attempts => {
                            warn!(
                                "Rate limited on {}. Retrying after {} seconds. Attempt {}/{}",
                                operation_name, retry_after, attempt, self.max_attempts
                            );
                            sleeper
                                .sleep(Duration::from_secs(retry_after + 1))
                                .await;
                            last_error = Some(err);
                        }
                        Some(_) => {
                            last_error = Some(err);
                        }
                        None => {
                            error!(
                                "Rate limited on {} with no retry-after hint; not retrying",
                                operation_name
                            );
                            return Err(err);
                        }
                    }
                }
            }
        }

        error!(
            "Exceeded {} retry attempts for {}. Aborting.",
            self.max_attempts, operation_name
        );
        Err(last_error.unwrap_or(BotError::RedditApi(
            subreply_core::RedditApiError::RateLimitExceeded { retry_after: None },
        )))
    }
}
