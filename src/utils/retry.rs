use rand::Rng;
use std::fmt::Display;
use std::future::Future;

/// Exponential backoff retry handler with jitter
#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetry {
    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum number of retry attempts
    max_retries: u32,

    /// Current attempt number (for calculating delay)
    current_attempt: u32,
}

impl ExponentialBackoffRetry {
    pub fn new(base_delay_ms: u64, max_retries: u32) -> Self {
        Self {
            base_delay_ms,
            max_retries,
            current_attempt: 0,
        }
    }

    /// Runs `operation` until it succeeds, fails with an error `retryable`
    /// rejects, or the retry budget is spent. The last error is returned
    /// unchanged so callers can still classify it.
    pub async fn execute<F, Fut, T, E, P>(&mut self, mut operation: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            self.current_attempt = attempt;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.max_retries && retryable(&e) => {
                    let delay_ms = self.calculate_delay(attempt);
                    tracing::warn!(
                        "store call failed (attempt {}/{}): {} - retrying in {}ms",
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay_ms
                    );

                    tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Calculate delay for current attempt using exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let exponential_delay = self.base_delay_ms.saturating_mul(2_u64.saturating_pow(attempt));
        let jitter_factor = 0.1; // ±10% jitter
        let jitter_range = (exponential_delay as f64 * jitter_factor) as u64;

        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(0..=jitter_range * 2) as i64 - jitter_range as i64;

        let final_delay = (exponential_delay as i64 + jitter).max(0) as u64;

        // Cap at 30 seconds to prevent excessively long waits
        final_delay.min(30_000)
    }

    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }
}
