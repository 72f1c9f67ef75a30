use log::{info, warn};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use super::super::services::ServiceError;

/// Bounded exponential backoff for external calls. Transient failures are
/// retried up to `max_attempts`; permanent failures are returned at once.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(4),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, value: usize) -> Self {
        self.max_attempts = value;
        self
    }

    pub fn with_initial_delay(mut self, value: Duration) -> Self {
        self.initial_delay = value;
        self
    }

    pub fn with_backoff_factor(mut self, value: f64) -> Self {
        self.backoff_factor = value;
        self
    }

    pub fn with_max_delay(mut self, value: Duration) -> Self {
        self.max_delay = value;
        self
    }

    pub fn with_jitter(mut self, value: bool) -> Self {
        self.jitter = value;
        self
    }

    /// Delay before the attempt following `attempt` (1-based), exponential
    /// and capped at `max_delay`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponential =
            self.initial_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32 - 1);
        let capped = exponential.min(self.max_delay.as_secs_f64());
        let delayed = if self.jitter {
            capped * rand::thread_rng().gen_range(0.5..=1.0)
        } else {
            capped
        };
        Duration::from_secs_f64(delayed)
    }

    /// Run `operation` under this policy. The last error is returned once
    /// retries are exhausted or a permanent error is seen.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;
            match operation().await {
                Ok(value) => {
                    if attempts > 1 {
                        info!("{} succeeded on attempt {}/{}", label, attempts, self.max_attempts);
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_transient() => {
                    warn!("{} failed permanently: {}", label, error);
                    return Err(error);
                }
                Err(error) => {
                    if attempts < self.max_attempts {
                        let delay = self.delay_for(attempts);
                        warn!(
                            "{} failed on attempt {}/{}: {}; retrying after {:?}",
                            label, attempts, self.max_attempts, error, delay
                        );
                        sleep(delay).await;
                    } else {
                        warn!("{} failed after {} attempts: {}", label, attempts, error);
                        return Err(error);
                    }
                }
            }
        }
    }
}
