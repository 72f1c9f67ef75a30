use crate::dispatch::RetryPolicy;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Bound on read-transition-write retries after a version conflict.
    pub conflict_retries: usize,
    /// Retry policy applied to every external dispatch call.
    pub retry_policy: RetryPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            conflict_retries: 3,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conflict_retries(mut self, value: usize) -> Self {
        self.conflict_retries = value;
        self
    }

    pub fn with_retry_policy(mut self, value: RetryPolicy) -> Self {
        self.retry_policy = value;
        self
    }
}
