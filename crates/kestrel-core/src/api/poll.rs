use std::time::Duration;

/// How long and how often to ask the reporting API for a record that is
/// still being aggregated server-side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    /// Overall deadline, measured from the first request
    pub timeout: Duration,
    /// Wait after the first unsuccessful attempt
    pub initial_interval: Duration,
    /// Growth of the wait between consecutive attempts
    pub backoff_factor: f64,
    /// Upper bound for a single wait
    pub max_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            initial_interval: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_interval: Duration::from_secs(8),
        }
    }
}

impl PollConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Wait before attempt number `attempt + 1` (0-based)
    pub fn interval(&self, attempt: u32) -> Duration {
        let base = self.initial_interval.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_interval.as_secs_f64()).max(0.0);
        Duration::from_secs_f64(capped)
    }
}
