//! Retry policies for HTTP requests.

use std::time::Duration;

/// Retry policy for a single request.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// No retries. The only safe default for non-idempotent POSTs.
    #[default]
    None,
    /// Retry transport failures and 429/502/503/504 with backoff.
    Idempotent,
    /// Caller-provided retry behavior.
    Custom(RetryConfig),
}

/// Backoff configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retry attempts beyond the initial request.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// Randomize each delay by ±25% to avoid thundering herds.
    pub jitter: bool,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Config used for idempotent (GET) requests: also retries 429.
    pub fn idempotent() -> Self {
        Self {
            retryable_statuses: vec![429, 502, 503, 504],
            ..Self::default()
        }
    }

    /// Delay before retry `attempt` (0-indexed), capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            let spread = capped * 0.25;
            let offset = (rand::random::<f64>() - 0.5) * 2.0 * spread;
            (capped + offset).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(final_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_never_retries() {
        assert!(matches!(RetryPolicy::default(), RetryPolicy::None));
    }

    #[test]
    fn idempotent_config_retries_rate_limits() {
        let config = RetryConfig::idempotent();
        assert!(config.retryable_statuses.contains(&429));
        assert!(config.retryable_statuses.contains(&503));
    }

    #[test]
    fn backoff_doubles_without_jitter() {
        let config = RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for_attempt(0).as_millis(), 200);
        assert_eq!(config.delay_for_attempt(1).as_millis(), 400);
        assert_eq!(config.delay_for_attempt(2).as_millis(), 800);
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = RetryConfig {
            jitter: false,
            max_delay: Duration::from_millis(500),
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for_attempt(10).as_millis(), 500);
    }
}
