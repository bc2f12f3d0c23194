use std::time::Duration;

/// Loop timing and budgets, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Minimum spacing between iteration starts (zero disables the limiter)
    pub min_iteration_interval: Duration,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Model calls allowed per iteration to produce a valid link
    pub link_attempts: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_iteration_interval: Duration::from_secs(15),
            base_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(300),
            link_attempts: 5,
        }
    }
}

impl PipelineSettings {
    /// Delay after the `consecutive_failures`-th failure in a row:
    /// `base × 2^(n−1)`, capped at `max_backoff`.
    pub fn backoff(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }
        let exponent = (consecutive_failures - 1).min(31);
        self.base_backoff
            .checked_mul(1u32 << exponent)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let settings = PipelineSettings {
            base_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(60),
            ..Default::default()
        };

        assert_eq!(settings.backoff(0), Duration::ZERO);
        assert_eq!(settings.backoff(1), Duration::from_secs(10));
        assert_eq!(settings.backoff(2), Duration::from_secs(20));
        assert_eq!(settings.backoff(3), Duration::from_secs(40));
        assert_eq!(settings.backoff(4), Duration::from_secs(60));
        assert_eq!(settings.backoff(u32::MAX), Duration::from_secs(60));
    }
}
