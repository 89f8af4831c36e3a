//! Retry policy: how many times to retry and how long to wait in between.

use std::time::Duration;

use crate::resilience::backoff::Backoff;

/// Additional attempts after the first one, unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay, unless configured otherwise.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Immutable per-invocation retry configuration.
///
/// The defaults reproduce the plain formula: `max_retries + 1` attempts with
/// waits of `base_delay * 2^i` and no cap, jitter or deadline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Backoff,
    deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// `max_retries + 1` attempts in total, saturating at `u32::MAX`
    /// attempts. Loaded configuration is capped far lower by validation.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::exponential(base_delay),
            deadline: None,
        }
    }

    pub fn from_millis(max_retries: u32, base_delay_ms: u64) -> Self {
        Self::new(max_retries, Duration::from_millis(base_delay_ms))
    }

    /// Cap each backoff delay at `max_delay`.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.backoff = self.backoff.with_max(max_delay);
        self
    }

    /// Randomize each delay upwards by up to `ratio` of itself.
    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.backoff = self.backoff.with_jitter(ratio);
        self
    }

    /// Bound the whole invocation, attempts and waits included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts an always-failing operation receives, at most `u32::MAX`.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn base_delay(&self) -> Duration {
        self.backoff.base()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Wait inserted after failed attempt `retry_index + 1`.
    pub fn delay_before_retry(&self, retry_index: u32) -> Duration {
        self.backoff.delay(retry_index)
    }

    /// Nominal waits an always-failing operation would go through, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries)
            .map(|index| self.backoff.nominal_delay(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.base_delay(), Duration::from_millis(1000));
        assert_eq!(policy.deadline(), None);
        assert_eq!(policy.backoff().max(), None);
        assert_eq!(policy.backoff().jitter(), 0.0);
    }

    #[test]
    fn test_schedule_strictly_increases() {
        let policy = RetryPolicy::from_millis(5, 100);
        let schedule = policy.schedule();
        assert_eq!(schedule.len(), 5);
        assert!(schedule.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(
            schedule.iter().sum::<Duration>(),
            Duration::from_millis(100 + 200 + 400 + 800 + 1600)
        );
    }

    #[test]
    fn test_zero_retries_has_empty_schedule() {
        let policy = RetryPolicy::from_millis(0, 500);
        assert_eq!(policy.max_attempts(), 1);
        assert!(policy.schedule().is_empty());
    }

    #[test]
    fn test_max_attempts_saturates() {
        assert_eq!(RetryPolicy::from_millis(u32::MAX, 1).max_attempts(), u32::MAX);
    }

    #[test]
    fn test_builder_options() {
        let policy = RetryPolicy::from_millis(4, 100)
            .with_max_delay(Duration::from_millis(300))
            .with_deadline(Duration::from_secs(2));
        assert_eq!(
            policy.schedule(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300),
                Duration::from_millis(300),
            ]
        );
        assert_eq!(policy.deadline(), Some(Duration::from_secs(2)));
    }
}
