//! Exponential backoff with optional cap and jitter.
//!
//! The nominal delay before retry `i` (0 = first wait) is `base * 2^i`.
//! Cap and jitter are both off unless configured.

use std::time::Duration;
use rand::Rng;

/// Growth factor between consecutive backoff delays.
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Backoff schedule for one retry policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    base: Duration,
    max: Option<Duration>,
    jitter: f64,
}

impl Backoff {
    /// Uncapped, unjittered exponential backoff starting at `base`.
    pub fn exponential(base: Duration) -> Self {
        Self {
            base,
            max: None,
            jitter: 0.0,
        }
    }

    /// Cap every delay at `max`.
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    /// Add up to `ratio * delay` of random extra delay. Clamped to `[0, 1]`.
    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.jitter = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        self
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Delay before retry `index` without jitter. Saturates instead of overflowing.
    pub fn nominal_delay(&self, index: u32) -> Duration {
        let delay = BACKOFF_MULTIPLIER
            .checked_pow(index)
            .and_then(|factor| self.base.checked_mul(factor))
            .unwrap_or(Duration::MAX);

        match self.max {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Delay before retry `index`, jitter included.
    pub fn delay(&self, index: u32) -> Duration {
        apply_jitter(self.nominal_delay(index), self.jitter)
    }
}

fn apply_jitter(delay: Duration, ratio: f64) -> Duration {
    if ratio <= 0.0 || delay.is_zero() {
        return delay;
    }

    let spread = Duration::try_from_secs_f64(delay.as_secs_f64() * ratio).unwrap_or(Duration::ZERO);
    let spread_nanos = u64::try_from(spread.as_nanos()).unwrap_or(u64::MAX);
    if spread_nanos == 0 {
        return delay;
    }

    let extra = rand::thread_rng().gen_range(0..=spread_nanos);
    delay.saturating_add(Duration::from_nanos(extra))
}
