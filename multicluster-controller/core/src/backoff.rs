use std::time::Duration;

/// Per-key exponential backoff for failed reconciliations.
///
/// The n-th consecutive failure of a key waits `base * 2^(n-1)`, capped at
/// `max`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

// === impl Backoff ===

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE, Self::DEFAULT_MAX)
    }
}

impl Backoff {
    pub const DEFAULT_BASE: Duration = Duration::from_millis(5);
    pub const DEFAULT_MAX: Duration = Duration::from_secs(1000);

    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    /// Returns the delay before retrying a key that has failed `failures`
    /// times in a row. Zero failures means no delay.
    pub fn delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let exp = (failures - 1).min(31);
        self.base
            .checked_mul(1u32 << exp)
            .map_or(self.max, |d| d.min(self.max))
    }
}
