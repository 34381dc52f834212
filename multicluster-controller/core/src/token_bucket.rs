use std::time::{Duration, Instant};

/// An overall limit on how fast failed keys are retried, shared by all keys.
///
/// The bucket holds up to `burst` tokens and refills at `qps` tokens per
/// second. Each retry takes a token; once the bucket is empty, a retry is
/// delayed until its token would have been refilled. A `qps` of zero disables
/// the limit.
#[derive(Clone, Debug)]
pub struct TokenBucket {
    qps: f64,
    burst: f64,
    tokens: f64,
    last: Option<Instant>,
}

// === impl TokenBucket ===

impl Default for TokenBucket {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QPS, Self::DEFAULT_BURST)
    }
}

impl TokenBucket {
    pub const DEFAULT_QPS: u32 = 10;
    pub const DEFAULT_BURST: u32 = 100;

    pub fn new(qps: u32, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            qps: f64::from(qps),
            burst,
            tokens: burst,
            last: None,
        }
    }

    /// Takes a token at `now`, returning how long the caller must wait before
    /// using it.
    pub fn reserve(&mut self, now: Instant) -> Duration {
        if self.qps == 0.0 {
            return Duration::ZERO;
        }

        if let Some(last) = self.last {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            self.tokens = (self.tokens + elapsed * self.qps).min(self.burst);
        }
        self.last = Some(self.last.map_or(now, |last| last.max(now)));

        self.tokens -= 1.0;
        if self.tokens >= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(-self.tokens / self.qps)
    }
}
