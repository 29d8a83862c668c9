use rand::Rng;
use std::time::Duration;

/// Bounds for the randomized pause between attempts, sampled at
/// millisecond granularity from `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        // Degenerate range: nothing to draw from.
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rng.gen_range(min..max))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(10_000))
    }
}
