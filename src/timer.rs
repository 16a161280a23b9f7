use std::time::Duration;

/// Countdown advanced explicitly by the frame loop, so tests can drive it
/// without touching the wall clock.
#[derive(Debug, Clone)]
pub struct Countdown {
    limit: Duration,
    remaining: Duration,
}

impl Countdown {
    pub fn new(limit: Duration) -> Self {
        Countdown {
            limit,
            remaining: limit,
        }
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }

    pub fn reset(&mut self) {
        self.remaining = self.limit;
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining.as_secs_f64()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}
