use std::time::{Duration, Instant};

use super::PickMode;

/// Timed dice roll or chest opening that reveals a pre-drawn index.
#[derive(Debug, Clone)]
pub struct Reveal {
    pub mode: PickMode,
    pub index: usize,
    /// Die face currently shown while rolling.
    pub face: u8,
    started: Instant,
    duration: Duration,
}

impl Reveal {
    pub fn new(mode: PickMode, index: usize, duration: Duration, now: Instant) -> Self {
        Self {
            mode,
            index,
            face: 1,
            started: now,
            duration,
        }
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}
