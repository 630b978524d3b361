#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Frame clock feeding `Formation::update(dt, elapsed)`.
///
/// Runs either from the wall clock ([`FrameClock::tick`]) or from a fixed
/// step ([`FrameClock::advance`]) for deterministic, headless stepping.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_update: Instant,
    /// Time since the previous frame
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of frames
    pub frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances from the wall clock.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.step(now - self.last_update);
        self.last_update = now;
    }

    /// Advances by a fixed step, ignoring the wall clock.
    pub fn advance(&mut self, step: Duration) {
        self.step(step);
    }

    fn step(&mut self, step: Duration) {
        self.delta = step;
        self.elapsed += step;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
