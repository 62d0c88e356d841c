use crate::animate::FrameTime;
use std::time::Instant;

/// Longest delta handed to update callbacks; longer stalls (window drag, breakpoint)
/// are clamped so the cubes do not jump. Elapsed time is not clamped and keeps
/// following the clock.
pub const MAX_DELTA: f64 = 0.1;

/// Produces [`FrameTime`]s from wall-clock time, or from explicit deltas when driven
/// headless.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f64,
    frame: u64,
    max_delta: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            frame: 0,
            max_delta: MAX_DELTA,
        }
    }

    pub fn with_max_delta(mut self, max_delta: f64) -> Self {
        self.max_delta = max_delta;
        self
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance by the wall-clock time since the previous tick.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.advance(delta)
    }

    /// Advance by an explicit delta. Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, delta: f64) -> FrameTime {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.frame += 1;
        self.elapsed += delta;
        FrameTime::new(self.frame, self.elapsed, delta.min(self.max_delta))
    }

    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.elapsed = 0.0;
        self.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(0.016);
        let t = clock.advance(0.016);
        assert_eq!(t.frame, 2);
        assert_eq!(t.delta, 0.016);
        assert!((t.elapsed - 0.032).abs() < 1e-12);
    }

    #[test]
    fn long_stalls_clamp_delta_but_not_elapsed() {
        let mut clock = FrameClock::new();
        clock.advance(0.5);
        let t = clock.advance(2.5);
        assert_eq!(t.delta, MAX_DELTA);
        assert_eq!(t.elapsed, 3.0);
        assert_eq!(clock.elapsed(), 3.0);
    }

    #[test]
    fn bad_deltas_count_as_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(-1.0).delta, 0.0);
        assert_eq!(clock.advance(f64::NAN).delta, 0.0);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn tick_is_non_negative_and_bounded() {
        let mut clock = FrameClock::new().with_max_delta(0.05);
        let t = clock.tick();
        assert!(t.delta >= 0.0 && t.delta <= 0.05);
    }

    #[test]
    fn reset_starts_over() {
        let mut clock = FrameClock::new();
        clock.advance(0.05);
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }
}
