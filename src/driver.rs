//! Fixed-rate frame driver
//!
//! Converts display refresh timestamps into a whole number of simulation
//! ticks at `SIM_DT`. Long stalls (tab switches, breakpoints) are capped so
//! the game never tries to catch up on seconds of backlog.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame delta accepted, in seconds
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    accumulator: f32,
    /// Timestamp of the previous frame in milliseconds
    last_time: Option<f64>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks to run for a frame at `time_ms`
    ///
    /// The first frame after construction or `reset` runs one tick.
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);
        self.advance_by(dt)
    }

    /// Number of ticks to run for an elapsed `dt` in seconds
    pub fn advance_by(&mut self, dt: f32) -> u32 {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        // Drop whatever backlog the substep cap left behind
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Forget timing history (after a pause or a game switch)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_one_tick() {
        let mut driver = FrameDriver::new();
        assert_eq!(driver.advance(12_345.0), 1);
    }

    #[test]
    fn test_steady_refresh_tracks_wall_clock() {
        let mut driver = FrameDriver::new();
        let mut ticks = 0;
        for i in 0..=120 {
            ticks += driver.advance(i as f64 * 1000.0 / 60.0);
        }
        // Two seconds of refreshes (plus the first frame's tick)
        assert!((119..=121).contains(&ticks), "ticks = {}", ticks);
    }

    #[test]
    fn test_substep_cap() {
        let mut driver = FrameDriver::new();
        assert_eq!(driver.advance_by(5.0), MAX_SUBSTEPS);
        // The backlog is dropped rather than replayed
        assert!(driver.advance_by(0.0) <= 1);
    }

    #[test]
    fn test_negative_and_nan_deltas_are_ignored() {
        let mut driver = FrameDriver::new();
        assert_eq!(driver.advance_by(-1.0), 0);
        assert_eq!(driver.advance_by(f32::NAN), 0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut driver = FrameDriver::new();
        driver.advance(0.0);
        driver.advance(1000.0);
        driver.reset();
        assert_eq!(driver.advance(50_000.0), 1);
    }
}
