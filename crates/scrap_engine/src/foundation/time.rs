//! Time management utilities
//!
//! [`Timer`] measures frame deltas; [`FramePacer`] enforces a minimum frame
//! duration. The default pacing policy spin-polls the clock until the frame
//! budget is used up, which keeps frame boundaries exact at the cost of a busy
//! core. [`PacingMode::Sleep`] trades some precision for an idle CPU.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// High-precision timer for frame timing
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// How [`FramePacer`] waits out the remainder of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PacingMode {
    /// Spin on the clock until the frame budget has elapsed
    #[default]
    Spin,
    /// Sleep for most of the remainder, then spin the final millisecond
    Sleep,
}

/// Enforces a minimum duration per frame
#[derive(Debug)]
pub struct FramePacer {
    target: Option<Duration>,
    mode: PacingMode,
    frame_start: Instant,
}

impl FramePacer {
    /// Slack left for spinning when sleeping
    const SPIN_MARGIN: Duration = Duration::from_millis(1);

    /// Create a pacer targeting `frames_per_second` (0 means uncapped)
    pub fn new(frames_per_second: u32, mode: PacingMode) -> Self {
        let mut pacer = Self {
            target: None,
            mode,
            frame_start: Instant::now(),
        };
        pacer.set_target_frame_rate(frames_per_second);
        pacer
    }

    /// Change the frame rate cap; 0 disables pacing
    pub fn set_target_frame_rate(&mut self, frames_per_second: u32) {
        self.target = (frames_per_second > 0)
            .then(|| Duration::from_secs_f64(1.0 / f64::from(frames_per_second)));
    }

    /// Minimum frame duration, if capped
    pub const fn target_frame_time(&self) -> Option<Duration> {
        self.target
    }

    /// Active pacing mode
    pub const fn mode(&self) -> PacingMode {
        self.mode
    }

    /// Block until the current frame has lasted at least the target duration
    ///
    /// Returns the full duration of the frame that just ended and starts the
    /// next one.
    pub fn wait(&mut self) -> Duration {
        if let Some(target) = self.target {
            if self.mode == PacingMode::Sleep {
                let elapsed = self.frame_start.elapsed();
                if elapsed + Self::SPIN_MARGIN < target {
                    std::thread::sleep(target - elapsed - Self::SPIN_MARGIN);
                }
            }
            while self.frame_start.elapsed() < target {
                std::hint::spin_loop();
            }
        }

        let now = Instant::now();
        let frame = now.duration_since(self.frame_start);
        self.frame_start = now;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= timer.delta_time());
    }

    #[test]
    fn test_uncapped_pacer_has_no_target() {
        let pacer = FramePacer::new(0, PacingMode::Spin);
        assert!(pacer.target_frame_time().is_none());
    }

    #[test]
    fn test_spin_pacer_holds_minimum_frame_time() {
        let mut pacer = FramePacer::new(100, PacingMode::Spin);
        let frame = pacer.wait();
        assert!(frame >= Duration::from_millis(10));
    }

    #[test]
    fn test_sleep_pacer_holds_minimum_frame_time() {
        let mut pacer = FramePacer::new(200, PacingMode::Sleep);
        let frame = pacer.wait();
        assert!(frame >= Duration::from_millis(5));
    }
}
