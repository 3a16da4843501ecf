//! Time management utilities

use std::time::Instant;

/// Longest frame delta handed to the camera, in seconds.
///
/// Shader reloads and texture loads block the render thread; without a cap
/// the first frame afterwards would teleport the camera.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Frame timer producing the per-frame delta used for camera movement
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
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
            frame_count: 0,
        }
    }

    /// Update the timer (called once per frame) and return the clamped delta
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;
        self.delta_time = clamp_delta(elapsed);
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

fn clamp_delta(elapsed: f32) -> f32 {
    elapsed.clamp(0.0, MAX_FRAME_DELTA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_frames() {
        let mut timer = Timer::new();
        timer.tick();
        timer.tick();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_time() >= 0.0);
    }

    #[test]
    fn long_stalls_are_clamped() {
        assert_eq!(clamp_delta(3.0), MAX_FRAME_DELTA);
        assert_eq!(clamp_delta(0.016), 0.016);
    }
}
