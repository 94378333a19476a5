/// Frame timing for the simulation loop
///
/// The platform decides when a frame runs (vsync-gated redraws); this clock only
/// turns "seconds since start" into per-frame deltas for the physics step and
/// keeps some frame statistics.
use std::collections::VecDeque;
use std::time::Instant;

/// Target physics/update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of physics steps per frame to prevent spiral of death
pub const MAX_SUB_STEPS: u32 = 3;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Where the loop is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No frame has run yet
    Idle,
    /// Steady per-frame cycle; there is no state after this
    Running,
}

/// Frame clock state
pub struct FrameClock {
    /// Time when the simulation started
    start_time: Instant,

    state: LoopState,

    /// Elapsed time seen by the previous frame (0 before the first frame)
    previous_elapsed: f32,

    /// Frame timing history for FPS calculation
    frame_times: VecDeque<f32>,

    /// Current frame number
    frame_count: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,
}

impl FrameClock {
    /// Create a new clock; simulation time starts now
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            state: LoopState::Idle,
            previous_elapsed: 0.0,
            frame_times: VecDeque::with_capacity(FPS_WINDOW_SIZE + 1),
            frame_count: 0,
            current_fps: 0.0,
        }
    }

    /// Monotonic seconds since the clock was created
    pub fn elapsed_secs(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32()
    }

    /// Begin a frame at `elapsed` seconds since start; returns the frame delta
    ///
    /// The first frame measures from zero, so its delta is the whole time spent
    /// starting up. That is expected: the physics sub-step cap bounds how much of
    /// it gets simulated.
    pub fn tick(&mut self, elapsed: f32) -> f32 {
        let delta = elapsed - self.previous_elapsed;
        self.previous_elapsed = elapsed;
        self.state = LoopState::Running;
        self.frame_count += 1;

        // Store frame time for FPS calculation
        self.frame_times.push_back(delta);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.pop_front();
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        delta
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total number of frames run
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Update FPS calculation
    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        // Calculate average frame time
        let total: f32 = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as f32;

        // Convert to FPS
        self.current_fps = if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_creation() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.state(), LoopState::Idle);
    }

    #[test]
    fn test_fixed_timestep() {
        assert!((FIXED_TIMESTEP - 1.0 / 60.0).abs() < 0.0001);
        assert_eq!(MAX_SUB_STEPS, 3);
    }

    #[test]
    fn test_first_frame_measures_from_zero() {
        let mut clock = FrameClock::new();
        let delta = clock.tick(0.75);
        assert_relative_eq!(delta, 0.75);
        assert_eq!(clock.state(), LoopState::Running);
    }

    #[test]
    fn test_delta_is_difference_of_elapsed() {
        let mut clock = FrameClock::new();
        clock.tick(1.0);
        assert_relative_eq!(clock.tick(1.016), 0.016, epsilon = 1e-6);
        assert_relative_eq!(clock.tick(1.1), 0.084, epsilon = 1e-6);
        assert_eq!(clock.frame_count(), 3);
    }

    #[test]
    fn test_fps_average() {
        let mut clock = FrameClock::new();
        for frame in 1..=20 {
            clock.tick(frame as f32 * 0.02);
        }
        assert_relative_eq!(clock.fps(), 50.0, epsilon = 0.1);
    }

    #[test]
    fn test_fps_forgets_old_frames() {
        let mut clock = FrameClock::new();
        let mut elapsed = 0.0;
        for _ in 0..100 {
            elapsed += 0.1;
            clock.tick(elapsed);
        }
        assert_relative_eq!(clock.fps(), 10.0, epsilon = 0.1);

        for _ in 0..100 {
            elapsed += 0.02;
            clock.tick(elapsed);
        }
        assert_eq!(clock.frame_times.len(), FPS_WINDOW_SIZE);
        assert_relative_eq!(clock.fps(), 50.0, epsilon = 0.5);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let clock = FrameClock::new();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(b >= a);
    }
}
