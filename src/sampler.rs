//! Frame-rate sampler driven by the host's animation-frame callback.
//!
//! Frame ticks are counted over a fixed wall-clock window. When the window
//! elapses the count is converted into a per-second rate and the window is
//! restarted; every window's rate is independent of the previous ones.

use std::time::{Duration, Instant};

/// Length of one sampling window (100 ms).
pub const SAMPLE_WINDOW: Duration = Duration::from_millis(100);

/// Accumulates frame ticks and emits one rate sample per window.
#[derive(Debug, Clone)]
pub struct FrameRateSampler {
    /// Ticks seen since the current window started.
    frame_count: u32,
    /// Start of the current window.
    window_start: Instant,
    /// Window length.
    window: Duration,
}

impl FrameRateSampler {
    /// Create a sampler whose first window starts now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a sampler whose first window starts at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self::with_window(start, SAMPLE_WINDOW)
    }

    /// Create a sampler with a custom window length.
    pub fn with_window(start: Instant, window: Duration) -> Self {
        Self {
            frame_count: 0,
            window_start: start,
            window,
        }
    }

    /// Register one rendered frame.
    ///
    /// Returns `Some(rate)` when this tick closes a window.
    pub fn on_frame_tick(&mut self) -> Option<u32> {
        self.on_frame_tick_at(Instant::now())
    }

    /// Register one rendered frame with an explicit timestamp (for testing).
    pub fn on_frame_tick_at(&mut self, now: Instant) -> Option<u32> {
        self.frame_count = self.frame_count.saturating_add(1);
        self.close_window_at(now)
    }

    /// Close the current window if it has elapsed, without counting a frame.
    ///
    /// A host whose frame callback was suspended (hidden tab) uses this to
    /// record the idle window; an empty window yields a rate of 0.
    pub fn close_window_at(&mut self, now: Instant) -> Option<u32> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let rate = window_rate(self.frame_count, elapsed);
        self.frame_count = 0;
        self.window_start = now;
        Some(rate)
    }

    /// Frames counted in the current window so far.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Start of the current window.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    /// Restart the window at `now` and drop any counted frames.
    pub fn restart_at(&mut self, now: Instant) {
        self.frame_count = 0;
        self.window_start = now;
    }
}

impl Default for FrameRateSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// `round(frames * 1000 / elapsed_ms)`, with a zero-length window reading as 0.
fn window_rate(frames: u32, elapsed: Duration) -> u32 {
    let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
    if elapsed_ms <= 0.0 {
        return 0;
    }
    (f64::from(frames) * 1000.0 / elapsed_ms).round() as u32
}
