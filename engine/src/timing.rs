use std::collections::VecDeque;

/// Largest delta a single tick may observe, in milliseconds.
///
/// Clamping prevents runaway catch-up after a stall (debugger pause, window
/// drag, tab in background): the simulation loses time instead of executing
/// one giant step.
pub const MAX_TICK_MS: f64 = 16.67;

/// Number of per-second FPS samples retained for rolling averages.
pub const FPS_HISTORY_CAP: usize = 60;

const FPS_SAMPLE_INTERVAL_MS: f64 = 1000.0;

/// Per-tick timing state: clamped delta, frame counter and a bounded FIFO
/// of per-second FPS samples.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    last_timestamp_ms: Option<f64>,
    delta_ms: f64,
    frame_count: u64,
    fps: f64,
    fps_history: VecDeque<f64>,
    fps_window_start_ms: f64,
    frames_at_window_start: u64,
}

impl FrameTiming {
    pub fn new() -> Self {
        Self {
            last_timestamp_ms: None,
            delta_ms: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_history: VecDeque::with_capacity(FPS_HISTORY_CAP),
            fps_window_start_ms: 0.0,
            frames_at_window_start: 0,
        }
    }

    /// Advance to a new tick at `now_ms` and return the clamped delta.
    ///
    /// The first tick has no predecessor and reports a delta of zero. Once
    /// at least a second has elapsed since the last sample, the FPS is
    /// recomputed from the frame-count delta and pushed into the history,
    /// evicting the oldest entry past capacity.
    pub fn begin_tick(&mut self, now_ms: f64) -> f64 {
        let dt_ms = match self.last_timestamp_ms {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_TICK_MS),
            None => {
                self.fps_window_start_ms = now_ms;
                0.0
            }
        };
        self.last_timestamp_ms = Some(now_ms);
        self.delta_ms = dt_ms;
        self.frame_count += 1;

        let window_ms = now_ms - self.fps_window_start_ms;
        if window_ms >= FPS_SAMPLE_INTERVAL_MS {
            let frames = self.frame_count - self.frames_at_window_start;
            self.fps = frames as f64 / (window_ms / 1000.0);
            if self.fps_history.len() >= FPS_HISTORY_CAP {
                self.fps_history.pop_front();
            }
            self.fps_history.push_back(self.fps);
            self.fps_window_start_ms = now_ms;
            self.frames_at_window_start = self.frame_count;
        }

        dt_ms
    }

    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Most recent per-second FPS sample, 0.0 until the first full second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn fps_history(&self) -> &VecDeque<f64> {
        &self.fps_history
    }

    /// Timestamp of the current tick, 0.0 before the first tick.
    pub fn last_timestamp_ms(&self) -> f64 {
        self.last_timestamp_ms.unwrap_or(0.0)
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}
