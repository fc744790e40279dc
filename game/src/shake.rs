/// Camera shake with linear decay.
///
/// Deterministic: the wobble is a pair of incommensurate sine waves over
/// the shake's own elapsed time, so replays render identically.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenShake {
    intensity: f32,
    duration_ms: f32,
    remaining_ms: f32,
    elapsed_ms: f32,
}

impl ScreenShake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a shake of peak displacement `intensity` pixels. A stronger
    /// concurrent trigger wins; a weaker one only refreshes the timer.
    pub fn trigger(&mut self, intensity: f32, duration_ms: f32) {
        self.intensity = self.intensity.max(intensity);
        self.duration_ms = duration_ms.max(1.0);
        self.remaining_ms = self.duration_ms;
        self.elapsed_ms = 0.0;
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if self.remaining_ms <= 0.0 {
            return;
        }
        self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
        self.elapsed_ms += dt_ms;
        if self.remaining_ms == 0.0 {
            self.intensity = 0.0;
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }

    /// Current pixel offset to apply to the camera.
    pub fn offset(&self) -> (f32, f32) {
        if self.remaining_ms <= 0.0 {
            return (0.0, 0.0);
        }
        let falloff = self.remaining_ms / self.duration_ms;
        let amplitude = self.intensity * falloff;
        let t = self.elapsed_ms;
        (
            amplitude * (t * 0.261).sin(),
            amplitude * (t * 0.317 + 1.3).sin(),
        )
    }
}
