//! Capability seams for external collaborators.
//!
//! The control core talks to audio, settings, input and rendering through
//! these narrow traits. Each trait has a null object, so an absent
//! subsystem is represented explicitly instead of being `if`-guarded at
//! every call site; a missing collaborator can never block navigation or
//! gameplay progress.

use serde::{Deserialize, Serialize};

/// Rendering-quality tier, owned by the settings layer and forced down by
/// the performance governor under sustained low FPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsQuality {
    Low,
    Medium,
    #[default]
    High,
}

/// Fire-and-forget audio events emitted by the navigation layer.
pub trait AudioNotifier {
    fn on_menu_click(&mut self) {}
}

/// Audio null object: navigation works identically with sound absent.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioNotifier for SilentAudio {}

/// Read access to externally-owned player settings.
///
/// `graphics_quality` returns `None` when no settings backend is attached;
/// the governor then leaves the quality tier alone on de-escalation.
pub trait SettingsSource {
    fn graphics_quality(&self) -> Option<GraphicsQuality>;

    /// Screen-shake amplitude scale, 0..=100.
    fn screen_shake_percent(&self) -> u8 {
        100
    }

    fn adaptive_difficulty(&self) -> bool {
        true
    }
}

/// Settings null object.
#[derive(Debug, Default)]
pub struct NoSettings;

impl SettingsSource for NoSettings {
    fn graphics_quality(&self) -> Option<GraphicsQuality> {
        None
    }
}

/// Pressed-key snapshot polled once per gameplay update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub slide: bool,
    pub action: bool,
}

pub trait InputSource {
    fn poll(&mut self) -> InputFrame;
}

/// Player entity update seam, invoked only while gameplay is active.
pub trait PlayerSim {
    fn update(&mut self, dt_ms: f64, input: InputFrame);
}

/// World/obstacle update seam, invoked only while gameplay is active.
pub trait WorldSim {
    fn update(&mut self, dt_ms: f64);
}

/// Synchronous, non-blocking draw delegate called once per tick after the
/// update phase.
pub trait RenderDelegate {
    fn render(&mut self);
}

/// Renderer null object for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl RenderDelegate for NullRenderer {
    fn render(&mut self) {}
}
