use std::fs;
use std::io;
use std::path::PathBuf;

use engine::collab::{GraphicsQuality, SettingsSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub mute_all: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            mute_all: false,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    pub fn effective_sfx_gain(self) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameplaySettings {
    pub adaptive_difficulty: bool,
    pub show_tutorial_hints: bool,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            adaptive_difficulty: true,
            show_tutorial_hints: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoSettings {
    pub quality: GraphicsQuality,
    pub screen_shake_percent: u8,
    pub vsync: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            quality: GraphicsQuality::High,
            screen_shake_percent: 100,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub gameplay: GameplaySettings,
    #[serde(default)]
    pub video: VideoSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            audio: AudioSettings::default(),
            gameplay: GameplaySettings::default(),
            video: VideoSettings::default(),
        }
    }
}

impl PlayerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.audio = self.audio.clamp();
        self.video.screen_shake_percent = self.video.screen_shake_percent.min(100);
        self
    }
}

fn default_version() -> u32 {
    1
}

impl SettingsSource for PlayerSettings {
    fn graphics_quality(&self) -> Option<GraphicsQuality> {
        Some(self.video.quality)
    }

    fn screen_shake_percent(&self) -> u8 {
        self.video.screen_shake_percent
    }

    fn adaptive_difficulty(&self) -> bool {
        self.gameplay.adaptive_difficulty
    }
}

/// On-disk settings location plus load/save.
///
/// Loading never fails: a missing or corrupt file falls back to defaults
/// (with a warning), and loaded values are re-clamped before use.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("RUNNER_SETTINGS_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("runner");
        path.push("settings.json");
        Self { path }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> PlayerSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerSettings::default();
        };
        match serde_json::from_slice::<PlayerSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!(
                    "settings file {} unreadable ({err}); using defaults",
                    self.path.display()
                );
                PlayerSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &PlayerSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
