//! Game manifest
//!
//! Everything the assembly step hands to a running game: which template,
//! the difficulty parameters, asset URIs, an optional seed and audio prefs.
//! Embedded in the page as JSON (or read from a file by the native runner).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{AssetKind, AssetRefs};
use crate::params::Parameters;

/// The five game templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    FlappyBird,
    SpeedRunner,
    WhackAMole,
    #[serde(rename = "match-3")]
    Match3,
    CrossyRoad,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::FlappyBird,
        Template::SpeedRunner,
        Template::WhackAMole,
        Template::Match3,
        Template::CrossyRoad,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Template::FlappyBird => "flappy-bird",
            Template::SpeedRunner => "speed-runner",
            Template::WhackAMole => "whack-a-mole",
            Template::Match3 => "match-3",
            Template::CrossyRoad => "crossy-road",
        }
    }

    pub fn from_id(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == s.trim().to_lowercase())
    }

    pub fn title(&self) -> &'static str {
        match self {
            Template::FlappyBird => "Flappy Bird",
            Template::SpeedRunner => "Speed Runner",
            Template::WhackAMole => "Whack-a-Mole",
            Template::Match3 => "Match-3",
            Template::CrossyRoad => "Crossy Road",
        }
    }

    /// Fixed canvas size in pixels
    pub fn canvas_size(&self) -> (u32, u32) {
        match self {
            Template::FlappyBird => (320, 480),
            Template::SpeedRunner => (640, 360),
            Template::WhackAMole => (500, 500),
            Template::Match3 => (8 * 50, 8 * 50),
            Template::CrossyRoad => (11 * 40, 15 * 40),
        }
    }

    /// Visual assets that must settle before the first tick
    pub fn required_assets(&self) -> &'static [AssetKind] {
        match self {
            // Lanes are filled with flat colors, so nothing gates the start
            Template::CrossyRoad => &[],
            _ => &[AssetKind::Background],
        }
    }

    /// Page background color around the canvas
    pub fn page_color(&self) -> &'static str {
        match self {
            Template::FlappyBird => "#000",
            Template::SpeedRunner => "#111",
            Template::WhackAMole => "#228B22",
            Template::Match3 | Template::CrossyRoad => "#333",
        }
    }
}

/// Music preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Effective volume (respects mute, clamped)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume.clamp(0.0, 1.0)
        }
    }
}

/// Manifest decoding failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything needed to start one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameManifest {
    pub template: Template,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub assets: AssetRefs,
    /// Fixed seed for reproducible runs (host picks one when absent)
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub audio: AudioSettings,
}

impl GameManifest {
    pub fn new(template: Template, parameters: Parameters) -> Self {
        Self {
            template,
            parameters,
            assets: AssetRefs::default(),
            seed: None,
            audio: AudioSettings::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut manifest: GameManifest = serde_json::from_str(json)?;
        manifest.parameters = manifest.parameters.clamped();
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_ids_round_trip() {
        for template in Template::ALL {
            assert_eq!(Template::from_id(template.id()), Some(template));
            let json = serde_json::to_string(&template).unwrap();
            assert_eq!(json, format!("\"{}\"", template.id()));
        }
        assert_eq!(Template::from_id(" Match-3 "), Some(Template::Match3));
        assert_eq!(Template::from_id("pong"), None);
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest = GameManifest::from_json(
            r#"{
                "template": "whack-a-mole",
                "parameters": {"speed": 4, "gravity": 2, "gapSize": 9, "spawnRate": 99},
                "assets": {"player": "mole.png", "obstacles": "hole.png"},
                "seed": 7
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.template, Template::WhackAMole);
        assert_eq!(manifest.parameters.spawn_rate, 10);
        assert_eq!(manifest.assets.get(AssetKind::Obstacle).as_deref(), Some("hole.png"));
        assert_eq!(manifest.seed, Some(7));
        assert!(!manifest.audio.muted);
    }

    #[test]
    fn test_manifest_rejects_unknown_template() {
        let err = GameManifest::from_json(r#"{"template": "tetris"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_muted_volume() {
        let audio = AudioSettings {
            music_volume: 1.4,
            muted: false,
        };
        assert_eq!(audio.effective_volume(), 1.0);
        let audio = AudioSettings { muted: true, ..audio };
        assert_eq!(audio.effective_volume(), 0.0);
    }
}
