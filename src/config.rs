//! # Configuration
//!
//! Two layers, both JSON:
//!
//! - [`HexConfig`]: the base configuration (window geometry, tile size, AI
//!   budgets, audio switches and the default [`Settings`]). Built once in
//!   `main` and handed to the components that need it.
//! - [`SettingsStore`]: the user's persisted [`Settings`], overlaid field by
//!   field on the defaults. Anything missing or corrupt falls back to the
//!   default with a warning; loading user settings never fails.

use crate::error::ConfigError;
use hex_engine::MctsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Board sizes offered by the settings screen.
pub const SUPPORTED_BOARD_SIZES: [usize; 5] = [7, 9, 11, 13, 15];

pub fn is_supported_board_size(size: usize) -> bool {
    SUPPORTED_BOARD_SIZES.contains(&size)
}

/// Window and layout constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Hexagon radius in virtual pixels before the per-board-size shrink.
    pub tile_size: f64,
    pub caption: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            width: 1024,
            height: 720,
            fps: 60,
            tile_size: 30.0,
            caption: "Hex".to_string(),
        }
    }
}

/// User-adjustable settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board_size: usize,
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            board_size: 11,
            music_volume: 0.5,
            sfx_volume: 0.7,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_supported_board_size(self.board_size) {
            return Err(ConfigError::Validation(format!(
                "defaults.board_size must be one of {SUPPORTED_BOARD_SIZES:?}, got {}",
                self.board_size
            )));
        }
        if !(0.0..=1.0).contains(&self.music_volume) {
            return Err(ConfigError::Validation(
                "defaults.music_volume must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sfx_volume) {
            return Err(ConfigError::Validation(
                "defaults.sfx_volume must be in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Computer opponent budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Search workers; 0 uses one per CPU.
    pub threads: usize,
    /// Thinking time in milliseconds for Easy, Medium and Hard.
    pub time_limits_ms: [u64; 3],
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            threads: 0,
            time_limits_ms: [500, 900, 1_000],
        }
    }
}

impl AiConfig {
    pub fn to_mcts(&self, seed: Option<u64>) -> MctsConfig {
        MctsConfig {
            threads: self.threads,
            time_limits: self.time_limits_ms.map(Duration::from_millis),
            seed,
            ..MctsConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Ring the terminal bell when a game ends.
    pub terminal_bell: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig { terminal_bell: true }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexConfig {
    pub system: SystemConfig,
    pub defaults: Settings,
    pub ai: AiConfig,
    pub audio: AudioConfig,
}

impl HexConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: HexConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, falling back to built-in defaults
    /// if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system.width == 0 || self.system.height == 0 {
            return Err(ConfigError::Validation(
                "system.width and system.height must be > 0".into(),
            ));
        }
        if self.system.fps == 0 {
            return Err(ConfigError::Validation("system.fps must be > 0".into()));
        }
        // Boards above 11 shrink the tile by 8.
        if self.system.tile_size <= 8.0 {
            return Err(ConfigError::Validation(
                "system.tile_size must be > 8".into(),
            ));
        }
        if self.ai.time_limits_ms.contains(&0) {
            return Err(ConfigError::Validation(
                "ai.time_limits_ms entries must be > 0".into(),
            ));
        }
        self.defaults.validate()
    }
}

/// Shape written to the user settings file.
#[derive(Serialize)]
struct UserSettingsFile<'a> {
    defaults: &'a Settings,
}

/// Reads and writes the user's [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overlays the persisted values onto `defaults`. Never fails.
    pub fn load(&self, defaults: &Settings) -> Settings {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no user settings yet");
                return *defaults;
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    %err,
                    "user settings unreadable, using defaults"
                );
                return *defaults;
            }
        };
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => overlay(defaults, &value),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    %err,
                    "user settings corrupted, reverting to defaults"
                );
                *defaults
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(&UserSettingsFile { defaults: settings })?;
        std::fs::write(&self.path, body).map_err(|e| ConfigError::FileWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}

fn overlay(defaults: &Settings, value: &serde_json::Value) -> Settings {
    let mut settings = *defaults;
    let Some(section) = value.get("defaults") else {
        warn!("user settings have no \"defaults\" section, ignoring");
        return settings;
    };

    if let Some(raw) = section.get("board_size") {
        match raw.as_u64().map(|n| n as usize).filter(|&n| is_supported_board_size(n)) {
            Some(size) => settings.board_size = size,
            None => warn!(value = %raw, "ignoring invalid board_size"),
        }
    }
    if let Some(raw) = section.get("music_volume") {
        match volume(raw) {
            Some(v) => settings.music_volume = v,
            None => warn!(value = %raw, "ignoring invalid music_volume"),
        }
    }
    if let Some(raw) = section.get("sfx_volume") {
        match volume(raw) {
            Some(v) => settings.sfx_volume = v,
            None => warn!(value = %raw, "ignoring invalid sfx_volume"),
        }
    }
    settings
}

fn volume(raw: &serde_json::Value) -> Option<f32> {
    raw.as_f64()
        .filter(|v| (0.0..=1.0).contains(v))
        .map(|v| v as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hexgame-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = HexConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.defaults.board_size, 11);
        assert_eq!(config.system.tile_size, 30.0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{"system": {"tile_size": 24.0}, "ai": {"threads": 2}}"#;
        let config: HexConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.system.tile_size, 24.0);
        assert_eq!(config.system.width, 1024);
        assert_eq!(config.ai.threads, 2);
        assert_eq!(config.ai.time_limits_ms, [500, 900, 1_000]);
    }

    #[test]
    fn test_invalid_board_size_rejected() {
        let mut config = HexConfig::default();
        config.defaults.board_size = 8;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_config_falls_back() {
        let config = HexConfig::load_or_default(&temp_path("absent-config")).unwrap();
        assert_eq!(config, HexConfig::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let path = temp_path("malformed-config");
        std::fs::write(&path, "{ not json").unwrap();
        let result = HexConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_settings_round_trip() {
        let path = temp_path("settings-round-trip");
        let store = SettingsStore::new(&path);
        let saved = Settings {
            board_size: 7,
            music_volume: 0.25,
            sfx_volume: 1.0,
        };
        store.save(&saved).unwrap();
        let loaded = store.load(&Settings::default());
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_corrupt_settings_use_defaults() {
        let path = temp_path("settings-corrupt");
        std::fs::write(&path, "{\"defaults\": ").unwrap();
        let loaded = SettingsStore::new(&path).load(&Settings::default());
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_invalid_fields_are_ignored_individually() {
        let path = temp_path("settings-partial");
        std::fs::write(
            &path,
            r#"{"defaults": {"board_size": 12, "music_volume": 0.1, "sfx_volume": "loud"}}"#,
        )
        .unwrap();
        let loaded = SettingsStore::new(&path).load(&Settings::default());
        std::fs::remove_file(&path).ok();
        assert_eq!(
            loaded,
            Settings {
                board_size: 11,
                music_volume: 0.1,
                sfx_volume: 0.7,
            }
        );
    }

    #[test]
    fn test_ai_config_converts_budgets() {
        let mcts = AiConfig::default().to_mcts(Some(3));
        assert_eq!(mcts.time_limits[2], Duration::from_millis(1_000));
        assert_eq!(mcts.seed, Some(3));
    }
}
