use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH, MAX_RECENT_MAPS};
use crate::sheet::RgbColor;

/// Editor configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfigData {
    /// Tile width used when a new sheet is opened without an explicit size
    #[serde(default = "default_tile_width")]
    pub default_tile_width: u32,

    #[serde(default = "default_tile_height")]
    pub default_tile_height: u32,

    /// Transparent key used when a new sheet is opened without one
    #[serde(default)]
    pub default_transparent_color: RgbColor,

    /// Recently saved or edited maps, most recent first
    #[serde(default)]
    pub recent_maps: Vec<PathBuf>,

    /// Last opened map file path (not auto-loaded, just remembered for quick access)
    #[serde(default)]
    pub last_map_path: Option<PathBuf>,
}

fn default_tile_width() -> u32 {
    DEFAULT_TILE_WIDTH
}

fn default_tile_height() -> u32 {
    DEFAULT_TILE_HEIGHT
}

impl Default for EditorConfigData {
    fn default() -> Self {
        Self {
            default_tile_width: DEFAULT_TILE_WIDTH,
            default_tile_height: DEFAULT_TILE_HEIGHT,
            default_transparent_color: RgbColor::default(),
            recent_maps: Vec::new(),
            last_map_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write config: {0}")]
    Io(#[from] std::io::Error),
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// The persisted configuration data
    pub data: EditorConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data: EditorConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Result of loading config from disk
#[derive(Debug)]
pub struct LoadConfigResult {
    pub config: EditorConfig,
    /// Error message if config was reset to defaults due to an error
    pub reset_reason: Option<String>,
}

impl EditorConfig {
    /// Loads the config from its platform location.
    pub fn load() -> LoadConfigResult {
        Self::load_from(crate::paths::config_file())
    }

    /// Loads the config at `config_path`. Never fails: a missing file gives
    /// defaults, an unreadable or corrupt one gives defaults plus the reason.
    pub fn load_from(config_path: impl Into<PathBuf>) -> LoadConfigResult {
        let config_path = config_path.into();

        let (data, reset_reason) = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(data) => {
                        info!("Loaded config from {:?}", config_path);
                        (data, None)
                    }
                    Err(e) => {
                        warn!("Failed to parse config file: {}", e);
                        (
                            EditorConfigData::default(),
                            Some(format!("Configuration file was corrupted: {}", e)),
                        )
                    }
                },
                Err(e) => {
                    warn!("Failed to read config file: {}", e);
                    (
                        EditorConfigData::default(),
                        Some(format!("Could not read configuration file: {}", e)),
                    )
                }
            }
        } else {
            info!("No config file found, using defaults");
            (EditorConfigData::default(), None)
        };

        LoadConfigResult {
            config: EditorConfig {
                data,
                config_path,
                dirty: false,
            },
            reset_reason,
        }
    }

    /// Writes the config if anything changed since the last load or save.
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            debug!("Config unchanged, skipping save");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.data)?;
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, json)?;

        self.dirty = false;
        info!("Config saved to {:?}", self.config_path);
        Ok(())
    }

    /// Records `path` as the most recent map and as the last opened one.
    pub fn remember_map(&mut self, path: &Path) {
        let path = path.to_path_buf();

        // Remove if already in list (to move it to front)
        self.data.recent_maps.retain(|p| p != &path);
        self.data.recent_maps.insert(0, path.clone());
        self.data.recent_maps.truncate(MAX_RECENT_MAPS);

        self.data.last_map_path = Some(path);
        self.dirty = true;
    }

    /// The last opened map, if it is remembered but no longer on disk.
    pub fn missing_last_map(&self) -> Option<&Path> {
        self.data
            .last_map_path
            .as_deref()
            .filter(|path| !path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tilemapper-config-{}-{}",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_editor_config_data_default() {
        let data = EditorConfigData::default();
        assert_eq!(data.default_tile_width, 32);
        assert_eq!(data.default_tile_height, 32);
        assert_eq!(data.default_transparent_color, RgbColor::new(255, 0, 255));
        assert!(data.recent_maps.is_empty());
        assert!(data.last_map_path.is_none());
    }

    #[test]
    fn test_editor_config_data_serialization() {
        let data = EditorConfigData {
            default_tile_width: 16,
            default_tile_height: 24,
            default_transparent_color: RgbColor::new(0, 255, 0),
            recent_maps: vec![PathBuf::from("/maps/one.tmf"), PathBuf::from("/maps/two.tmf")],
            last_map_path: Some(PathBuf::from("/maps/one.tmf")),
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: EditorConfigData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: EditorConfigData = serde_json::from_str(r#"{"default_tile_width": 8}"#).unwrap();
        assert_eq!(parsed.default_tile_width, 8);
        assert_eq!(parsed.default_tile_height, 32);
        assert_eq!(parsed.default_transparent_color, RgbColor::new(255, 0, 255));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = scratch_dir("missing");
        let result = EditorConfig::load_from(dir.join("tilemapper.json"));
        assert!(result.reset_reason.is_none());
        assert_eq!(result.config.data, EditorConfigData::default());
        assert!(!result.config.dirty);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_corrupt_file_resets_with_reason() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("tilemapper.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = EditorConfig::load_from(&path);
        assert_eq!(result.config.data, EditorConfigData::default());
        assert!(result.reset_reason.unwrap().contains("corrupted"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = scratch_dir("save");
        let path = dir.join("nested").join("tilemapper.json");

        let mut config = EditorConfig::load_from(&path).config;
        config.data.default_tile_width = 48;
        config.remember_map(Path::new("town.tmf"));
        config.save().unwrap();
        assert!(!config.dirty);

        let reloaded = EditorConfig::load_from(&path);
        assert!(reloaded.reset_reason.is_none());
        assert_eq!(reloaded.config.data, config.data);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_skipped_when_clean() {
        let dir = scratch_dir("clean");
        let path = dir.join("tilemapper.json");

        let mut config = EditorConfig::load_from(&path).config;
        config.save().unwrap();
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_remember_map_moves_to_front_and_caps() {
        let mut config = EditorConfig::load_from("unused.json").config;
        for i in 0..7 {
            config.remember_map(Path::new(&format!("map{}.tmf", i)));
        }
        config.remember_map(Path::new("map3.tmf"));

        let recent = &config.data.recent_maps;
        assert_eq!(recent.len(), MAX_RECENT_MAPS);
        assert_eq!(recent[0], PathBuf::from("map3.tmf"));
        assert_eq!(recent[1], PathBuf::from("map6.tmf"));
        assert_eq!(recent.iter().filter(|p| p.ends_with("map3.tmf")).count(), 1);
        assert_eq!(config.data.last_map_path, Some(PathBuf::from("map3.tmf")));
        assert!(config.dirty);
    }

    #[test]
    fn test_missing_last_map() {
        let mut config = EditorConfig::load_from("unused.json").config;
        assert!(config.missing_last_map().is_none());

        config.remember_map(Path::new("/nonexistent/tilemapper/gone.tmf"));
        assert_eq!(
            config.missing_last_map(),
            Some(Path::new("/nonexistent/tilemapper/gone.tmf"))
        );
    }
}
