//! Configuration file support.
//!
//! Settings are stored as versioned JSON. Every section falls back to its
//! defaults when missing, so an empty object `{"version": 1}` is a valid
//! configuration.

use std::path::{Path, PathBuf};

use annotrace_vision::{MAX_POLYGON_SIDES, MIN_POLYGON_SIDES, RefineParams};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_POLYGON_SIDES, HANDLE_HIT_RADIUS,
    MIN_RECT_SIZE,
};
use crate::keybindings::KeyBindings;
use crate::model::{ShapeMode, ToolMode};
use crate::view::ZoomLimits;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Same level for the `log` crate's record filter, used by `console_log`.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Canvas size in pixels
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Rectangle tool thresholds
    #[serde(default)]
    pub rectangle: RectangleConfig,

    /// Zoom range and step
    #[serde(default)]
    pub zoom: ZoomLimits,

    /// Undo history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Stroke refinement settings
    #[serde(default)]
    pub refinement: RefinementConfig,

    /// Tool hotkeys
    #[serde(default)]
    pub keybindings: KeyBindings,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Log verbosity level
    pub log_level: LogLevel,
    /// Tool active after startup
    pub default_tool: ToolMode,
    /// Shape mode active after startup
    pub default_shape_mode: ShapeMode,
    /// Target vertex count for polygon refinement
    pub default_polygon_sides: u8,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            default_tool: ToolMode::default(),
            default_shape_mode: ShapeMode::default(),
            default_polygon_sides: DEFAULT_POLYGON_SIDES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectangleConfig {
    /// Pointer distance that grabs a resize handle
    pub handle_hit_radius: f32,
    /// Width and height must exceed this to commit, and resizing clamps to it
    pub min_size: f32,
}

impl Default for RectangleConfig {
    fn default() -> Self {
        Self {
            handle_hit_radius: HANDLE_HIT_RADIUS,
            min_size: MIN_RECT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest snapshots are dropped beyond this count; unbounded when absent
    pub max_snapshots: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// When false every stroke uses the decimated fallback path
    pub enabled: bool,
    /// Run refinement on a worker thread (native only)
    pub background: bool,
    /// Pipeline thresholds
    pub params: RefineParams,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            background: false,
            params: RefineParams::default(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            canvas: CanvasConfig::default(),
            rectangle: RectangleConfig::default(),
            zoom: ZoomLimits::default(),
            history: HistoryConfig::default(),
            refinement: RefinementConfig::default(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the annotator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        if !(self.canvas.width > 0.0 && self.canvas.height > 0.0) {
            return invalid(format!(
                "canvas size {}x{} must be positive",
                self.canvas.width, self.canvas.height
            ));
        }
        if self.rectangle.handle_hit_radius < 0.0 || self.rectangle.min_size < 0.0 {
            return invalid("rectangle thresholds must not be negative".to_string());
        }
        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.min <= 1.0 && zoom.max >= 1.0 && zoom.step > 0.0) {
            return invalid(format!(
                "zoom range {}..{} step {} must contain 1.0 with a positive step",
                zoom.min, zoom.max, zoom.step
            ));
        }
        let sides = self.preferences.default_polygon_sides;
        if !(MIN_POLYGON_SIDES..=MAX_POLYGON_SIDES).contains(&sides) {
            return invalid(format!(
                "default polygon sides {sides} outside {MIN_POLYGON_SIDES}..={MAX_POLYGON_SIDES}"
            ));
        }
        if self.history.max_snapshots == Some(0) {
            return invalid("history cap must be at least 1".to_string());
        }
        let params = &self.refinement.params;
        if params.canny_low > params.canny_high {
            return invalid(format!(
                "canny low threshold {} exceeds high threshold {}",
                params.canny_low, params.canny_high
            ));
        }
        if params.blur_sigma < 0.0 || params.epsilon_fraction <= 0.0 || params.fallback_points == 0
        {
            return invalid("refinement parameters out of range".to_string());
        }
        if let Some(conflict) = self.keybindings.conflict() {
            return invalid(conflict);
        }
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("annotrace").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("annotrace")
                    .join(Self::default_filename())
            })
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn default_path() -> Option<PathBuf> {
        None
    }

    /// Load from `path`, or the default path when None.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is reported and also yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Self::default(),
            },
        };
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A value is out of range or inconsistent with another
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rectangle.min_size, 10.0);
        assert_eq!(config.rectangle.handle_hit_radius, 8.0);
        assert_eq!(config.preferences.default_polygon_sides, 4);
        assert_eq!(config.history.max_snapshots, None);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).expect("parse");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "version": 1,
            "refinement": {"enabled": false, "params": {"canny_low": 20}},
            "keybindings": {"tool_draw": "p"}
        }"#;
        let config = AppConfig::from_json(json).expect("parse");
        assert!(!config.refinement.enabled);
        assert_eq!(config.refinement.params.canny_low, 20.0);
        assert_eq!(config.refinement.params.canny_high, 150.0);
        assert_eq!(config.keybindings.tool_draw, 'p');
        assert_eq!(config.keybindings.tool_select, 's');
    }

    #[test]
    fn test_round_trip() {
        let mut config = AppConfig::default();
        config.preferences.log_level = LogLevel::Debug;
        config.history.max_snapshots = Some(20);
        let json = config.to_json().expect("serialize");
        assert_eq!(AppConfig::from_json(&json).expect("parse"), config);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).expect_err("too new");
        assert!(matches!(err, ConfigError::VersionTooNew { file_version: 99, .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.preferences.default_polygon_sides = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.zoom.min = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.refinement.params.canny_low = 200.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.keybindings.tool_rectangle = 'd';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().to_level(), log::Level::Info);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("annotrace-missing-config-test.json");
        let config = AppConfig::load_or_default(Some(&path));
        assert_eq!(config, AppConfig::default());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("annotrace-config-{}", std::process::id()));
        let path = dir.join(AppConfig::default_filename());
        let mut config = AppConfig::default();
        config.canvas.width = 1280.0;

        config.save(&path).expect("save");
        let loaded = AppConfig::load(&path).expect("load");
        assert_eq!(loaded.canvas.width, 1280.0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
