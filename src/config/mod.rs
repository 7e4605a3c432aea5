//! Configuration file support for inkveil.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/inkveil/config.toml`. Settings include brush defaults, the
//! canvas background, history depth, fade timing, arrow appearance and export options.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use types::{
    ArrowConfig, BrushConfig, CanvasConfig, ExportConfig, FadeConfig, HistoryConfig,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [brush]
/// default_type = "round"
/// default_color = "red"
/// default_width = 5.0
/// default_opacity = 1.0
/// default_mode = "normal"
///
/// [canvas]
/// background_color = "white"
///
/// [history]
/// max_depth = 20
///
/// [fade]
/// step = 0.02
/// tick_ms = 16
///
/// [arrow]
/// head_offset = 15.0
/// angle_degrees = 30.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Brush defaults (shape, color, width, opacity, mode)
    #[serde(default)]
    pub brush: BrushConfig,

    /// Canvas background used by the eraser and exports
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Undo/redo depth
    #[serde(default)]
    pub history: HistoryConfig,

    /// Fade animation timing
    #[serde(default)]
    pub fade: FadeConfig,

    /// Arrow appearance settings
    #[serde(default)]
    pub arrow: ArrowConfig,

    /// Export destination and naming
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `brush.default_width`: 1.0 - 100.0
    /// - `brush.default_opacity`: 0.05 - 1.0
    /// - `history.max_depth`: 1 - 200
    /// - `fade.step`: 0.005 - 1.0
    /// - `fade.tick_ms`: 4 - 250
    /// - `arrow.head_offset`: 0.0 - 100.0
    /// - `arrow.angle_degrees`: 10.0 - 80.0
    pub fn validate_and_clamp(&mut self) {
        if !(1.0..=100.0).contains(&self.brush.default_width) {
            warn!(
                "Invalid default_width {:.1}, clamping to 1.0-100.0 range",
                self.brush.default_width
            );
            self.brush.default_width = clamp_or(self.brush.default_width, 1.0, 100.0, 5.0);
        }

        if !(0.05..=1.0).contains(&self.brush.default_opacity) {
            warn!(
                "Invalid default_opacity {:.2}, clamping to 0.05-1.0 range",
                self.brush.default_opacity
            );
            self.brush.default_opacity = clamp_or(self.brush.default_opacity, 0.05, 1.0, 1.0);
        }

        if !self.brush.default_color.is_known() {
            warn!(
                "Unknown default_color {:?}, falling back to 'red'",
                self.brush.default_color
            );
            self.brush.default_color = ColorSpec::Name("red".to_string());
        }

        if !self.canvas.background_color.is_known() {
            warn!(
                "Unknown background_color {:?}, falling back to 'white'",
                self.canvas.background_color
            );
            self.canvas.background_color = ColorSpec::Name("white".to_string());
        }

        if !(1..=200).contains(&self.history.max_depth) {
            warn!(
                "Invalid history max_depth {}, clamping to 1-200 range",
                self.history.max_depth
            );
            self.history.max_depth = self.history.max_depth.clamp(1, 200);
        }

        if !(0.005..=1.0).contains(&self.fade.step) {
            warn!(
                "Invalid fade step {:.3}, clamping to 0.005-1.0 range",
                self.fade.step
            );
            self.fade.step = clamp_or(self.fade.step, 0.005, 1.0, crate::fade::DEFAULT_FADE_STEP);
        }

        if !(4..=250).contains(&self.fade.tick_ms) {
            warn!(
                "Invalid fade tick_ms {}, clamping to 4-250 range",
                self.fade.tick_ms
            );
            self.fade.tick_ms = self.fade.tick_ms.clamp(4, 250);
        }

        if !(0.0..=100.0).contains(&self.arrow.head_offset) {
            warn!(
                "Invalid arrow head_offset {:.1}, clamping to 0.0-100.0 range",
                self.arrow.head_offset
            );
            self.arrow.head_offset = clamp_or(self.arrow.head_offset, 0.0, 100.0, 15.0);
        }

        if !(10.0..=80.0).contains(&self.arrow.angle_degrees) {
            warn!(
                "Invalid arrow angle {:.1}°, clamping to 10.0-80.0° range",
                self.arrow.angle_degrees
            );
            self.arrow.angle_degrees = clamp_or(self.arrow.angle_degrees, 10.0, 80.0, 30.0);
        }

        if !self.export.format.eq_ignore_ascii_case("png") {
            warn!(
                "Unsupported export format '{}', falling back to 'png'",
                self.export.format
            );
            self.export.format = "png".to_string();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/inkveil/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("inkveil");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// Unlike [`Config::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Serializes the config to TOML and writes it to `path`, creating the
    /// parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

/// Clamps `value` into range, replacing NaN with `fallback`.
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{BrushType, DrawMode};

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.brush.default_type, BrushType::Round);
        assert_eq!(config.brush.default_mode, DrawMode::Normal);
        assert_eq!(config.brush.default_width, 5.0);
        assert_eq!(config.history.max_depth, 20);
        assert_eq!(config.fade.tick_ms, 16);
        assert_eq!(config.arrow.head_offset, 15.0);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [brush]
            default_type = "arrow"
            default_color = [0, 128, 255]
            default_mode = "fading"

            [fade]
            step = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.brush.default_type, BrushType::Arrow);
        assert_eq!(config.brush.default_mode, DrawMode::Fading);
        assert_eq!(config.brush.default_color, ColorSpec::Rgb([0, 128, 255]));
        assert_eq!(config.brush.default_opacity, 1.0);
        assert_eq!(config.fade.step, 0.1);
        assert_eq!(config.fade.tick_ms, 16);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut config = Config::default();
        config.brush.default_width = 500.0;
        config.brush.default_opacity = 0.0;
        config.history.max_depth = 0;
        config.fade.tick_ms = 1;
        config.arrow.angle_degrees = f64::NAN;
        config.canvas.background_color = ColorSpec::Name("chartreuse-ish".into());
        config.export.format = "jpeg".into();

        config.validate_and_clamp();

        assert_eq!(config.brush.default_width, 100.0);
        assert_eq!(config.brush.default_opacity, 0.05);
        assert_eq!(config.history.max_depth, 1);
        assert_eq!(config.fade.tick_ms, 4);
        assert_eq!(config.arrow.angle_degrees, 30.0);
        assert_eq!(
            config.canvas.background_color,
            ColorSpec::Name("white".into())
        );
        assert_eq!(config.export.format, "png");
    }

    #[test]
    fn save_then_load_from_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.brush.default_type = BrushType::Dotted;
        config.history.max_depth = 42;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.brush.default_type, BrushType::Dotted);
        assert_eq!(loaded.history.max_depth, 42);
    }

    #[test]
    fn load_from_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[brush\ndefault_width = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn schema_lists_every_section() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for section in ["brush", "canvas", "history", "fade", "arrow", "export"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
