//! Editor settings.
//!
//! All values have working defaults; a settings file only needs the keys it
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{SettingsError, SettingsResult};

/// Pointer interaction tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Minimum interval between applied drag ticks (~60fps)
    pub drag_frame_interval_ms: u64,
    /// Minimum interval between measurement tooltip refreshes
    pub tooltip_interval_ms: u64,
    /// Pixel radius within which a pointer grabs a handle
    pub handle_hit_tolerance_px: f64,
    /// Pixel tolerance for hitting a line shape
    pub line_hit_tolerance_px: f64,
    /// Pixel distance of the rotation handle above the top edge
    pub rotation_handle_offset_px: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            drag_frame_interval_ms: 16,
            tooltip_interval_ms: 100,
            handle_hit_tolerance_px: 10.0,
            line_hit_tolerance_px: 6.0,
            rotation_handle_offset_px: 30.0,
        }
    }
}

impl InteractionSettings {
    pub fn drag_frame_interval(&self) -> Duration {
        Duration::from_millis(self.drag_frame_interval_ms)
    }

    pub fn tooltip_interval(&self) -> Duration {
        Duration::from_millis(self.tooltip_interval_ms)
    }
}

/// Arc angle smoothing.
///
/// The step limit suppresses single erratic pointer samples; it is tuned to
/// typical pointer sampling rates and can be adjusted per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSettings {
    /// Largest change of opening angle accepted in one update
    pub max_opening_step_deg: f64,
    /// Smallest opening angle an interactive edit can produce
    pub min_opening_deg: f64,
    /// Largest opening angle an interactive edit can produce
    pub max_opening_deg: f64,
}

impl Default for ArcSettings {
    fn default() -> Self {
        Self {
            max_opening_step_deg: 45.0,
            min_opening_deg: 5.0,
            max_opening_deg: 355.0,
        }
    }
}

/// Elevation sampling and retry policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationSettings {
    /// Target spacing between samples in meters
    pub sample_spacing_m: f64,
    pub min_samples: usize,
    pub max_samples: usize,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ElevationSettings {
    fn default() -> Self {
        Self {
            sample_spacing_m: 100.0,
            min_samples: 10,
            max_samples: 50,
            max_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl ElevationSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Top-level editor settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub interaction: InteractionSettings,
    pub arc: ArcSettings,
    pub elevation: ElevationSettings,
}

impl EditorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a `.toml` or `.json` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match extension(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        tracing::debug!("Loaded editor settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a `.toml` or `.json` file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> SettingsResult<()> {
        let i = &self.interaction;
        if i.drag_frame_interval_ms == 0 {
            return Err(invalid("interaction.drag_frame_interval_ms", "must be > 0"));
        }
        if i.tooltip_interval_ms < i.drag_frame_interval_ms {
            return Err(invalid(
                "interaction.tooltip_interval_ms",
                "must not be shorter than the drag frame interval",
            ));
        }
        if !(i.handle_hit_tolerance_px > 0.0) || !(i.line_hit_tolerance_px > 0.0) {
            return Err(invalid("interaction", "hit tolerances must be > 0"));
        }

        let a = &self.arc;
        if !(a.max_opening_step_deg > 0.0) {
            return Err(invalid("arc.max_opening_step_deg", "must be > 0"));
        }
        if !(a.min_opening_deg > 0.0 && a.min_opening_deg < a.max_opening_deg && a.max_opening_deg < 360.0)
        {
            return Err(invalid(
                "arc",
                "opening range must satisfy 0 < min < max < 360",
            ));
        }

        let e = &self.elevation;
        if !(e.sample_spacing_m > 0.0) {
            return Err(invalid("elevation.sample_spacing_m", "must be > 0"));
        }
        if e.min_samples < 2 || e.min_samples > e.max_samples {
            return Err(invalid(
                "elevation.min_samples",
                "must be >= 2 and <= max_samples",
            ));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

fn extension(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("").to_string(),
        )),
    }
}

fn invalid(key: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Platform location of the editor settings file
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("fieldplan").join("editor.toml"))
        .ok_or(SettingsError::NoConfigDirectory)
}
