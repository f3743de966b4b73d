//! Settings errors.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// A tunable is out of range or inconsistent with another one.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Settings files are either `.toml` or `.json`.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("No config directory on this platform")]
    NoConfigDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
