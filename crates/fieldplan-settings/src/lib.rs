//! FieldPlan Settings Crate
//!
//! Tunable constants of the editing engine (throttle cadences, hit
//! tolerances, arc smoothing, elevation sampling and retry policy) and their
//! persistence as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, ArcSettings, EditorSettings, ElevationSettings, InteractionSettings,
};
pub use error::{SettingsError, SettingsResult};
