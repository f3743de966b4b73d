//! # FieldPlan
//!
//! Interactive editing engine for georeferenced irrigation plans.
//!
//! ## Architecture
//!
//! FieldPlan is organized as a workspace with multiple crates:
//!
//! 1. **fieldplan-core** - Geographic types, geometry math, errors, events
//! 2. **fieldplan-designer** - Shape model, control points, interaction routing, elevation
//! 3. **fieldplan-settings** - Editor tunables and their persistence
//! 4. **fieldplan** - Logging setup and a plan inspection binary
//!
//! ## Features
//!
//! - **Shapes**: Circles, arcs, rectangles, lines, polygons, text regions, elevation lines
//! - **Direct Manipulation**: Role-tagged handles with throttled drag updates
//! - **Elevation Profiles**: Batched sampling with retries and a simulated fallback
//! - **Plan Files**: JSON records keyed by shape type

pub use fieldplan_core::data;
pub use fieldplan_designer as designer;
pub use fieldplan_settings as settings;

pub use fieldplan_core::{
    DataSource, ElevationError, Error, EventBus, EventFilter, GeometryError, InteractionError, LatLng,
    PlanEvent, Property, PropertyValue, Result, ShapeId, ShapeKind, ShapeProperties,
};

pub use fieldplan_designer::{
    DrawingMode, ElevationService, HeadlessSurface, InteractionSurface, MapEditor, PlanFile, Projection,
    RawGeometry, Shape, ShapeGeometry, WebMercatorProjection,
};

pub use fieldplan_settings::EditorSettings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so stdout stays parseable
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(())
}
