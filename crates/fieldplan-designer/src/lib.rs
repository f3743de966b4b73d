//! # FieldPlan Designer
//!
//! Shape editing on a georeferenced map: the shape model, the control points
//! that drag it, and the routing of pointer events between them.
//!
//! ## Core Components
//!
//! ### Shapes
//! - **Circle / Arc**: center and radius in meters, arcs with start and stop angles
//! - **Rectangle**: center, size, and rotation, edited in pixel space
//! - **Polyline / Polygon**: open and implicitly closed vertex lists
//! - **TextRegion**: a rotated rectangle carrying styled text
//! - **ElevationPolyline**: a polyline with an elevation profile along it
//!
//! ### Editing
//! - **Controls**: role-tagged handles and the per-shape drag state machine
//! - **Editor**: selection, active tool, hover previews, and cancellation
//! - **Elevation**: sample placement, retry policy, and simulated fallback
//! - **Serialization**: plan records keyed by `type` with a `data` blob
//!
//! ## Architecture
//!
//! ```text
//! MapEditor<S: InteractionSurface>
//!   ├── ShapeStore (Shapes in draw order)
//!   ├── SelectionManager (At most one selected shape)
//!   ├── ControlPointController (Handles of the selected shape)
//!   └── ElevationSampler (Profile requests and fallback)
//!
//! InteractionSurface (Markers, tooltips, panning)
//!   └── Projection (lat/lng <-> container pixels)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fieldplan_core::{EventBus, LatLng};
//! use fieldplan_designer::{DrawingMode, HeadlessSurface, MapEditor, RawGeometry};
//!
//! let surface = HeadlessSurface::centered(LatLng::new(45.0, 5.0), 17.0);
//! let mut editor = MapEditor::new(surface, Default::default(), Arc::new(EventBus::new()));
//!
//! editor.set_mode(DrawingMode::Circle);
//! let id = editor.complete_drawing(RawGeometry::Circle {
//!     center: LatLng::new(45.0, 5.0),
//!     radius: 50.0,
//! })?;
//! ```

pub mod controls;
pub mod editor;
pub mod elevation;
pub mod model;
pub mod projection;
pub mod selection_manager;
pub mod serialization;
pub mod shape_store;
pub mod surface;
pub mod tools;

pub use controls::{ControlPointController, DragOutcome, DragState, Grab, Handle, HandleRole};
pub use editor::MapEditor;
pub use elevation::{
    ElevatedPoint, ElevationSample, ElevationSampler, ElevationService, ProfileRequest, ProfileResult,
};
pub use model::{
    Circle, CircleArc, ElevationPolyline, Polygon, Polyline, Rectangle, Shape, ShapeGeometry, ShapeStyle,
    TextAlign, TextRegion, TextStyle,
};
pub use projection::{Projection, WebMercatorProjection};
pub use selection_manager::SelectionManager;
pub use serialization::{PlanFile, PlanMetadata, ShapeRecord};
pub use shape_store::ShapeStore;
pub use surface::{
    HeadlessSurface, InteractionSurface, MarkerId, MarkerStyle, PointerEvent, RawGeometry, TooltipId,
};
pub use tools::DrawingMode;
