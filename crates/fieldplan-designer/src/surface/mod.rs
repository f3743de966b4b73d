//! The host map widget, as seen by the editing engine.
//!
//! The engine never renders anything itself. It asks the surface to place,
//! move, fade, and remove handle markers, to open and close measurement
//! tooltips, and to toggle map panning. Every marker and tooltip id handed
//! out by a surface is owned by exactly one control point and must be
//! released through the surface when that control point goes away.

mod headless;

pub use headless::{HeadlessSurface, MarkerState, TooltipState};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use fieldplan_core::{LatLng, ShapeKind};

use crate::projection::Projection;

/// Handle to a marker placed on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Handle to an open tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TooltipId(pub u64);

/// Visual style of a handle marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: String,
    pub fill_color: String,
    pub radius_px: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub weight: f64,
}

impl MarkerStyle {
    pub fn handle(color: &str) -> Self {
        Self {
            color: color.to_string(),
            fill_color: color.to_string(),
            radius_px: 6.0,
            opacity: 1.0,
            fill_opacity: 1.0,
            weight: 2.0,
        }
    }

    /// Lighter style for hover previews.
    pub fn temporary(color: &str) -> Self {
        Self {
            radius_px: 5.0,
            opacity: 0.6,
            fill_opacity: 0.4,
            weight: 1.0,
            ..Self::handle(color)
        }
    }

    pub fn with_radius(mut self, radius_px: f64) -> Self {
        self.radius_px = radius_px;
        self
    }
}

/// A pointer event in map coordinates.
///
/// `timestamp` is monotonic time since an arbitrary surface epoch and drives
/// the drag and tooltip throttles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: LatLng,
    pub timestamp: Duration,
}

impl PointerEvent {
    pub fn new(position: LatLng, timestamp: Duration) -> Self {
        Self {
            position,
            timestamp,
        }
    }

    pub fn at_ms(position: LatLng, millis: u64) -> Self {
        Self::new(position, Duration::from_millis(millis))
    }
}

/// Geometry produced by the surface's own drawing mode when a gesture completes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawGeometry {
    Circle { center: LatLng, radius: f64 },
    Rectangle { south_west: LatLng, north_east: LatLng },
    Polyline { points: Vec<LatLng> },
    Polygon { points: Vec<LatLng> },
}

impl RawGeometry {
    /// Closest shape variant to the raw gesture.
    pub fn kind(&self) -> ShapeKind {
        match self {
            RawGeometry::Circle { .. } => ShapeKind::Circle,
            RawGeometry::Rectangle { .. } => ShapeKind::Rectangle,
            RawGeometry::Polyline { .. } => ShapeKind::Polyline,
            RawGeometry::Polygon { .. } => ShapeKind::Polygon,
        }
    }
}

/// Overlay and gesture capabilities of the host map.
pub trait InteractionSurface: Projection {
    /// False when no map is attached; pointer events are then ignored.
    fn is_attached(&self) -> bool {
        true
    }

    fn set_panning_enabled(&mut self, enabled: bool);

    fn add_marker(&mut self, position: LatLng, style: &MarkerStyle) -> MarkerId;
    fn move_marker(&mut self, id: MarkerId, position: LatLng);
    fn set_marker_opacity(&mut self, id: MarkerId, opacity: f64);
    fn remove_marker(&mut self, id: MarkerId);

    fn open_tooltip(&mut self, anchor: LatLng, text: &str) -> TooltipId;
    fn update_tooltip(&mut self, id: TooltipId, anchor: LatLng, text: &str);
    fn close_tooltip(&mut self, id: TooltipId);
}
