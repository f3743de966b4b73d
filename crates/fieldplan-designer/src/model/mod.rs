//! Shape model.
//!
//! A [`Shape`] pairs one geometry variant with its presentation style and a
//! cached [`ShapeProperties`] record. Geometry mutations take an
//! `update_derived` flag: with `false` the cache is left stale for the rest
//! of a drag, with `true` it is recomputed before the call returns.
//! [`Shape::update_properties`] is the single recompute entry point and the
//! only place a `ShapeUpdated` event is published.

pub mod arc;
pub mod circle;
pub mod elevation_line;
pub mod polygon;
pub mod polyline;
pub mod rectangle;
pub mod text_region;

pub use arc::CircleArc;
pub use circle::Circle;
pub use elevation_line::ElevationPolyline;
pub use polygon::Polygon;
pub use polyline::Polyline;
pub use rectangle::Rectangle;
pub use text_region::{RegionFrame, ShapeRepair, TextAlign, TextRegion, TextStyle};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use fieldplan_core::geo;
use fieldplan_core::{EventBus, GeometryError, LatLng, PlanEvent, ShapeId, ShapeKind, ShapeProperties};
use fieldplan_settings::ArcSettings;

use crate::projection::Projection;

/// Stroke and fill presentation. Never affects geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    pub color: String,
    pub fill_color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    /// SVG-style dash pattern such as `"5, 10"`.
    pub dash_array: Option<String>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            fill_color: "#3388ff".to_string(),
            weight: 3.0,
            opacity: 1.0,
            fill_opacity: 0.2,
            dash_array: None,
        }
    }
}

/// Geometry of one shape, tagged by variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Circle(Circle),
    Arc(CircleArc),
    Rectangle(Rectangle),
    Polyline(Polyline),
    Polygon(Polygon),
    TextRegion(TextRegion),
    ElevationPolyline(ElevationPolyline),
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Circle(_) => ShapeKind::Circle,
            ShapeGeometry::Arc(_) => ShapeKind::Arc,
            ShapeGeometry::Rectangle(_) => ShapeKind::Rectangle,
            ShapeGeometry::Polyline(_) => ShapeKind::Polyline,
            ShapeGeometry::Polygon(_) => ShapeKind::Polygon,
            ShapeGeometry::TextRegion(_) => ShapeKind::TextRegion,
            ShapeGeometry::ElevationPolyline(_) => ShapeKind::ElevationPolyline,
        }
    }

    pub fn compute_properties(&self, projection: &dyn Projection) -> ShapeProperties {
        match self {
            ShapeGeometry::Circle(c) => ShapeProperties::Circle(c.properties()),
            ShapeGeometry::Arc(a) => ShapeProperties::Arc(a.properties()),
            ShapeGeometry::Rectangle(r) => ShapeProperties::Rectangle(r.properties(projection)),
            ShapeGeometry::Polyline(l) => ShapeProperties::Polyline(l.properties()),
            ShapeGeometry::Polygon(p) => ShapeProperties::Polygon(p.properties()),
            ShapeGeometry::TextRegion(t) => ShapeProperties::TextRegion(t.properties()),
            ShapeGeometry::ElevationPolyline(e) => ShapeProperties::ElevationPolyline(e.properties()),
        }
    }

    /// Position of the move handle.
    pub fn center(&self) -> LatLng {
        match self {
            ShapeGeometry::Circle(c) => c.center,
            ShapeGeometry::Arc(a) => a.center,
            ShapeGeometry::Rectangle(r) => r.center,
            ShapeGeometry::Polyline(l) => l.center(),
            ShapeGeometry::Polygon(p) => p.centroid(),
            ShapeGeometry::TextRegion(t) => t.center(),
            ShapeGeometry::ElevationPolyline(e) => e.line().center(),
        }
    }

    /// Vertex list of the vertex-based variants.
    pub fn vertices(&self) -> Option<&[LatLng]> {
        match self {
            ShapeGeometry::Polyline(l) => Some(l.points()),
            ShapeGeometry::Polygon(p) => Some(p.points()),
            ShapeGeometry::ElevationPolyline(e) => Some(e.points()),
            _ => None,
        }
    }

    /// Hit test with a tolerance in container pixels.
    pub fn contains(&self, point: LatLng, projection: &dyn Projection, tolerance_px: f64) -> bool {
        let tolerance_m = geo::pixels_to_meters(tolerance_px, point.lat, projection.zoom());
        match self {
            ShapeGeometry::Circle(c) => c.contains(point, tolerance_m),
            ShapeGeometry::Arc(a) => a.contains(point, tolerance_m),
            ShapeGeometry::Rectangle(r) => r.contains(point, projection, tolerance_m),
            ShapeGeometry::Polyline(l) => l.distance_to(point) <= tolerance_m,
            ShapeGeometry::Polygon(p) => p.contains(point),
            ShapeGeometry::TextRegion(t) => t.contains(point, tolerance_m),
            ShapeGeometry::ElevationPolyline(e) => e.distance_to(point) <= tolerance_m,
        }
    }

    fn unsupported(&self, operation: &'static str) -> GeometryError {
        GeometryError::UnsupportedOperation {
            kind: self.kind(),
            operation,
        }
    }
}

/// A shape on the plan.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    geometry: ShapeGeometry,
    pub style: ShapeStyle,
    properties: ShapeProperties,
    stale: bool,
    notifier: Option<Arc<EventBus>>,
}

impl Shape {
    /// Wraps validated geometry and computes its initial properties.
    pub fn new(id: ShapeId, geometry: ShapeGeometry, style: ShapeStyle, projection: &dyn Projection) -> Self {
        let properties = geometry.compute_properties(projection);
        Self {
            id,
            geometry,
            style,
            properties,
            stale: false,
            notifier: None,
        }
    }

    /// Routes every later `ShapeUpdated` notification to `bus`.
    pub fn attach_notifier(&mut self, bus: Arc<EventBus>) {
        self.notifier = Some(bus);
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    /// Cached derived properties. Possibly stale while a drag is in progress.
    pub fn properties(&self) -> &ShapeProperties {
        &self.properties
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn center(&self) -> LatLng {
        self.geometry.center()
    }

    pub fn contains(&self, point: LatLng, projection: &dyn Projection, tolerance_px: f64) -> bool {
        self.geometry.contains(point, projection, tolerance_px)
    }

    /// Recomputes the property cache and notifies subscribers.
    ///
    /// Idempotent: calling it twice on unchanged geometry publishes two
    /// identical records.
    pub fn update_properties(&mut self, projection: &dyn Projection) -> &ShapeProperties {
        self.properties = self.geometry.compute_properties(projection);
        self.stale = false;

        if let Some(bus) = &self.notifier {
            bus.publish(PlanEvent::ShapeUpdated {
                shape_id: self.id,
                properties: self.properties.clone(),
            })
            .ok();
        }
        &self.properties
    }

    /// Applies a geometry mutation.
    ///
    /// A failed mutation leaves the shape untouched. A successful one marks
    /// the cache stale and recomputes it when `update_derived` is set.
    pub fn edit<R, F>(&mut self, update_derived: bool, projection: &dyn Projection, f: F) -> Result<R, GeometryError>
    where
        F: FnOnce(&mut ShapeGeometry, &dyn Projection) -> Result<R, GeometryError>,
    {
        let value = f(&mut self.geometry, projection)?;
        self.stale = true;
        if update_derived {
            self.update_properties(projection);
        }
        Ok(value)
    }

    pub fn move_to(&mut self, center: LatLng, update_derived: bool, projection: &dyn Projection) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, _| match geometry {
            ShapeGeometry::Circle(c) => c.move_to(center),
            ShapeGeometry::Arc(a) => a.move_to(center),
            ShapeGeometry::Rectangle(r) => r.move_to(center),
            ShapeGeometry::Polyline(l) => l.move_to(center),
            ShapeGeometry::Polygon(p) => p.move_to(center),
            ShapeGeometry::TextRegion(t) => t.move_to(center),
            ShapeGeometry::ElevationPolyline(e) => e.move_to(center),
        })
    }

    pub fn set_radius(&mut self, radius: f64, update_derived: bool, projection: &dyn Projection) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, _| match geometry {
            ShapeGeometry::Circle(c) => c.set_radius(radius),
            ShapeGeometry::Arc(a) => a.set_radius(radius),
            other => Err(other.unsupported("set_radius")),
        })
    }

    /// Sets the radius to the distance between the center and `mouse`.
    pub fn resize_from_control_point(
        &mut self,
        mouse: LatLng,
        update_derived: bool,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, _| match geometry {
            ShapeGeometry::Circle(c) => c.resize_from_control_point(mouse),
            ShapeGeometry::Arc(a) => a.resize_from_control_point(mouse),
            other => Err(other.unsupported("resize_from_control_point")),
        })
    }

    pub fn set_angles(
        &mut self,
        start: f64,
        stop: f64,
        limits: &ArcSettings,
        update_derived: bool,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, _| match geometry {
            ShapeGeometry::Arc(a) => a.set_angles(start, stop, limits),
            other => Err(other.unsupported("set_angles")),
        })
    }

    pub fn resize_from_corner(
        &mut self,
        index: usize,
        point: LatLng,
        update_derived: bool,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, proj| match geometry {
            ShapeGeometry::Rectangle(r) => r.resize_from_corner(index, point, proj),
            ShapeGeometry::TextRegion(t) => t.resize_from_corner(index, point),
            other => Err(other.unsupported("resize_from_corner")),
        })
    }

    pub fn resize_from_side(
        &mut self,
        side: usize,
        point: LatLng,
        update_derived: bool,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, proj| match geometry {
            ShapeGeometry::Rectangle(r) => r.resize_from_side(side, point, proj),
            other => Err(other.unsupported("resize_from_side")),
        })
    }

    pub fn rotate_towards(&mut self, point: LatLng, update_derived: bool, projection: &dyn Projection) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, proj| match geometry {
            ShapeGeometry::Rectangle(r) => r.rotate_towards(point, proj),
            ShapeGeometry::TextRegion(t) => t.rotate_towards(point),
            other => Err(other.unsupported("rotate_towards")),
        })
    }

    pub fn set_rotation(&mut self, rotation: f64, update_derived: bool, projection: &dyn Projection) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, _| match geometry {
            ShapeGeometry::Rectangle(r) => r.set_rotation(rotation),
            ShapeGeometry::TextRegion(t) => t.set_rotation(rotation),
            other => Err(other.unsupported("set_rotation")),
        })
    }

    pub fn move_vertex(
        &mut self,
        index: usize,
        point: LatLng,
        update_derived: bool,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        self.edit(update_derived, projection, |geometry, _| match geometry {
            ShapeGeometry::Polyline(l) => l.move_vertex(index, point),
            ShapeGeometry::Polygon(p) => p.move_vertex(index, point),
            ShapeGeometry::ElevationPolyline(e) => e.move_vertex(index, point),
            other => Err(other.unsupported("move_vertex")),
        })
    }

    /// Inserts a vertex after `after_index`; returns the new vertex index.
    pub fn insert_vertex(
        &mut self,
        after_index: usize,
        point: LatLng,
        update_derived: bool,
        projection: &dyn Projection,
    ) -> Result<usize, GeometryError> {
        self.edit(update_derived, projection, |geometry, _| match geometry {
            ShapeGeometry::Polyline(l) => l.insert_vertex(after_index, point),
            ShapeGeometry::Polygon(p) => p.insert_vertex(after_index, point),
            ShapeGeometry::ElevationPolyline(e) => e.insert_vertex(after_index, point),
            other => Err(other.unsupported("insert_vertex")),
        })
    }

    pub fn set_text(&mut self, text: impl Into<String>, projection: &dyn Projection) -> Result<(), GeometryError> {
        let text = text.into();
        self.edit(true, projection, |geometry, _| match geometry {
            ShapeGeometry::TextRegion(t) => {
                t.set_text(text);
                Ok(())
            }
            other => Err(other.unsupported("set_text")),
        })
    }

    pub fn set_text_style(&mut self, style: TextStyle, projection: &dyn Projection) -> Result<(), GeometryError> {
        self.edit(true, projection, |geometry, _| match geometry {
            ShapeGeometry::TextRegion(t) => {
                t.set_style(style);
                Ok(())
            }
            other => Err(other.unsupported("set_text_style")),
        })
    }

    /// Mutable access for the elevation workflow, which never changes geometry.
    pub(crate) fn elevation_line_mut(&mut self) -> Option<&mut ElevationPolyline> {
        match &mut self.geometry {
            ShapeGeometry::ElevationPolyline(e) => Some(e),
            _ => None,
        }
    }
}
