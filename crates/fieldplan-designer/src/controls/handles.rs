//! Handle roles and where each one sits on a shape.

use smallvec::SmallVec;
use std::fmt;

use fieldplan_core::geo;
use fieldplan_core::LatLng;

use crate::model::circle::CARDINAL_ANGLES;
use crate::model::ShapeGeometry;
use crate::projection::Projection;

pub const CENTER_COLOR: &str = "#059669";
pub const HANDLE_COLOR: &str = "#2563EB";
pub const ARC_STOP_COLOR: &str = "#DC2626";
pub const ROTATION_COLOR: &str = "#FF4500";

/// Geometric role of a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleRole {
    /// Moves the whole shape.
    Center,
    /// Circle rim handle at one of the eight cardinal angles.
    Radius(usize),
    ArcStart,
    ArcStop,
    /// Arc rim handle at the mid angle.
    ArcRadius,
    Corner(usize),
    /// Side midpoint; side `i` joins corners `i` and `i + 1`.
    Side(usize),
    Rotation,
    Vertex(usize),
    /// Midpoint of segment `i`; dragging it inserts a vertex.
    SegmentMidpoint(usize),
}

impl HandleRole {
    pub fn color(&self) -> &'static str {
        match self {
            HandleRole::Center | HandleRole::Corner(_) | HandleRole::Vertex(_) => CENTER_COLOR,
            HandleRole::ArcStop => ARC_STOP_COLOR,
            HandleRole::Rotation => ROTATION_COLOR,
            HandleRole::Radius(_)
            | HandleRole::ArcStart
            | HandleRole::ArcRadius
            | HandleRole::Side(_)
            | HandleRole::SegmentMidpoint(_) => HANDLE_COLOR,
        }
    }
}

impl fmt::Display for HandleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleRole::Center => write!(f, "center"),
            HandleRole::Radius(i) => write!(f, "radius[{}]", i),
            HandleRole::ArcStart => write!(f, "arc-start"),
            HandleRole::ArcStop => write!(f, "arc-stop"),
            HandleRole::ArcRadius => write!(f, "arc-radius"),
            HandleRole::Corner(i) => write!(f, "corner[{}]", i),
            HandleRole::Side(i) => write!(f, "side[{}]", i),
            HandleRole::Rotation => write!(f, "rotation"),
            HandleRole::Vertex(i) => write!(f, "vertex[{}]", i),
            HandleRole::SegmentMidpoint(i) => write!(f, "segment-mid[{}]", i),
        }
    }
}

/// Every handle role for the geometry, in creation order.
pub fn roles_for(geometry: &ShapeGeometry) -> Vec<HandleRole> {
    let mut roles = vec![HandleRole::Center];
    match geometry {
        ShapeGeometry::Circle(_) => roles.extend((0..CARDINAL_ANGLES.len()).map(HandleRole::Radius)),
        ShapeGeometry::Arc(_) => {
            roles.extend([HandleRole::ArcStart, HandleRole::ArcStop, HandleRole::ArcRadius]);
        }
        ShapeGeometry::Rectangle(_) => {
            roles.extend((0..4).map(HandleRole::Corner));
            roles.extend((0..4).map(HandleRole::Side));
            roles.push(HandleRole::Rotation);
        }
        ShapeGeometry::TextRegion(_) => {
            roles.extend((0..4).map(HandleRole::Corner));
            roles.push(HandleRole::Rotation);
        }
        ShapeGeometry::Polyline(l) => {
            roles.extend((0..l.len()).map(HandleRole::Vertex));
            roles.extend((0..l.len().saturating_sub(1)).map(HandleRole::SegmentMidpoint));
        }
        ShapeGeometry::Polygon(p) => {
            roles.extend((0..p.len()).map(HandleRole::Vertex));
            roles.extend((0..p.len()).map(HandleRole::SegmentMidpoint));
        }
        // The profile keeps its vertex count, so no insertion handles
        ShapeGeometry::ElevationPolyline(e) => {
            roles.extend((0..e.points().len()).map(HandleRole::Vertex));
        }
    }
    roles
}

/// Current position of the handle, or `None` when the role does not exist.
pub fn handle_position(
    geometry: &ShapeGeometry,
    role: HandleRole,
    projection: &dyn Projection,
    rotation_offset_px: f64,
) -> Option<LatLng> {
    match (geometry, role) {
        (g, HandleRole::Center) => Some(g.center()),
        (ShapeGeometry::Circle(c), HandleRole::Radius(i)) => {
            CARDINAL_ANGLES.get(i).map(|&angle| c.point_on_circle(angle))
        }
        (ShapeGeometry::Arc(a), HandleRole::ArcStart) => Some(a.start_point()),
        (ShapeGeometry::Arc(a), HandleRole::ArcStop) => Some(a.stop_point()),
        (ShapeGeometry::Arc(a), HandleRole::ArcRadius) => Some(a.mid_point()),
        (ShapeGeometry::Rectangle(r), HandleRole::Corner(i)) if i < 4 => Some(r.corner(projection, i)),
        (ShapeGeometry::Rectangle(r), HandleRole::Side(i)) if i < 4 => Some(r.side_midpoint(projection, i)),
        (ShapeGeometry::Rectangle(r), HandleRole::Rotation) => Some(r.rotation_handle(projection, rotation_offset_px)),
        (ShapeGeometry::TextRegion(t), HandleRole::Corner(i)) => t.corners().get(i).copied(),
        (ShapeGeometry::TextRegion(t), HandleRole::Rotation) => {
            let offset_m = geo::pixels_to_meters(rotation_offset_px, t.center().lat, projection.zoom());
            Some(t.rotation_handle(offset_m))
        }
        (g, HandleRole::Vertex(i)) => g.vertices().and_then(|v| v.get(i).copied()),
        (ShapeGeometry::Polyline(l), HandleRole::SegmentMidpoint(i)) => l.segment_midpoint(i),
        (ShapeGeometry::Polygon(p), HandleRole::SegmentMidpoint(i)) => p.segment_midpoint(i),
        _ => None,
    }
}

/// Handles whose position depends on the dragged one.
///
/// Corner drags keep the opposite corner fixed and side drags keep the
/// opposite side fixed, so those never need repositioning. A vertex only
/// moves itself and the adjacent segment midpoints.
pub fn dependents(geometry: &ShapeGeometry, role: HandleRole) -> SmallVec<[HandleRole; 12]> {
    let all = roles_for(geometry);
    match (geometry, role) {
        (_, HandleRole::Center) => all.into_iter().collect(),
        (ShapeGeometry::Circle(_), HandleRole::Radius(_)) => {
            all.into_iter().filter(|r| *r != HandleRole::Center).collect()
        }
        (ShapeGeometry::Arc(_), _) => all.into_iter().filter(|r| *r != HandleRole::Center).collect(),
        (ShapeGeometry::Rectangle(_) | ShapeGeometry::TextRegion(_), HandleRole::Corner(i)) => {
            let opposite = HandleRole::Corner((i + 2) % 4);
            all.into_iter().filter(|r| *r != opposite).collect()
        }
        (ShapeGeometry::Rectangle(_), HandleRole::Side(s)) => {
            let fixed = [
                HandleRole::Side((s + 2) % 4),
                HandleRole::Corner((s + 2) % 4),
                HandleRole::Corner((s + 3) % 4),
            ];
            all.into_iter().filter(|r| !fixed.contains(r)).collect()
        }
        (ShapeGeometry::Rectangle(_) | ShapeGeometry::TextRegion(_), HandleRole::Rotation) => {
            all.into_iter().filter(|r| *r != HandleRole::Center).collect()
        }
        (ShapeGeometry::Polyline(l), HandleRole::Vertex(i)) => {
            let mut out = SmallVec::new();
            out.push(HandleRole::Vertex(i));
            if i > 0 {
                out.push(HandleRole::SegmentMidpoint(i - 1));
            }
            if i + 1 < l.len() {
                out.push(HandleRole::SegmentMidpoint(i));
            }
            out
        }
        (ShapeGeometry::Polygon(p), HandleRole::Vertex(i)) => {
            let n = p.len();
            let mut out = SmallVec::new();
            out.push(HandleRole::Vertex(i));
            out.push(HandleRole::SegmentMidpoint((i + n - 1) % n));
            out.push(HandleRole::SegmentMidpoint(i));
            out
        }
        (_, other) => std::iter::once(other).collect(),
    }
}

/// Handles hidden while `role` is dragged, since their position would look stale.
pub fn suppressed_during(geometry: &ShapeGeometry, role: HandleRole) -> SmallVec<[HandleRole; 2]> {
    let line_like = geometry.vertices().is_some();
    match role {
        HandleRole::Vertex(_) | HandleRole::SegmentMidpoint(_) if line_like => {
            std::iter::once(HandleRole::Center).collect()
        }
        _ => SmallVec::new(),
    }
}
