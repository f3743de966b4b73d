//! Measurement tooltip text for each handle role.

use fieldplan_core::geo;
use fieldplan_core::units::{format_angle, format_area, format_distance};

use super::handles::HandleRole;
use crate::model::ShapeGeometry;

/// Tooltip text for the handle, built from live geometry.
pub fn measurement_label(geometry: &ShapeGeometry, role: HandleRole) -> Option<String> {
    match (geometry, role) {
        (ShapeGeometry::Circle(c), HandleRole::Center) => {
            Some(format!("Area: {}", format_area(c.properties().area)))
        }
        (ShapeGeometry::Circle(c), HandleRole::Radius(_)) => {
            Some(format!("Radius: {}", format_distance(c.radius)))
        }
        (ShapeGeometry::Arc(a), HandleRole::Center) => {
            Some(format!("Area: {}", format_area(a.properties().area)))
        }
        (ShapeGeometry::Arc(a), HandleRole::ArcStart | HandleRole::ArcStop) => {
            Some(format!("Opening: {}", format_angle(a.opening_angle())))
        }
        (ShapeGeometry::Arc(a), HandleRole::ArcRadius) => Some(format!("Radius: {}", format_distance(a.radius))),
        (ShapeGeometry::Rectangle(r), HandleRole::Corner(_) | HandleRole::Side(_)) => Some(format!(
            "{} × {}",
            format_distance(r.width),
            format_distance(r.height)
        )),
        (ShapeGeometry::Rectangle(r), HandleRole::Center) => Some(format!("Area: {}", format_area(r.area()))),
        (ShapeGeometry::Rectangle(r), HandleRole::Rotation) => {
            Some(format!("Rotation: {}", format_angle(r.rotation)))
        }
        (ShapeGeometry::TextRegion(t), HandleRole::Corner(_)) => Some(format!(
            "{} × {}",
            format_distance(t.width()),
            format_distance(t.height())
        )),
        (ShapeGeometry::TextRegion(t), HandleRole::Rotation) => {
            Some(format!("Rotation: {}", format_angle(t.rotation())))
        }
        (ShapeGeometry::TextRegion(_), HandleRole::Center) => None,
        (ShapeGeometry::Polygon(p), HandleRole::Center) => Some(format!(
            "Area: {}, perimeter: {}",
            format_area(p.area()),
            format_distance(p.perimeter())
        )),
        (ShapeGeometry::Polyline(l), HandleRole::Center) => Some(format!("Length: {}", format_distance(l.length()))),
        (ShapeGeometry::ElevationPolyline(e), HandleRole::Center) => {
            Some(format!("Length: {}", format_distance(e.line().length())))
        }
        (g, HandleRole::Vertex(i)) => vertex_label(g, i),
        (g, HandleRole::SegmentMidpoint(i)) => {
            let points = g.vertices()?;
            let next = (i + 1) % points.len();
            let a = points.get(i)?;
            Some(format_distance(geo::distance_meters(*a, points[next])))
        }
        _ => None,
    }
}

/// Lengths of the one or two segments touching vertex `index`.
fn vertex_label(geometry: &ShapeGeometry, index: usize) -> Option<String> {
    let points = geometry.vertices()?;
    let n = points.len();
    let closed = matches!(geometry, ShapeGeometry::Polygon(_));
    let here = *points.get(index)?;

    let mut parts = Vec::with_capacity(2);
    if index > 0 || closed {
        let prev = points[(index + n - 1) % n];
        parts.push(format_distance(geo::distance_meters(prev, here)));
    }
    if index + 1 < n || closed {
        let next = points[(index + 1) % n];
        parts.push(format_distance(geo::distance_meters(here, next)));
    }
    Some(parts.join(" | "))
}
