use serde::{Deserialize, Serialize};

use fieldplan_core::geo;
use fieldplan_core::{GeometryError, LatLng, PolygonProperties, ShapeKind};

use super::polyline::{check_vertices, translate};

/// Implicitly closed ring with at least three vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<LatLng>,
}

impl Polygon {
    /// Builds a ring. A trailing vertex equal to the first one is dropped.
    pub fn new(mut points: Vec<LatLng>) -> Result<Self, GeometryError> {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        check_vertices(ShapeKind::Polygon, &points, 3)?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn area(&self) -> f64 {
        geo::polygon_area(&self.points)
    }

    pub fn perimeter(&self) -> f64 {
        geo::polygon_perimeter(&self.points)
    }

    pub fn centroid(&self) -> LatLng {
        geo::polygon_centroid(&self.points).unwrap_or(self.points[0])
    }

    /// One midpoint per edge, including the closing edge.
    pub fn midpoints(&self) -> Vec<LatLng> {
        let n = self.points.len();
        (0..n)
            .map(|i| geo::midpoint(self.points[i], self.points[(i + 1) % n]))
            .collect()
    }

    pub fn segment_midpoint(&self, segment: usize) -> Option<LatLng> {
        let n = self.points.len();
        if segment >= n {
            return None;
        }
        Some(geo::midpoint(self.points[segment], self.points[(segment + 1) % n]))
    }

    pub fn move_vertex(&mut self, index: usize, point: LatLng) -> Result<(), GeometryError> {
        geo::validate(point)?;
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(GeometryError::VertexOutOfRange { index, len })?;
        *slot = point;
        Ok(())
    }

    /// Inserts `point` on the edge that starts at `after_index`.
    ///
    /// The closing edge (`after_index == len - 1`) appends at the end of the
    /// ring. Returns the new vertex index.
    pub fn insert_vertex(&mut self, after_index: usize, point: LatLng) -> Result<usize, GeometryError> {
        geo::validate(point)?;
        if after_index >= self.points.len() {
            return Err(GeometryError::VertexOutOfRange {
                index: after_index,
                len: self.points.len(),
            });
        }
        self.points.insert(after_index + 1, point);
        Ok(after_index + 1)
    }

    /// Shifts every vertex so the centroid lands on `center`.
    pub fn move_to(&mut self, center: LatLng) -> Result<(), GeometryError> {
        geo::validate(center)?;
        let current = self.centroid();
        translate(&mut self.points, center.lat - current.lat, center.lng - current.lng)
    }

    pub fn contains(&self, point: LatLng) -> bool {
        geo::ring_contains(&self.points, point)
    }

    pub fn properties(&self) -> PolygonProperties {
        PolygonProperties {
            area: self.area(),
            perimeter: self.perimeter(),
            centroid: self.centroid(),
            vertex_count: self.points.len(),
        }
    }
}
