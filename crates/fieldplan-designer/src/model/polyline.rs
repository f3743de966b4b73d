use serde::{Deserialize, Serialize};

use fieldplan_core::geo;
use fieldplan_core::{GeometryError, LatLng, PolylineProperties, ShapeKind};

/// Open polyline with at least two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<LatLng>,
}

impl Polyline {
    pub fn new(points: Vec<LatLng>) -> Result<Self, GeometryError> {
        check_vertices(ShapeKind::Polyline, &points, 2)?;
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

    pub fn length(&self) -> f64 {
        geo::line_length(&self.points)
    }

    pub fn segment_lengths(&self) -> Vec<f64> {
        geo::segment_lengths(&self.points)
    }

    /// One midpoint per segment.
    pub fn midpoints(&self) -> Vec<LatLng> {
        self.points
            .windows(2)
            .map(|w| geo::midpoint(w[0], w[1]))
            .collect()
    }

    pub fn segment_midpoint(&self, segment: usize) -> Option<LatLng> {
        let a = self.points.get(segment)?;
        let b = self.points.get(segment + 1)?;
        Some(geo::midpoint(*a, *b))
    }

    /// Point at half the total length.
    pub fn center(&self) -> LatLng {
        geo::point_at_distance_along_line(&self.points, self.length() / 2.0).unwrap_or(self.points[0])
    }

    pub fn point_at_distance(&self, distance_m: f64) -> LatLng {
        geo::point_at_distance_along_line(&self.points, distance_m).unwrap_or(self.points[0])
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

    /// Inserts `point` right after vertex `after_index`; returns the new vertex index.
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

    /// Shifts every vertex so the arc-length center lands on `center`.
    pub fn move_to(&mut self, center: LatLng) -> Result<(), GeometryError> {
        geo::validate(center)?;
        let current = self.center();
        translate(&mut self.points, center.lat - current.lat, center.lng - current.lng)
    }

    pub fn distance_to(&self, point: LatLng) -> f64 {
        self.points
            .windows(2)
            .map(|w| geo::distance_to_segment(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn properties(&self) -> PolylineProperties {
        let segment_lengths = self.segment_lengths();
        PolylineProperties {
            length: segment_lengths.iter().sum(),
            segment_lengths,
            center: self.center(),
            midpoints: self.midpoints(),
            vertex_count: self.points.len(),
        }
    }
}

pub(crate) fn check_vertices(
    kind: ShapeKind,
    points: &[LatLng],
    required: usize,
) -> Result<(), GeometryError> {
    if points.len() < required {
        return Err(GeometryError::TooFewVertices {
            kind,
            required,
            actual: points.len(),
        });
    }
    for p in points {
        geo::validate(*p)?;
    }
    Ok(())
}

pub(crate) fn translate(points: &mut [LatLng], dlat: f64, dlng: f64) -> Result<(), GeometryError> {
    let moved: Vec<LatLng> = points.iter().map(|p| p.offset(dlat, dlng)).collect();
    for p in &moved {
        geo::validate(*p)?;
    }
    points.copy_from_slice(&moved);
    Ok(())
}
