//! Data types shared across the plan editor.
//!
//! Geographic coordinates, screen-space container points, shape identity,
//! and the derived property records published to the property panel.

mod properties;

pub use properties::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the valid degree range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Offset by a delta expressed in degrees.
    pub fn offset(&self, dlat: f64, dlng: f64) -> Self {
        Self::new(self.lat + dlat, self.lng + dlng)
    }

    /// `[lng, lat]` ordering used by GeoJSON-style records.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self::new(pair[1], pair[0])
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// A point in the map container's pixel space (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Stable identifier of a shape for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// Discriminant of the shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Arc,
    Rectangle,
    Polyline,
    Polygon,
    TextRegion,
    ElevationPolyline,
}

impl ShapeKind {
    /// Minimum number of vertices a vertex-based variant accepts.
    pub fn min_vertices(&self) -> Option<usize> {
        match self {
            ShapeKind::Polyline | ShapeKind::ElevationPolyline => Some(2),
            ShapeKind::Polygon => Some(3),
            ShapeKind::TextRegion => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Circle => write!(f, "Circle"),
            ShapeKind::Arc => write!(f, "Arc"),
            ShapeKind::Rectangle => write!(f, "Rectangle"),
            ShapeKind::Polyline => write!(f, "Polyline"),
            ShapeKind::Polygon => write!(f, "Polygon"),
            ShapeKind::TextRegion => write!(f, "TextRegion"),
            ShapeKind::ElevationPolyline => write!(f, "ElevationPolyline"),
        }
    }
}
