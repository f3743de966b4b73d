use serde::{Deserialize, Serialize};
use std::fmt;

use fieldplan_core::{GeometryError, ShapeKind};

use crate::model::{Circle, CircleArc, ElevationPolyline, Polygon, Polyline, Rectangle, ShapeGeometry, TextRegion};
use crate::projection::Projection;
use crate::surface::RawGeometry;

/// Placeholder text of a freshly drawn text region.
pub const DEFAULT_TEXT: &str = "Text";

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingMode {
    /// Pointer events select and drag; nothing is drawn.
    #[default]
    Select,
    Circle,
    /// Circle gesture turned into a half disc facing north.
    Semicircle,
    Rectangle,
    Polygon,
    Line,
    /// Line gesture turned into an elevation profile line.
    ElevationLine,
    /// Rectangle gesture turned into a text region.
    TextRegion,
    /// Pointer-down on a shape deletes it.
    Delete,
}

impl DrawingMode {
    /// Shape variant this tool produces, if it draws at all.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            DrawingMode::Select | DrawingMode::Delete => None,
            DrawingMode::Circle => Some(ShapeKind::Circle),
            DrawingMode::Semicircle => Some(ShapeKind::Arc),
            DrawingMode::Rectangle => Some(ShapeKind::Rectangle),
            DrawingMode::Polygon => Some(ShapeKind::Polygon),
            DrawingMode::Line => Some(ShapeKind::Polyline),
            DrawingMode::ElevationLine => Some(ShapeKind::ElevationPolyline),
            DrawingMode::TextRegion => Some(ShapeKind::TextRegion),
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.shape_kind().is_some()
    }

    /// Wraps the surface's raw drawn geometry into this tool's variant.
    pub fn build_geometry(&self, raw: RawGeometry, projection: &dyn Projection) -> Result<ShapeGeometry, GeometryError> {
        let geometry = match (self, raw) {
            (DrawingMode::Circle, RawGeometry::Circle { center, radius }) => {
                ShapeGeometry::Circle(Circle::new(center, radius)?)
            }
            (DrawingMode::Semicircle, RawGeometry::Circle { center, radius }) => {
                ShapeGeometry::Arc(CircleArc::semicircle(center, radius)?)
            }
            (DrawingMode::Rectangle, RawGeometry::Rectangle { south_west, north_east }) => {
                ShapeGeometry::Rectangle(Rectangle::from_bounds(south_west, north_east, projection)?)
            }
            (DrawingMode::TextRegion, RawGeometry::Rectangle { south_west, north_east }) => {
                ShapeGeometry::TextRegion(TextRegion::from_bounds(south_west, north_east, DEFAULT_TEXT)?)
            }
            (DrawingMode::Line, RawGeometry::Polyline { points }) => ShapeGeometry::Polyline(Polyline::new(points)?),
            (DrawingMode::ElevationLine, RawGeometry::Polyline { points }) => {
                ShapeGeometry::ElevationPolyline(ElevationPolyline::new(points)?)
            }
            (DrawingMode::Polygon, RawGeometry::Polygon { points }) => ShapeGeometry::Polygon(Polygon::new(points)?),
            (_, raw) => {
                return Err(GeometryError::UnsupportedOperation {
                    kind: raw.kind(),
                    operation: "draw",
                })
            }
        };
        Ok(geometry)
    }
}

impl fmt::Display for DrawingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrawingMode::Select => "select",
            DrawingMode::Circle => "circle",
            DrawingMode::Semicircle => "semicircle",
            DrawingMode::Rectangle => "rectangle",
            DrawingMode::Polygon => "polygon",
            DrawingMode::Line => "line",
            DrawingMode::ElevationLine => "elevation_line",
            DrawingMode::TextRegion => "text_region",
            DrawingMode::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}
