//! Plan file records.
//!
//! A plan is a JSON document holding one record per shape. Each record is
//! tagged `{"type": ..., "data": {...}}`, and coordinates are written as
//! `[lng, lat]` pairs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use fieldplan_core::{DataSource, GeometryError, LatLng};

use crate::elevation::ElevationSample;
use crate::model::{
    Circle, CircleArc, ElevationPolyline, Polygon, Polyline, Rectangle, Shape, ShapeGeometry, ShapeStyle,
    TextRegion, TextStyle,
};

/// Plan file format version
const FILE_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFile {
    pub version: String,
    pub metadata: PlanMetadata,
    pub shapes: Vec<ShapeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleData {
    pub center: [f64; 2],
    pub radius: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemicircleData {
    pub center: [f64; 2],
    pub radius: f64,
    pub start_angle: f64,
    #[serde(alias = "end_angle")]
    pub stop_angle: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleData {
    pub center: [f64; 2],
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

/// Vertex list shared by lines and polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsData {
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub style: ShapeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    /// Top-left, top-right, bottom-right, bottom-left.
    pub corners: [[f64; 2]; 4],
    pub content: String,
    #[serde(default)]
    pub text_style: TextStyle,
    #[serde(default)]
    pub style: ShapeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationLineData {
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub samples: Vec<ElevationSample>,
    #[serde(default)]
    pub data_source: DataSource,
    #[serde(default)]
    pub style: ShapeStyle,
}

/// One stored shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ShapeRecord {
    Circle(CircleData),
    Semicircle(SemicircleData),
    Rectangle(RectangleData),
    Line(PointsData),
    Polygon(PointsData),
    Text(TextData),
    ElevationLine(ElevationLineData),
}

impl ShapeRecord {
    pub fn from_shape(shape: &Shape) -> Self {
        let style = shape.style.clone();
        match shape.geometry() {
            ShapeGeometry::Circle(c) => ShapeRecord::Circle(CircleData {
                center: c.center.to_lng_lat(),
                radius: c.radius,
                style,
            }),
            ShapeGeometry::Arc(a) => ShapeRecord::Semicircle(SemicircleData {
                center: a.center.to_lng_lat(),
                radius: a.radius,
                start_angle: a.start_angle,
                stop_angle: a.stop_angle,
                style,
            }),
            ShapeGeometry::Rectangle(r) => ShapeRecord::Rectangle(RectangleData {
                center: r.center.to_lng_lat(),
                width: r.width,
                height: r.height,
                rotation: r.rotation,
                style,
            }),
            ShapeGeometry::Polyline(l) => ShapeRecord::Line(PointsData {
                points: to_pairs(l.points()),
                style,
            }),
            ShapeGeometry::Polygon(p) => ShapeRecord::Polygon(PointsData {
                points: to_pairs(p.points()),
                style,
            }),
            ShapeGeometry::TextRegion(t) => ShapeRecord::Text(TextData {
                corners: (*t.corners()).map(LatLng::to_lng_lat),
                content: t.text.clone(),
                text_style: t.style.clone(),
                style,
            }),
            ShapeGeometry::ElevationPolyline(e) => ShapeRecord::ElevationLine(ElevationLineData {
                points: to_pairs(e.points()),
                samples: e.samples().to_vec(),
                data_source: e.data_source(),
                style,
            }),
        }
    }

    /// Rebuilds validated geometry; degenerate records are rejected.
    pub fn into_parts(self) -> std::result::Result<(ShapeGeometry, ShapeStyle), GeometryError> {
        let parts = match self {
            ShapeRecord::Circle(d) => (
                ShapeGeometry::Circle(Circle::new(LatLng::from_lng_lat(d.center), d.radius)?),
                d.style,
            ),
            ShapeRecord::Semicircle(d) => (
                ShapeGeometry::Arc(CircleArc::new(
                    LatLng::from_lng_lat(d.center),
                    d.radius,
                    d.start_angle,
                    d.stop_angle,
                )?),
                d.style,
            ),
            ShapeRecord::Rectangle(d) => (
                ShapeGeometry::Rectangle(Rectangle::new(
                    LatLng::from_lng_lat(d.center),
                    d.width,
                    d.height,
                    d.rotation,
                )?),
                d.style,
            ),
            ShapeRecord::Line(d) => (ShapeGeometry::Polyline(Polyline::new(from_pairs(&d.points))?), d.style),
            ShapeRecord::Polygon(d) => (ShapeGeometry::Polygon(Polygon::new(from_pairs(&d.points))?), d.style),
            ShapeRecord::Text(d) => {
                let mut region = TextRegion::from_corners(d.corners.map(LatLng::from_lng_lat), d.content)?;
                region.set_style(d.text_style);
                (ShapeGeometry::TextRegion(region), d.style)
            }
            ShapeRecord::ElevationLine(d) => {
                let line = ElevationPolyline::new(from_pairs(&d.points))?;
                let line = if d.samples.is_empty() {
                    line
                } else {
                    line.with_profile(d.samples, d.data_source)
                };
                (ShapeGeometry::ElevationPolyline(line), d.style)
            }
        };
        Ok(parts)
    }
}

fn to_pairs(points: &[LatLng]) -> Vec<[f64; 2]> {
    points.iter().map(|p| p.to_lng_lat()).collect()
}

fn from_pairs(pairs: &[[f64; 2]]) -> Vec<LatLng> {
    pairs.iter().map(|&p| LatLng::from_lng_lat(p)).collect()
}

impl PlanFile {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: PlanMetadata {
                name: name.into(),
                created: now,
                modified: now,
                description: String::new(),
            },
            shapes: Vec::new(),
        }
    }

    pub fn from_shapes<'a>(name: impl Into<String>, shapes: impl IntoIterator<Item = &'a Shape>) -> Self {
        let mut plan = Self::new(name);
        plan.shapes = shapes.into_iter().map(ShapeRecord::from_shape).collect();
        plan
    }

    /// Save plan to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize plan")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write plan file {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load plan from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read plan file {}", path.as_ref().display()))?;
        let plan: PlanFile = serde_json::from_str(&content).context("Failed to parse plan file")?;
        Ok(plan)
    }

    /// Converts every record, failing on the first invalid one.
    pub fn to_geometries(&self) -> Result<Vec<(ShapeGeometry, ShapeStyle)>> {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, record)| {
                record
                    .clone()
                    .into_parts()
                    .with_context(|| format!("Invalid shape record #{}", i))
            })
            .collect()
    }
}
