//! Derived property records.
//!
//! Every shape variant caches one of these next to its geometry. They are
//! plain data: recomputed from geometry, never edited directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::LatLng;

/// A single named entry for the property panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    String(String),
    Bool(bool),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(v) => write!(f, "{:.2}", v),
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
        }
    }
}

impl Property {
    fn number(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: PropertyValue::Number(value),
        }
    }

    fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: PropertyValue::String(value.into()),
        }
    }
}

/// Origin of an elevation profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// No profile has been resolved for the current geometry yet.
    #[default]
    Pending,
    /// Elevations came from the remote service.
    Api,
    /// Remote fetch failed; elevations are synthetic.
    Simulation,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Pending => write!(f, "pending"),
            DataSource::Api => write!(f, "api"),
            DataSource::Simulation => write!(f, "simulation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleProperties {
    pub center: LatLng,
    pub radius: f64,
    pub diameter: f64,
    pub area: f64,
    pub perimeter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcProperties {
    pub center: LatLng,
    pub radius: f64,
    pub start_angle: f64,
    pub stop_angle: f64,
    pub opening_angle: f64,
    pub arc_length: f64,
    /// Sector area in m².
    pub area: f64,
    /// Arc length plus both radii, or the full circumference for a closed arc.
    pub perimeter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleProperties {
    pub center: LatLng,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub area: f64,
    pub perimeter: f64,
    /// Top-left, top-right, bottom-right, bottom-left in the local frame.
    pub corners: [LatLng; 4],
    /// Top, right, bottom, left.
    pub side_midpoints: [LatLng; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineProperties {
    pub length: f64,
    pub segment_lengths: Vec<f64>,
    /// Point at half the total length.
    pub center: LatLng,
    pub midpoints: Vec<LatLng>,
    pub vertex_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonProperties {
    pub area: f64,
    pub perimeter: f64,
    pub centroid: LatLng,
    pub vertex_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegionProperties {
    pub center: LatLng,
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub rotation: f64,
    pub text: String,
}

/// Summary of an elevation profile, from a single forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationStats {
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationProperties {
    pub line: PolylineProperties,
    pub sample_count: usize,
    pub data_source: DataSource,
    pub stats: Option<ElevationStats>,
}

/// Derived properties of a shape, tagged by variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ShapeProperties {
    Circle(CircleProperties),
    Arc(ArcProperties),
    Rectangle(RectangleProperties),
    Polyline(PolylineProperties),
    Polygon(PolygonProperties),
    TextRegion(TextRegionProperties),
    ElevationPolyline(ElevationProperties),
}

impl ShapeProperties {
    /// Surface area in m², for the variants that enclose one.
    pub fn area(&self) -> Option<f64> {
        match self {
            ShapeProperties::Circle(p) => Some(p.area),
            ShapeProperties::Arc(p) => Some(p.area),
            ShapeProperties::Rectangle(p) => Some(p.area),
            ShapeProperties::Polygon(p) => Some(p.area),
            ShapeProperties::TextRegion(p) => Some(p.area),
            ShapeProperties::Polyline(_) | ShapeProperties::ElevationPolyline(_) => None,
        }
    }

    pub fn perimeter(&self) -> Option<f64> {
        match self {
            ShapeProperties::Circle(p) => Some(p.perimeter),
            ShapeProperties::Arc(p) => Some(p.perimeter),
            ShapeProperties::Rectangle(p) => Some(p.perimeter),
            ShapeProperties::Polygon(p) => Some(p.perimeter),
            ShapeProperties::TextRegion(p) => Some(2.0 * (p.width + p.height)),
            ShapeProperties::Polyline(_) | ShapeProperties::ElevationPolyline(_) => None,
        }
    }

    /// Total length in meters for line-like variants.
    pub fn length(&self) -> Option<f64> {
        match self {
            ShapeProperties::Polyline(p) => Some(p.length),
            ShapeProperties::ElevationPolyline(p) => Some(p.line.length),
            _ => None,
        }
    }

    /// Flattens the record into panel entries.
    pub fn to_property_list(&self) -> Vec<Property> {
        match self {
            ShapeProperties::Circle(p) => vec![
                Property::number("Center Lat", p.center.lat),
                Property::number("Center Lng", p.center.lng),
                Property::number("Radius", p.radius),
                Property::number("Diameter", p.diameter),
                Property::number("Area", p.area),
                Property::number("Perimeter", p.perimeter),
            ],
            ShapeProperties::Arc(p) => vec![
                Property::number("Center Lat", p.center.lat),
                Property::number("Center Lng", p.center.lng),
                Property::number("Radius", p.radius),
                Property::number("Start Angle", p.start_angle),
                Property::number("Stop Angle", p.stop_angle),
                Property::number("Opening Angle", p.opening_angle),
                Property::number("Arc Length", p.arc_length),
                Property::number("Area", p.area),
                Property::number("Perimeter", p.perimeter),
            ],
            ShapeProperties::Rectangle(p) => vec![
                Property::number("Center Lat", p.center.lat),
                Property::number("Center Lng", p.center.lng),
                Property::number("Width", p.width),
                Property::number("Height", p.height),
                Property::number("Rotation", p.rotation),
                Property::number("Area", p.area),
                Property::number("Perimeter", p.perimeter),
            ],
            ShapeProperties::Polyline(p) => line_entries(p),
            ShapeProperties::Polygon(p) => vec![
                Property::number("Area", p.area),
                Property::number("Perimeter", p.perimeter),
                Property::number("Centroid Lat", p.centroid.lat),
                Property::number("Centroid Lng", p.centroid.lng),
                Property::number("Vertices", p.vertex_count as f64),
            ],
            ShapeProperties::TextRegion(p) => vec![
                Property::text("Text", p.text.clone()),
                Property::number("Width", p.width),
                Property::number("Height", p.height),
                Property::number("Area", p.area),
                Property::number("Rotation", p.rotation),
            ],
            ShapeProperties::ElevationPolyline(p) => {
                let mut list = line_entries(&p.line);
                list.push(Property::number("Samples", p.sample_count as f64));
                list.push(Property::text("Data Source", p.data_source.to_string()));
                if let Some(stats) = p.stats {
                    list.push(Property::number("Min Elevation", stats.min_elevation));
                    list.push(Property::number("Max Elevation", stats.max_elevation));
                    list.push(Property::number("Elevation Gain", stats.elevation_gain));
                    list.push(Property::number("Elevation Loss", stats.elevation_loss));
                }
                list
            }
        }
    }
}

fn line_entries(p: &PolylineProperties) -> Vec<Property> {
    vec![
        Property::number("Length", p.length),
        Property::number("Segments", p.segment_lengths.len() as f64),
        Property::number("Center Lat", p.center.lat),
        Property::number("Center Lng", p.center.lng),
        Property::number("Vertices", p.vertex_count as f64),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_serializes_lowercase() {
        let json = serde_json::to_string(&DataSource::Simulation).unwrap();
        assert_eq!(json, "\"simulation\"");
    }

    #[test]
    fn test_property_list_includes_elevation_stats() {
        let props = ShapeProperties::ElevationPolyline(ElevationProperties {
            line: PolylineProperties {
                length: 1000.0,
                segment_lengths: vec![1000.0],
                center: LatLng::new(0.0, 0.0),
                midpoints: vec![LatLng::new(0.0, 0.0)],
                vertex_count: 2,
            },
            sample_count: 10,
            data_source: DataSource::Api,
            stats: Some(ElevationStats {
                min_elevation: 90.0,
                max_elevation: 140.0,
                elevation_gain: 50.0,
                elevation_loss: 0.0,
            }),
        });

        let list = props.to_property_list();
        assert!(list.iter().any(|p| p.name == "Elevation Gain"));
        assert!(list
            .iter()
            .any(|p| p.value == PropertyValue::String("api".to_string())));
        assert_eq!(props.length(), Some(1000.0));
        assert_eq!(props.area(), None);
    }
}
