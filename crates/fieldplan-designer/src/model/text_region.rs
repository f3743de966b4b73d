//! Text annotation laid out as a rotated rectangle.
//!
//! The four corners are the stored geometry; width, height, and rotation are
//! read back from them. Corner math uses a local tangent frame in meters
//! around the region's center, so no map projection is needed.

use serde::{Deserialize, Serialize};

use fieldplan_core::geo;
use fieldplan_core::{GeometryError, LatLng, TextRegionProperties};

use super::rectangle::{CORNER_SIGNS, MIN_DIMENSION_M};

/// Relative tolerance on side lengths and diagonals.
const SHAPE_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub text_color: String,
    pub font_family: String,
    pub font_size_px: f64,
    pub text_align: TextAlign,
    pub background_color: String,
    pub background_opacity: f64,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text_color: "#000000".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            font_size_px: 14.0,
            text_align: TextAlign::Center,
            background_color: "#FFFFFF".to_string(),
            background_opacity: 1.0,
            bold: false,
            italic: false,
        }
    }
}

/// Center, size, and rotation recovered from four corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFrame {
    pub center: LatLng,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl RegionFrame {
    /// Corners in top-left, top-right, bottom-right, bottom-left order.
    pub fn corners(&self) -> [LatLng; 4] {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        CORNER_SIGNS.map(|(sx, sy)| {
            let (x, y) = (sx * self.width / 2.0, sy * self.height / 2.0);
            geo::from_local_meters(self.center, x * cos - y * sin, x * sin + y * cos)
        })
    }

    /// Local-frame coordinates of `point`.
    pub fn to_local(&self, point: LatLng) -> (f64, f64) {
        let (e, n) = geo::to_local_meters(self.center, point);
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        (e * cos + n * sin, -e * sin + n * cos)
    }

    pub fn from_local(&self, x: f64, y: f64) -> LatLng {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        geo::from_local_meters(self.center, x * cos - y * sin, x * sin + y * cos)
    }
}

/// Outcome of [`TextRegion::enforce_rectangular_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRepair {
    /// Corners already formed a valid rectangle.
    Valid,
    /// Corners were rebuilt from their bounding box.
    RebuiltFromBounds,
    /// Corners were reset to the last valid set.
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    corners: [LatLng; 4],
    #[serde(skip)]
    last_good: Option<[LatLng; 4]>,
    pub text: String,
    pub style: TextStyle,
}

impl TextRegion {
    pub fn new(
        center: LatLng,
        width: f64,
        height: f64,
        rotation: f64,
        text: impl Into<String>,
    ) -> Result<Self, GeometryError> {
        geo::validate(center)?;
        for (name, value) in [("width", width), ("height", height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::InvalidDimension { name, value });
            }
        }
        let frame = RegionFrame {
            center,
            width,
            height,
            rotation: geo::normalize_angle_deg(rotation),
        };
        Self::from_corners(frame.corners(), text)
    }

    /// Axis-aligned region spanning the given bounds.
    pub fn from_bounds(south_west: LatLng, north_east: LatLng, text: impl Into<String>) -> Result<Self, GeometryError> {
        geo::validate(south_west)?;
        geo::validate(north_east)?;
        Self::from_corners(bounds_corners(south_west, north_east), text)
    }

    /// Builds from explicit corners; they must already form a rectangle.
    pub fn from_corners(corners: [LatLng; 4], text: impl Into<String>) -> Result<Self, GeometryError> {
        if frame_of(&corners).is_none() {
            return Err(GeometryError::InvalidDimension {
                name: "corners",
                value: geo::distance_meters(corners[0], corners[2]),
            });
        }
        Ok(Self {
            corners,
            last_good: Some(corners),
            text: text.into(),
            style: TextStyle::default(),
        })
    }

    pub fn corners(&self) -> &[LatLng; 4] {
        &self.corners
    }

    /// Frame of the current corners, or of the last valid set.
    pub fn frame(&self) -> RegionFrame {
        frame_of(&self.corners)
            .or_else(|| self.last_good.as_ref().and_then(frame_of))
            .unwrap_or(RegionFrame {
                center: self.corners[0],
                width: MIN_DIMENSION_M,
                height: MIN_DIMENSION_M,
                rotation: 0.0,
            })
    }

    pub fn center(&self) -> LatLng {
        self.frame().center
    }

    pub fn width(&self) -> f64 {
        self.frame().width
    }

    pub fn height(&self) -> f64 {
        self.frame().height
    }

    pub fn rotation(&self) -> f64 {
        self.frame().rotation
    }

    /// Replaces the corners and repairs them if they are not a rectangle.
    pub fn set_corners(&mut self, corners: [LatLng; 4]) -> ShapeRepair {
        self.corners = corners;
        self.enforce_rectangular_shape()
    }

    /// Checks the corners and self-heals invalid geometry.
    ///
    /// A valid set becomes the new last-known-good set. An invalid one is
    /// replaced by the axis-aligned rectangle of its bounding box, and when
    /// even that is degenerate the last valid corners come back.
    pub fn enforce_rectangular_shape(&mut self) -> ShapeRepair {
        if frame_of(&self.corners).is_some() {
            self.last_good = Some(self.corners);
            return ShapeRepair::Valid;
        }

        let finite: Vec<LatLng> = self.corners.iter().copied().filter(LatLng::is_valid).collect();
        if finite.len() == 4 {
            if let Some((sw, ne)) = geo::bounding_box(&finite) {
                let rebuilt = bounds_corners(sw, ne);
                if frame_of(&rebuilt).is_some() {
                    tracing::warn!("Text region corners were not rectangular, rebuilt from bounds");
                    self.corners = rebuilt;
                    self.last_good = Some(rebuilt);
                    return ShapeRepair::RebuiltFromBounds;
                }
            }
        }

        tracing::warn!("Text region corners unrecoverable, reverting to last valid geometry");
        if let Some(good) = self.last_good {
            self.corners = good;
        }
        ShapeRepair::Reverted
    }

    pub fn move_to(&mut self, center: LatLng) -> Result<(), GeometryError> {
        geo::validate(center)?;
        let frame = self.frame();
        self.apply_frame(RegionFrame { center, ..frame })
    }

    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), GeometryError> {
        if !rotation.is_finite() {
            return Err(GeometryError::InvalidDimension {
                name: "rotation",
                value: rotation,
            });
        }
        let frame = self.frame();
        self.apply_frame(RegionFrame {
            rotation: geo::normalize_angle_deg(rotation),
            ..frame
        })
    }

    /// Rotates so that the top side faces `point`.
    pub fn rotate_towards(&mut self, point: LatLng) -> Result<(), GeometryError> {
        geo::validate(point)?;
        let center = self.center();
        if geo::distance_meters(center, point) == 0.0 {
            return Ok(());
        }
        self.set_rotation(geo::angle_to(center, point) - 90.0)
    }

    /// Moves corner `index` to `point` with the opposite corner fixed.
    pub fn resize_from_corner(&mut self, index: usize, point: LatLng) -> Result<(), GeometryError> {
        geo::validate(point)?;
        let &(sx, sy) = CORNER_SIGNS
            .get(index)
            .ok_or(GeometryError::VertexOutOfRange { index, len: 4 })?;
        let frame = self.frame();
        let (ox, oy) = (-sx * frame.width / 2.0, -sy * frame.height / 2.0);
        let (px, py) = frame.to_local(point);

        let width = ((px - ox) * sx).max(MIN_DIMENSION_M);
        let height = ((py - oy) * sy).max(MIN_DIMENSION_M);
        let center = frame.from_local(ox + sx * width / 2.0, oy + sy * height / 2.0);

        self.apply_frame(RegionFrame {
            center,
            width,
            height,
            rotation: frame.rotation,
        })
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    pub fn rotation_handle(&self, offset_m: f64) -> LatLng {
        let frame = self.frame();
        frame.from_local(0.0, frame.height / 2.0 + offset_m)
    }

    pub fn contains(&self, point: LatLng, tolerance_m: f64) -> bool {
        let frame = self.frame();
        let (x, y) = frame.to_local(point);
        x.abs() <= frame.width / 2.0 + tolerance_m && y.abs() <= frame.height / 2.0 + tolerance_m
    }

    pub fn properties(&self) -> TextRegionProperties {
        let frame = self.frame();
        TextRegionProperties {
            center: frame.center,
            width: frame.width,
            height: frame.height,
            area: frame.width * frame.height,
            rotation: frame.rotation,
            text: self.text.clone(),
        }
    }

    fn apply_frame(&mut self, frame: RegionFrame) -> Result<(), GeometryError> {
        let corners = frame.corners();
        for c in &corners {
            geo::validate(*c)?;
        }
        self.corners = corners;
        self.enforce_rectangular_shape();
        Ok(())
    }
}

fn bounds_corners(sw: LatLng, ne: LatLng) -> [LatLng; 4] {
    [
        LatLng::new(ne.lat, sw.lng),
        LatLng::new(ne.lat, ne.lng),
        LatLng::new(sw.lat, ne.lng),
        LatLng::new(sw.lat, sw.lng),
    ]
}

/// Frame of four corners when they form a non-degenerate rectangle.
fn frame_of(corners: &[LatLng; 4]) -> Option<RegionFrame> {
    if !corners.iter().all(LatLng::is_valid) {
        return None;
    }
    let center = geo::vertex_mean(corners)?;
    let local = (*corners).map(|p| geo::to_local_meters(center, p));

    let side = |a: (f64, f64), b: (f64, f64)| ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    let top = side(local[0], local[1]);
    let right = side(local[1], local[2]);
    let bottom = side(local[2], local[3]);
    let left = side(local[3], local[0]);
    let diag_a = side(local[0], local[2]);
    let diag_b = side(local[1], local[3]);

    if top < MIN_DIMENSION_M / 2.0 || right < MIN_DIMENSION_M / 2.0 {
        return None;
    }
    let scale = top.max(right);
    let tolerance = SHAPE_TOLERANCE * scale + 1e-6;
    if (top - bottom).abs() > tolerance
        || (right - left).abs() > tolerance
        || (diag_a - diag_b).abs() > tolerance
    {
        return None;
    }

    // Top edge runs along +x; its direction gives the rotation
    let rotation = (local[1].1 - local[0].1).atan2(local[1].0 - local[0].0).to_degrees();

    // The frame must keep corner 0 above corner 3 in its own axes
    let (sin, cos) = rotation.to_radians().sin_cos();
    let y0 = -local[0].0 * sin + local[0].1 * cos;
    let y3 = -local[3].0 * sin + local[3].1 * cos;
    if y0 <= y3 {
        return None;
    }

    Some(RegionFrame {
        center,
        width: top,
        height: right,
        rotation: geo::normalize_angle_deg(rotation),
    })
}
