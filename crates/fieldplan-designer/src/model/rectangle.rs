//! Rotated rectangle.
//!
//! Stored as center, width, height, and rotation only. Corners and side
//! midpoints are always derived, so they cannot drift from those four values.
//!
//! The local frame has `x` along the width and `y` along the height, rotated
//! counterclockwise by `rotation` from east/north. Corners are indexed
//! top-left, top-right, bottom-right, bottom-left; sides are top, right,
//! bottom, left, and side `i` joins corners `i` and `i + 1`.
//!
//! Derived points are laid out in container pixel space at the current zoom,
//! then unprojected. Meters convert to pixels with the ground resolution at
//! the center latitude, which keeps rotated rectangles right-angled on screen.

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use fieldplan_core::geo;
use fieldplan_core::{GeometryError, LatLng, PixelPoint, RectangleProperties};

use crate::projection::Projection;

/// Smallest width or height a resize can produce, in meters.
pub const MIN_DIMENSION_M: f64 = 0.1;

/// Local-frame sign of each corner.
pub const CORNER_SIGNS: [(f64, f64); 4] = [(-1.0, 1.0), (1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)];

/// Local-frame sign of each side's outward normal.
pub const SIDE_NORMALS: [(f64, f64); 4] = [(0.0, 1.0), (1.0, 0.0), (0.0, -1.0), (-1.0, 0.0)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub center: LatLng,
    /// Meters along the local x axis.
    pub width: f64,
    /// Meters along the local y axis.
    pub height: f64,
    /// Degrees counterclockwise, in `[0, 360)`.
    pub rotation: f64,
}

impl Rectangle {
    pub fn new(center: LatLng, width: f64, height: f64, rotation: f64) -> Result<Self, GeometryError> {
        geo::validate(center)?;
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        if !rotation.is_finite() {
            return Err(GeometryError::InvalidDimension {
                name: "rotation",
                value: rotation,
            });
        }
        Ok(Self {
            center,
            width,
            height,
            rotation: geo::normalize_angle_deg(rotation),
        })
    }

    /// Axis-aligned rectangle spanning the given bounds.
    pub fn from_bounds(
        south_west: LatLng,
        north_east: LatLng,
        projection: &dyn Projection,
    ) -> Result<Self, GeometryError> {
        geo::validate(south_west)?;
        geo::validate(north_east)?;
        let center = geo::midpoint(south_west, north_east);
        let a = projection.lat_lng_to_container_point(south_west);
        let b = projection.lat_lng_to_container_point(north_east);
        let mpp = geo::meters_per_pixel(center.lat, projection.zoom());
        Self::new(center, (b.x - a.x).abs() * mpp, (b.y - a.y).abs() * mpp, 0.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.height)
    }

    pub fn move_to(&mut self, center: LatLng) -> Result<(), GeometryError> {
        self.center = geo::validate(center)?;
        Ok(())
    }

    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), GeometryError> {
        if !rotation.is_finite() {
            return Err(GeometryError::InvalidDimension {
                name: "rotation",
                value: rotation,
            });
        }
        self.rotation = geo::normalize_angle_deg(rotation);
        Ok(())
    }

    pub fn set_dimensions(&mut self, width: f64, height: f64) -> Result<(), GeometryError> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn rotation_matrix(&self) -> Rotation2<f64> {
        Rotation2::new(self.rotation.to_radians())
    }

    /// Container point of a local-frame offset given in meters.
    pub fn local_to_pixel(&self, projection: &dyn Projection, x_m: f64, y_m: f64) -> PixelPoint {
        let c = projection.lat_lng_to_container_point(self.center);
        let mpp = geo::meters_per_pixel(self.center.lat, projection.zoom());
        let v = self.rotation_matrix() * Vector2::new(x_m / mpp, y_m / mpp);
        // Pixel y grows downwards
        PixelPoint::new(c.x + v.x, c.y - v.y)
    }

    /// Local-frame offset in meters of a container point.
    pub fn pixel_to_local(&self, projection: &dyn Projection, point: PixelPoint) -> (f64, f64) {
        let c = projection.lat_lng_to_container_point(self.center);
        let mpp = geo::meters_per_pixel(self.center.lat, projection.zoom());
        let v = self.rotation_matrix().inverse() * Vector2::new(point.x - c.x, c.y - point.y);
        (v.x * mpp, v.y * mpp)
    }

    pub fn local_to_lat_lng(&self, projection: &dyn Projection, x_m: f64, y_m: f64) -> LatLng {
        projection.container_point_to_lat_lng(self.local_to_pixel(projection, x_m, y_m))
    }

    pub fn lat_lng_to_local(&self, projection: &dyn Projection, point: LatLng) -> (f64, f64) {
        self.pixel_to_local(projection, projection.lat_lng_to_container_point(point))
    }

    pub fn corner(&self, projection: &dyn Projection, index: usize) -> LatLng {
        let (sx, sy) = CORNER_SIGNS[index % 4];
        self.local_to_lat_lng(projection, sx * self.width / 2.0, sy * self.height / 2.0)
    }

    pub fn corners(&self, projection: &dyn Projection) -> [LatLng; 4] {
        [0, 1, 2, 3].map(|i| self.corner(projection, i))
    }

    pub fn side_midpoint(&self, projection: &dyn Projection, side: usize) -> LatLng {
        let (nx, ny) = SIDE_NORMALS[side % 4];
        self.local_to_lat_lng(projection, nx * self.width / 2.0, ny * self.height / 2.0)
    }

    pub fn side_midpoints(&self, projection: &dyn Projection) -> [LatLng; 4] {
        [0, 1, 2, 3].map(|i| self.side_midpoint(projection, i))
    }

    /// Position of the rotation handle, `offset_px` beyond the top side.
    pub fn rotation_handle(&self, projection: &dyn Projection, offset_px: f64) -> LatLng {
        let mpp = geo::meters_per_pixel(self.center.lat, projection.zoom());
        self.local_to_lat_lng(projection, 0.0, self.height / 2.0 + offset_px * mpp)
    }

    /// Moves corner `index` to `point` while the opposite corner stays fixed.
    ///
    /// The drag is read in the local frame, so only the two adjacent corners
    /// shift, each along one local axis. A corner dragged across the opposite
    /// one is held at the minimum size instead of flipping.
    pub fn resize_from_corner(
        &mut self,
        index: usize,
        point: LatLng,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        geo::validate(point)?;
        let &(sx, sy) = CORNER_SIGNS
            .get(index)
            .ok_or(GeometryError::VertexOutOfRange { index, len: 4 })?;
        let (ox, oy) = (-sx * self.width / 2.0, -sy * self.height / 2.0);
        let (px, py) = self.lat_lng_to_local(projection, point);

        let width = ((px - ox) * sx).max(MIN_DIMENSION_M);
        let height = ((py - oy) * sy).max(MIN_DIMENSION_M);
        let center = self.local_to_lat_lng(projection, ox + sx * width / 2.0, oy + sy * height / 2.0);

        self.center = geo::validate(center)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Moves side `side` to pass through `point`; only one local dimension changes.
    pub fn resize_from_side(
        &mut self,
        side: usize,
        point: LatLng,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        geo::validate(point)?;
        let &(nx, ny) = SIDE_NORMALS
            .get(side)
            .ok_or(GeometryError::VertexOutOfRange { index: side, len: 4 })?;
        let (px, py) = self.lat_lng_to_local(projection, point);

        let center = if nx != 0.0 {
            let fixed = -nx * self.width / 2.0;
            let width = ((px - fixed) * nx).max(MIN_DIMENSION_M);
            let c = self.local_to_lat_lng(projection, fixed + nx * width / 2.0, 0.0);
            self.width = width;
            c
        } else {
            let fixed = -ny * self.height / 2.0;
            let height = ((py - fixed) * ny).max(MIN_DIMENSION_M);
            let c = self.local_to_lat_lng(projection, 0.0, fixed + ny * height / 2.0);
            self.height = height;
            c
        };

        self.center = geo::validate(center)?;
        Ok(())
    }

    /// Rotates so that the top side faces `point`.
    pub fn rotate_towards(&mut self, point: LatLng, projection: &dyn Projection) -> Result<(), GeometryError> {
        geo::validate(point)?;
        let c = projection.lat_lng_to_container_point(self.center);
        let p = projection.lat_lng_to_container_point(point);
        let (dx, dy) = (p.x - c.x, c.y - p.y);
        if dx == 0.0 && dy == 0.0 {
            return Ok(());
        }
        self.set_rotation(dy.atan2(dx).to_degrees() - 90.0)
    }

    pub fn contains(&self, point: LatLng, projection: &dyn Projection, tolerance_m: f64) -> bool {
        let (x, y) = self.lat_lng_to_local(projection, point);
        x.abs() <= self.width / 2.0 + tolerance_m && y.abs() <= self.height / 2.0 + tolerance_m
    }

    pub fn properties(&self, projection: &dyn Projection) -> RectangleProperties {
        RectangleProperties {
            center: self.center,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            area: self.area(),
            perimeter: self.perimeter(),
            corners: self.corners(projection),
            side_midpoints: self.side_midpoints(projection),
        }
    }
}

fn check_dimension(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimension { name, value })
    }
}
