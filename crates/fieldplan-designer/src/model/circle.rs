use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use fieldplan_core::geo;
use fieldplan_core::{CircleProperties, GeometryError, LatLng};

/// Angles of the eight radius handles.
pub const CARDINAL_ANGLES: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: LatLng,
    /// Radius in meters.
    pub radius: f64,
}

impl Circle {
    pub fn new(center: LatLng, radius: f64) -> Result<Self, GeometryError> {
        geo::validate(center)?;
        check_radius(radius)?;
        Ok(Self { center, radius })
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), GeometryError> {
        check_radius(radius)?;
        self.radius = radius;
        Ok(())
    }

    pub fn move_to(&mut self, center: LatLng) -> Result<(), GeometryError> {
        self.center = geo::validate(center)?;
        Ok(())
    }

    /// Sets the radius to the distance from the center to `mouse`.
    ///
    /// A pointer sitting exactly on the center is rejected and leaves the
    /// radius unchanged.
    pub fn resize_from_control_point(&mut self, mouse: LatLng) -> Result<(), GeometryError> {
        geo::validate(mouse)?;
        self.set_radius(geo::distance_meters(self.center, mouse))
    }

    pub fn point_on_circle(&self, angle_deg: f64) -> LatLng {
        geo::point_on_circle(self.center, self.radius, angle_deg)
    }

    pub fn cardinal_points(&self) -> [LatLng; 8] {
        CARDINAL_ANGLES.map(|a| self.point_on_circle(a))
    }

    pub fn contains(&self, point: LatLng, tolerance_m: f64) -> bool {
        geo::distance_meters(self.center, point) <= self.radius + tolerance_m
    }

    pub fn properties(&self) -> CircleProperties {
        CircleProperties {
            center: self.center,
            radius: self.radius,
            diameter: 2.0 * self.radius,
            area: PI * self.radius * self.radius,
            perimeter: 2.0 * PI * self.radius,
        }
    }
}

pub(crate) fn check_radius(radius: f64) -> Result<(), GeometryError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::NonPositiveRadius { radius })
    }
}
