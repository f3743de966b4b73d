use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use fieldplan_core::geo;
use fieldplan_core::{ArcProperties, GeometryError, LatLng};
use fieldplan_settings::ArcSettings;

use super::circle::check_radius;

/// Circular sector swept counterclockwise from `start_angle` to `stop_angle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleArc {
    pub center: LatLng,
    pub radius: f64,
    /// Degrees in `[0, 360)`.
    pub start_angle: f64,
    /// Degrees in `[0, 360)`.
    pub stop_angle: f64,
}

impl CircleArc {
    pub fn new(
        center: LatLng,
        radius: f64,
        start_angle: f64,
        stop_angle: f64,
    ) -> Result<Self, GeometryError> {
        geo::validate(center)?;
        check_radius(radius)?;
        for (name, value) in [("start_angle", start_angle), ("stop_angle", stop_angle)] {
            if !value.is_finite() {
                return Err(GeometryError::InvalidDimension { name, value });
            }
        }
        Ok(Self {
            center,
            radius,
            start_angle: geo::normalize_angle_deg(start_angle),
            stop_angle: geo::normalize_angle_deg(stop_angle),
        })
    }

    /// Half disc facing north, as produced by the semicircle tool.
    pub fn semicircle(center: LatLng, radius: f64) -> Result<Self, GeometryError> {
        Self::new(center, radius, 0.0, 180.0)
    }

    /// Angular span in `(0, 360]`. Coincident start and stop mean a full turn.
    pub fn opening_angle(&self) -> f64 {
        opening_between(self.start_angle, self.stop_angle)
    }

    /// Angle halfway through the sweep.
    pub fn mid_angle(&self) -> f64 {
        geo::normalize_angle_deg(self.start_angle + self.opening_angle() / 2.0)
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

    pub fn resize_from_control_point(&mut self, mouse: LatLng) -> Result<(), GeometryError> {
        geo::validate(mouse)?;
        self.set_radius(geo::distance_meters(self.center, mouse))
    }

    /// Updates both angles under the interactive smoothing rules.
    ///
    /// The opening angle moves by at most `max_opening_step_deg` per call and
    /// stays within `[min_opening_deg, max_opening_deg]`. When only one of the
    /// two angles changed, the other one stays put and the moved one absorbs
    /// the clamping.
    pub fn set_angles(&mut self, start: f64, stop: f64, limits: &ArcSettings) -> Result<(), GeometryError> {
        for (name, value) in [("start_angle", start), ("stop_angle", stop)] {
            if !value.is_finite() {
                return Err(GeometryError::InvalidDimension { name, value });
            }
        }
        let start = geo::normalize_angle_deg(start);
        let stop = geo::normalize_angle_deg(stop);

        let current = self.opening_angle();
        let requested = opening_between(start, stop);
        let step = (requested - current).clamp(-limits.max_opening_step_deg, limits.max_opening_step_deg);
        let opening = (current + step).clamp(limits.min_opening_deg, limits.max_opening_deg);

        let start_moved = !same_angle(start, self.start_angle);
        let stop_moved = !same_angle(stop, self.stop_angle);

        if start_moved && !stop_moved {
            self.stop_angle = stop;
            self.start_angle = geo::normalize_angle_deg(stop - opening);
        } else {
            self.start_angle = start;
            self.stop_angle = geo::normalize_angle_deg(start + opening);
        }
        Ok(())
    }

    /// Sets the sweep directly, keeping the start angle.
    pub fn set_opening_angle(&mut self, opening: f64, limits: &ArcSettings) -> Result<(), GeometryError> {
        if !(opening.is_finite() && opening > 0.0 && opening <= 360.0) {
            return Err(GeometryError::InvalidDimension {
                name: "opening_angle",
                value: opening,
            });
        }
        let opening = opening.clamp(limits.min_opening_deg, limits.max_opening_deg);
        self.stop_angle = geo::normalize_angle_deg(self.start_angle + opening);
        Ok(())
    }

    pub fn start_point(&self) -> LatLng {
        geo::point_on_circle(self.center, self.radius, self.start_angle)
    }

    pub fn stop_point(&self) -> LatLng {
        geo::point_on_circle(self.center, self.radius, self.stop_angle)
    }

    pub fn mid_point(&self) -> LatLng {
        geo::point_on_circle(self.center, self.radius, self.mid_angle())
    }

    /// Point halfway between the center and the rim at `angle_deg`.
    pub fn inner_point(&self, angle_deg: f64) -> LatLng {
        geo::point_on_circle(self.center, self.radius / 2.0, angle_deg)
    }

    /// Closed outline: center, `segments + 1` arc points, center.
    pub fn outline(&self, segments: usize) -> Vec<LatLng> {
        let segments = segments.max(1);
        let opening = self.opening_angle();
        let mut points = Vec::with_capacity(segments + 3);
        points.push(self.center);
        for i in 0..=segments {
            let angle = self.start_angle + opening * i as f64 / segments as f64;
            points.push(geo::point_on_circle(self.center, self.radius, angle));
        }
        points.push(self.center);
        points
    }

    pub fn contains(&self, point: LatLng, tolerance_m: f64) -> bool {
        if geo::distance_meters(self.center, point) > self.radius + tolerance_m {
            return false;
        }
        let offset = geo::normalize_angle_deg(geo::angle_to(self.center, point) - self.start_angle);
        offset <= self.opening_angle()
    }

    pub fn properties(&self) -> ArcProperties {
        let opening = self.opening_angle();
        let theta = opening.to_radians();
        let arc_length = self.radius * theta;
        let perimeter = if opening >= 360.0 {
            2.0 * PI * self.radius
        } else {
            arc_length + 2.0 * self.radius
        };
        ArcProperties {
            center: self.center,
            radius: self.radius,
            start_angle: self.start_angle,
            stop_angle: self.stop_angle,
            opening_angle: opening,
            arc_length,
            area: 0.5 * self.radius * self.radius * theta,
            perimeter,
        }
    }
}

fn opening_between(start: f64, stop: f64) -> f64 {
    let opening = geo::normalize_angle_deg(stop - start);
    if opening == 0.0 {
        360.0
    } else {
        opening
    }
}

fn same_angle(a: f64, b: f64) -> bool {
    let d = geo::normalize_angle_deg(a - b);
    d < 1e-9 || 360.0 - d < 1e-9
}
