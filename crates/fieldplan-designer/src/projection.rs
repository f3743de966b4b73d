//! Map projection between geographic and container pixel coordinates.
//!
//! Rectangle math runs in pixel space, so it needs a projection of the
//! current map view. The map widget provides one through [`Projection`];
//! [`WebMercatorProjection`] is a self-contained implementation for headless
//! use and tests.

use std::f64::consts::PI;

use fieldplan_core::{LatLng, PixelPoint};

/// Latitude limit of the Web Mercator square.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Tile edge length in pixels.
const TILE_SIZE: f64 = 256.0;

/// Coordinate transforms of the current map view.
pub trait Projection {
    fn lat_lng_to_container_point(&self, position: LatLng) -> PixelPoint;
    fn container_point_to_lat_lng(&self, point: PixelPoint) -> LatLng;
    fn zoom(&self) -> f64;
}

/// Spherical Web Mercator view with a fixed container size.
#[derive(Debug, Clone)]
pub struct WebMercatorProjection {
    zoom: f64,
    /// World pixel coordinate of the container's top-left corner.
    origin: PixelPoint,
    width: f64,
    height: f64,
}

impl WebMercatorProjection {
    /// Creates a view of `width` x `height` pixels centered on `center`.
    pub fn new(center: LatLng, zoom: f64, width: f64, height: f64) -> Self {
        let mut projection = Self {
            zoom,
            origin: PixelPoint::default(),
            width,
            height,
        };
        projection.set_center(center);
        projection
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Geographic position of the container center.
    pub fn center(&self) -> LatLng {
        self.container_point_to_lat_lng(PixelPoint::new(self.width / 2.0, self.height / 2.0))
    }

    pub fn set_center(&mut self, center: LatLng) {
        let world = project(center, self.zoom);
        self.origin = PixelPoint::new(world.x - self.width / 2.0, world.y - self.height / 2.0);
    }

    /// Changes zoom, keeping the container center fixed.
    pub fn set_zoom(&mut self, zoom: f64) {
        let center = self.center();
        self.zoom = zoom;
        self.set_center(center);
    }

    /// Pans the view by a pixel delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.origin.x += dx;
        self.origin.y += dy;
    }

    /// Changes the container size, keeping the center fixed.
    pub fn set_size(&mut self, width: f64, height: f64) {
        let center = self.center();
        self.width = width;
        self.height = height;
        self.set_center(center);
    }
}

impl Projection for WebMercatorProjection {
    fn lat_lng_to_container_point(&self, position: LatLng) -> PixelPoint {
        let world = project(position, self.zoom);
        PixelPoint::new(world.x - self.origin.x, world.y - self.origin.y)
    }

    fn container_point_to_lat_lng(&self, point: PixelPoint) -> LatLng {
        unproject(
            PixelPoint::new(point.x + self.origin.x, point.y + self.origin.y),
            self.zoom,
        )
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }
}

/// Converts a coordinate to world pixels at `zoom`.
///
/// ```text
/// x = (lng + 180) / 360 * scale
/// y = (1 - ln(tan(lat) + sec(lat)) / pi) / 2 * scale
/// ```
fn project(position: LatLng, zoom: f64) -> PixelPoint {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = position.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (position.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    PixelPoint::new(x, y)
}

fn unproject(point: PixelPoint, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lng = point.x / scale * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * point.y / scale);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldplan_core::geo;

    #[test]
    fn test_center_maps_to_container_middle() {
        let center = LatLng::new(45.0, 5.0);
        let projection = WebMercatorProjection::new(center, 17.0, 800.0, 600.0);
        let p = projection.lat_lng_to_container_point(center);
        assert!((p.x - 400.0).abs() < 1e-6);
        assert!((p.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let projection = WebMercatorProjection::new(LatLng::new(43.6, 3.88), 16.0, 1024.0, 768.0);
        let p = LatLng::new(43.6012, 3.8791);
        let back = projection.container_point_to_lat_lng(projection.lat_lng_to_container_point(p));
        assert!((back.lat - p.lat).abs() < 1e-10);
        assert!((back.lng - p.lng).abs() < 1e-10);
    }

    #[test]
    fn test_pixel_scale_matches_ground_resolution() {
        let center = LatLng::new(45.0, 5.0);
        let projection = WebMercatorProjection::new(center, 18.0, 800.0, 600.0);
        let east = geo::from_local_meters(center, 100.0, 0.0);

        let a = projection.lat_lng_to_container_point(center);
        let b = projection.lat_lng_to_container_point(east);
        let expected = geo::meters_to_pixels(100.0, center.lat, 18.0);
        assert!((a.distance_to(&b) - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn test_zoom_keeps_center() {
        let center = LatLng::new(44.0, 4.0);
        let mut projection = WebMercatorProjection::new(center, 12.0, 640.0, 480.0);
        projection.set_zoom(15.0);
        let c = projection.center();
        assert!((c.lat - center.lat).abs() < 1e-9);
        assert!((c.lng - center.lng).abs() < 1e-9);
        assert_eq!(projection.zoom(), 15.0);
    }

    #[test]
    fn test_north_is_up() {
        let center = LatLng::new(44.0, 4.0);
        let projection = WebMercatorProjection::new(center, 14.0, 640.0, 480.0);
        let north = projection.lat_lng_to_container_point(LatLng::new(44.01, 4.0));
        assert!(north.y < 240.0);
    }
}
