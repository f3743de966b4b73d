//! Geometry math over geographic coordinates.
//!
//! Two levels of accuracy are used on purpose:
//!
//! - Offsets from a reference point (circle points, local frames) use an
//!   equirectangular approximation: a constant number of meters per degree of
//!   latitude, with longitude scaled by `cos(latitude)`. Within an irrigation
//!   plot (a few kilometers) the error is well below a meter, but it is not
//!   geodesically exact and degrades quickly towards the poles.
//! - Distances and polygon areas use spherical formulas (haversine and the
//!   spherical-excess ring sum).
//!
//! Angles are in degrees, measured counterclockwise from east.

use crate::data::{LatLng, PixelPoint};
use crate::error::GeometryError;

/// Meters per degree of latitude in the equirectangular approximation.
pub const METERS_PER_DEGREE_LAT: f64 = 111_319.9;

/// Mean earth radius used for distances.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Equatorial radius used for spherical polygon areas.
pub const WGS84_RADIUS_M: f64 = 6_378_137.0;

/// Ground resolution of a 256px Web Mercator tile at zoom 0 on the equator.
pub const TILE_RESOLUTION_M: f64 = 156_543.033_92;

/// Rejects NaN, infinite, or out-of-range coordinates.
pub fn validate(point: LatLng) -> Result<LatLng, GeometryError> {
    if point.is_valid() {
        Ok(point)
    } else {
        Err(GeometryError::InvalidCoordinate {
            lat: point.lat,
            lng: point.lng,
        })
    }
}

/// Normalizes an angle into `[0, 360)`.
pub fn normalize_angle_deg(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Point at `angle_deg` on a circle of `radius_m` around `center`.
///
/// ```text
/// lat = center.lat + r / 111319.9 * sin(a)
/// lng = center.lng + r / (111319.9 * cos(center.lat)) * cos(a)
/// ```
pub fn point_on_circle(center: LatLng, radius_m: f64, angle_deg: f64) -> LatLng {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    from_local_meters(center, radius_m * cos, radius_m * sin)
}

/// Converts an east/north offset in meters from `origin` into a coordinate.
pub fn from_local_meters(origin: LatLng, east_m: f64, north_m: f64) -> LatLng {
    let lat = origin.lat + north_m / METERS_PER_DEGREE_LAT;
    let lng = origin.lng + east_m / (METERS_PER_DEGREE_LAT * origin.lat.to_radians().cos());
    LatLng::new(lat, lng)
}

/// East/north offset of `point` from `origin`, inverse of [`from_local_meters`].
pub fn to_local_meters(origin: LatLng, point: LatLng) -> (f64, f64) {
    let east = (point.lng - origin.lng) * METERS_PER_DEGREE_LAT * origin.lat.to_radians().cos();
    let north = (point.lat - origin.lat) * METERS_PER_DEGREE_LAT;
    (east, north)
}

/// Direction from `center` to `point` in local meters, normalized to `[0, 360)`.
pub fn angle_to(center: LatLng, point: LatLng) -> f64 {
    let (east, north) = to_local_meters(center, point);
    normalize_angle_deg(north.atan2(east).to_degrees())
}

/// Ground meters covered by one pixel at `latitude` and `zoom`.
///
/// ```text
/// meters_per_pixel = 156543.03392 * cos(lat) / 2^zoom
/// ```
pub fn meters_per_pixel(latitude: f64, zoom: f64) -> f64 {
    TILE_RESOLUTION_M * latitude.to_radians().cos() / 2f64.powf(zoom)
}

pub fn meters_to_pixels(meters: f64, latitude: f64, zoom: f64) -> f64 {
    meters / meters_per_pixel(latitude, zoom)
}

pub fn pixels_to_meters(pixels: f64, latitude: f64, zoom: f64) -> f64 {
    pixels * meters_per_pixel(latitude, zoom)
}

/// Great-circle distance in meters (haversine).
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Coordinate-wise midpoint.
pub fn midpoint(a: LatLng, b: LatLng) -> LatLng {
    LatLng::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
}

pub fn pixel_midpoint(a: PixelPoint, b: PixelPoint) -> PixelPoint {
    PixelPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Length of each consecutive segment.
pub fn segment_lengths(points: &[LatLng]) -> Vec<f64> {
    points
        .windows(2)
        .map(|w| distance_meters(w[0], w[1]))
        .collect()
}

/// Total length of an open polyline in meters.
pub fn line_length(points: &[LatLng]) -> f64 {
    segment_lengths(points).iter().sum()
}

/// Point at `distance_m` along the polyline, clamped to its extent.
///
/// Returns `None` only for an empty input.
pub fn point_at_distance_along_line(points: &[LatLng], distance_m: f64) -> Option<LatLng> {
    let first = *points.first()?;
    if points.len() == 1 || distance_m <= 0.0 || !distance_m.is_finite() {
        return Some(first);
    }

    let mut travelled = 0.0;
    for w in points.windows(2) {
        let seg = distance_meters(w[0], w[1]);
        if seg > 0.0 && travelled + seg >= distance_m {
            let t = (distance_m - travelled) / seg;
            return Some(LatLng::new(
                w[0].lat + (w[1].lat - w[0].lat) * t,
                w[0].lng + (w[1].lng - w[0].lng) * t,
            ));
        }
        travelled += seg;
    }

    points.last().copied()
}

/// Perimeter of an implicitly closed ring in meters.
pub fn polygon_perimeter(ring: &[LatLng]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    let closing = distance_meters(ring[ring.len() - 1], ring[0]);
    line_length(ring) + closing
}

/// Area of an implicitly closed ring in m².
///
/// Spherical-excess approximation of the ring on a sphere of the WGS84
/// equatorial radius. The magnitude is independent of the starting vertex
/// and of the winding direction.
pub fn polygon_area(ring: &[LatLng]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let lower = ring[i];
        let middle = ring[(i + 1) % n];
        let upper = ring[(i + 2) % n];
        total += (upper.lng.to_radians() - lower.lng.to_radians()) * middle.lat.to_radians().sin();
    }

    (total * WGS84_RADIUS_M * WGS84_RADIUS_M / 2.0).abs()
}

/// Area-weighted centroid of a ring.
///
/// Computed in a local frame anchored on the first vertex. Degenerate rings
/// (collinear or repeated vertices) fall back to the vertex mean.
pub fn polygon_centroid(ring: &[LatLng]) -> Option<LatLng> {
    let origin = *ring.first()?;
    let local: Vec<(f64, f64)> = ring.iter().map(|p| to_local_meters(origin, *p)).collect();
    let n = local.len();

    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (x0, y0) = local[i];
        let (x1, y1) = local[(i + 1) % n];
        let cross = x0 * y1 - x1 * y0;
        twice_area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }

    if twice_area.abs() < 1e-9 {
        return vertex_mean(ring);
    }

    let factor = 1.0 / (3.0 * twice_area);
    Some(from_local_meters(origin, cx * factor, cy * factor))
}

pub fn vertex_mean(points: &[LatLng]) -> Option<LatLng> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(LatLng::new(lat / n, lng / n))
}

/// South-west and north-east corners of the points' bounding box.
pub fn bounding_box(points: &[LatLng]) -> Option<(LatLng, LatLng)> {
    let first = *points.first()?;
    let (mut sw, mut ne) = (first, first);
    for p in &points[1..] {
        sw.lat = sw.lat.min(p.lat);
        sw.lng = sw.lng.min(p.lng);
        ne.lat = ne.lat.max(p.lat);
        ne.lng = ne.lng.max(p.lng);
    }
    Some((sw, ne))
}

/// Shortest distance in meters from `point` to segment `a`-`b`, in a local frame.
pub fn distance_to_segment(point: LatLng, a: LatLng, b: LatLng) -> f64 {
    let (px, py) = to_local_meters(a, point);
    let (bx, by) = to_local_meters(a, b);
    let len_sq = bx * bx + by * by;
    let t = if len_sq > 0.0 {
        ((px * bx + py * by) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dx = px - bx * t;
    let dy = py - by * t;
    (dx * dx + dy * dy).sqrt()
}

/// Even-odd point-in-ring test in a local frame.
pub fn ring_contains(ring: &[LatLng], point: LatLng) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let (px, py) = to_local_meters(point, point);
    let local: Vec<(f64, f64)> = ring.iter().map(|p| to_local_meters(point, *p)).collect();

    let mut inside = false;
    let mut j = local.len() - 1;
    for i in 0..local.len() {
        let (xi, yi) = local[i];
        let (xj, yj) = local[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
