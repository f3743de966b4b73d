//! Algebraic laws of the shape model.

use proptest::prelude::*;
use std::f64::consts::PI;

use fieldplan_core::geo;
use fieldplan_core::LatLng;
use fieldplan_designer::{Circle, CircleArc, Polygon, Rectangle, WebMercatorProjection};
use fieldplan_settings::ArcSettings;

fn center() -> impl Strategy<Value = LatLng> {
    (-60.0f64..60.0, -170.0f64..170.0).prop_map(|(lat, lng)| LatLng::new(lat, lng))
}

/// Star-shaped ring around `center`, so it never self-intersects.
fn ring() -> impl Strategy<Value = Vec<LatLng>> {
    let c = (-60.0f64..60.0, -30.0f64..30.0).prop_map(|(lat, lng)| LatLng::new(lat, lng));
    (c, prop::collection::vec((10.0f64..500.0, 0.0f64..1.0), 3..9)).prop_map(|(c, spokes)| {
        let n = spokes.len() as f64;
        spokes
            .iter()
            .enumerate()
            .map(|(i, (radius, jitter))| {
                let angle = (i as f64 + 0.8 * jitter) / n * 2.0 * PI;
                geo::from_local_meters(c, radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_circle_area_and_perimeter(c in center(), r in prop_oneof![Just(1.0f64), Just(10.0), Just(1000.0)]) {
        let props = Circle::new(c, r).unwrap().properties();
        prop_assert!((props.area - PI * r * r).abs() < 1e-9 * r * r);
        prop_assert!((props.perimeter - 2.0 * PI * r).abs() < 1e-9 * r);
    }

    #[test]
    fn test_rectangle_corners_round_trip(
        c in center(),
        width in 1.0f64..500.0,
        height in 1.0f64..500.0,
        rotation in 0.0f64..360.0,
    ) {
        let proj = WebMercatorProjection::new(c, 16.0, 1024.0, 768.0);
        let rect = Rectangle::new(c, width, height, rotation).unwrap();
        let local: Vec<(f64, f64)> = rect
            .corners(&proj)
            .iter()
            .map(|p| rect.lat_lng_to_local(&proj, *p))
            .collect();

        let w = local[1].0 - local[0].0;
        let h = local[0].1 - local[3].1;
        prop_assert!((w - width).abs() < 1e-6, "width {} vs {}", w, width);
        prop_assert!((h - height).abs() < 1e-6, "height {} vs {}", h, height);
        prop_assert!((local[2].0 - local[1].0).abs() < 1e-6);
    }

    #[test]
    fn test_polygon_area_is_order_invariant(points in ring(), shift in 0usize..8) {
        let area = Polygon::new(points.clone()).unwrap().area();

        let mut rotated = points.clone();
        let k = shift % rotated.len();
        rotated.rotate_left(k);
        let mut reversed = points;
        reversed.reverse();

        // Absolute slack for the rounding of the longitude differences
        let tol = 0.5 + 1e-9 * area;
        prop_assert!((Polygon::new(rotated).unwrap().area() - area).abs() < tol);
        prop_assert!((Polygon::new(reversed).unwrap().area() - area).abs() < tol);
        prop_assert!(area > 0.0);
    }

    #[test]
    fn test_arc_opening_stays_in_range(
        start in -720.0f64..720.0,
        stop in -720.0f64..720.0,
        edits in prop::collection::vec((0.0f64..360.0, 0.0f64..360.0), 1..20),
    ) {
        let mut arc = CircleArc::new(LatLng::new(45.0, 5.0), 25.0, start, stop).unwrap();
        let opening = arc.opening_angle();
        prop_assert!(opening > 0.0 && opening <= 360.0, "opening {}", opening);

        let limits = ArcSettings::default();
        for (s, e) in edits {
            arc.set_angles(s, e, &limits).unwrap();
            let opening = arc.opening_angle();
            prop_assert!(
                (limits.min_opening_deg - 1e-6..=limits.max_opening_deg + 1e-6).contains(&opening),
                "opening {} out of range",
                opening
            );
        }
    }
}
