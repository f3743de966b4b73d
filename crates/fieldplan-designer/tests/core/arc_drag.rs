use std::sync::Arc;

use fieldplan_core::geo;
use fieldplan_core::{EventBus, LatLng, ShapeId, ShapeProperties};
use fieldplan_designer::{
    CircleArc, DragOutcome, HandleRole, HeadlessSurface, MapEditor, PointerEvent, ShapeGeometry, ShapeStyle,
};
use fieldplan_settings::EditorSettings;

const CENTER: LatLng = LatLng { lat: 45.0, lng: 5.0 };
const RADIUS: f64 = 30.0;

fn editor_with_arc() -> (MapEditor<HeadlessSurface>, ShapeId) {
    let surface = HeadlessSurface::centered(CENTER, 17.0);
    let mut editor = MapEditor::new(surface, EditorSettings::default(), Arc::new(EventBus::new()));
    let arc = CircleArc::new(CENTER, RADIUS, 45.0, 135.0).unwrap();
    let id = editor.add_shape(ShapeGeometry::Arc(arc), ShapeStyle::default());
    editor.select(id).unwrap();
    (editor, id)
}

fn handle_at(editor: &MapEditor<HeadlessSurface>, role: HandleRole) -> LatLng {
    editor.controller().and_then(|c| c.handle(role)).map(|h| h.position).unwrap()
}

fn current_arc(editor: &MapEditor<HeadlessSurface>, id: ShapeId) -> CircleArc {
    match editor.shape(id).unwrap().geometry() {
        ShapeGeometry::Arc(a) => a.clone(),
        other => panic!("unexpected {:?}", other),
    }
}

/// Drags `role` along the rim through `angles`, one applied tick each.
fn drag_along_rim(editor: &mut MapEditor<HeadlessSurface>, role: HandleRole, angles: &[f64]) -> DragOutcome {
    let start = handle_at(editor, role);
    assert!(editor.on_pointer_down(PointerEvent::at_ms(start, 0)));
    for (tick, angle) in angles.iter().enumerate() {
        let rim = geo::point_on_circle(CENTER, RADIUS, *angle);
        editor.on_pointer_move(PointerEvent::at_ms(rim, 20 * (tick as u64 + 1)));
    }
    editor.on_pointer_up()
}

fn assert_near(handle: LatLng, expected: LatLng, what: &str) {
    let off = geo::distance_meters(handle, expected);
    assert!(off < 1e-6, "{} handle is off by {} m", what, off);
}

fn assert_handles_follow(editor: &MapEditor<HeadlessSurface>, arc: &CircleArc) {
    assert_near(handle_at(editor, HandleRole::ArcStart), arc.start_point(), "start");
    assert_near(handle_at(editor, HandleRole::ArcStop), arc.stop_point(), "stop");
    assert_near(handle_at(editor, HandleRole::ArcRadius), arc.mid_point(), "radius");
    assert_near(handle_at(editor, HandleRole::Center), CENTER, "center");
    assert_eq!(editor.surface().marker_count(), 4);
}

#[test]
fn test_stop_drag_opens_by_one_step_per_tick() {
    let (mut editor, id) = editor_with_arc();

    // Asks for a 205° sweep in one tick
    let outcome = drag_along_rim(&mut editor, HandleRole::ArcStop, &[250.0]);
    assert_eq!(
        outcome,
        DragOutcome::Finished {
            geometry_changed: true,
            refresh_profile: false
        }
    );

    let arc = current_arc(&editor, id);
    assert!((arc.start_angle - 45.0).abs() < 1e-9);
    assert!((arc.stop_angle - 180.0).abs() < 1e-6, "stop should be 180, got {}", arc.stop_angle);
    assert!((arc.opening_angle() - 135.0).abs() < 1e-6);

    match editor.shape(id).unwrap().properties() {
        ShapeProperties::Arc(p) => {
            assert!((p.opening_angle - arc.opening_angle()).abs() < 1e-9);
            assert!((p.stop_angle - arc.stop_angle).abs() < 1e-9);
            assert!((p.radius - RADIUS).abs() < 1e-9);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_handles_follow(&editor, &arc);
}

#[test]
fn test_stop_drag_stops_short_of_full_circle() {
    let (mut editor, id) = editor_with_arc();

    drag_along_rim(
        &mut editor,
        HandleRole::ArcStop,
        &[175.0, 215.0, 255.0, 295.0, 335.0, 15.0, 44.0, 44.0],
    );

    let arc = current_arc(&editor, id);
    let opening = arc.opening_angle();
    assert!(opening <= 355.0 + 1e-6, "opening exceeded the upper bound: {}", opening);
    assert!((opening - 355.0).abs() < 1e-6, "opening should rest at 355, got {}", opening);
    assert!((arc.start_angle - 45.0).abs() < 1e-9);
    assert!((arc.stop_angle - 40.0).abs() < 1e-6);
    assert_handles_follow(&editor, &arc);
}

#[test]
fn test_start_drag_keeps_minimum_opening() {
    let (mut editor, id) = editor_with_arc();

    // First tick is step limited, the second hits the lower bound
    drag_along_rim(&mut editor, HandleRole::ArcStart, &[133.0, 133.0]);

    let arc = current_arc(&editor, id);
    assert!((arc.stop_angle - 135.0).abs() < 1e-9, "stop must stay put, got {}", arc.stop_angle);
    assert!((arc.opening_angle() - 5.0).abs() < 1e-6, "opening {}", arc.opening_angle());
    assert!((arc.start_angle - 130.0).abs() < 1e-6);

    match editor.shape(id).unwrap().properties() {
        ShapeProperties::Arc(p) => {
            assert!((p.start_angle - 130.0).abs() < 1e-6);
            let expected_length = RADIUS * 5f64.to_radians();
            assert!((p.arc_length - expected_length).abs() < 1e-6);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_handles_follow(&editor, &arc);
}

#[test]
fn test_intermediate_tick_is_step_limited() {
    let (mut editor, id) = editor_with_arc();
    let start = handle_at(&editor, HandleRole::ArcStart);
    assert!(editor.on_pointer_down(PointerEvent::at_ms(start, 0)));

    let near_stop = geo::point_on_circle(CENTER, RADIUS, 133.0);
    editor.on_pointer_move(PointerEvent::at_ms(near_stop, 20));

    let arc = current_arc(&editor, id);
    assert!((arc.opening_angle() - 45.0).abs() < 1e-6, "opening {}", arc.opening_angle());
    assert!((arc.start_angle - 90.0).abs() < 1e-6);
    // Still mid-drag: the rim handle already follows, properties do not
    assert!(editor.shape(id).unwrap().is_stale());
    assert_near(handle_at(&editor, HandleRole::ArcRadius), arc.mid_point(), "radius");

    editor.on_pointer_up();
    assert!(!editor.shape(id).unwrap().is_stale());
}
