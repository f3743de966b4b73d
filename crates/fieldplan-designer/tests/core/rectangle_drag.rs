use std::sync::Arc;

use fieldplan_core::geo;
use fieldplan_core::{EventBus, LatLng, ShapeId, ShapeProperties};
use fieldplan_designer::{
    HandleRole, HeadlessSurface, MapEditor, PointerEvent, Rectangle, ShapeGeometry, ShapeStyle,
};
use fieldplan_settings::EditorSettings;

fn editor_with_rectangle() -> (MapEditor<HeadlessSurface>, ShapeId, Rectangle) {
    let surface = HeadlessSurface::centered(LatLng::new(45.0, 5.0), 17.0);
    let mut editor = MapEditor::new(surface, EditorSettings::default(), Arc::new(EventBus::new()));
    let rect = Rectangle::new(LatLng::new(45.0, 5.0), 100.0, 60.0, 30.0).unwrap();
    let id = editor.add_shape(ShapeGeometry::Rectangle(rect.clone()), ShapeStyle::default());
    editor.select(id).unwrap();
    (editor, id, rect)
}

fn handle_at(editor: &MapEditor<HeadlessSurface>, role: HandleRole) -> LatLng {
    editor.controller().and_then(|c| c.handle(role)).map(|h| h.position).unwrap()
}

fn current_rectangle(editor: &MapEditor<HeadlessSurface>, id: ShapeId) -> Rectangle {
    match editor.shape(id).unwrap().geometry() {
        ShapeGeometry::Rectangle(r) => r.clone(),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_corner_drag_leaves_consistent_properties() {
    let (mut editor, id, original) = editor_with_rectangle();
    let opposite = original.corner(editor.surface(), 2);
    let midway = original.local_to_lat_lng(editor.surface(), -60.0, 35.0);
    let target = original.local_to_lat_lng(editor.surface(), -70.0, 40.0);

    let start = handle_at(&editor, HandleRole::Corner(0));
    assert!(editor.on_pointer_down(PointerEvent::at_ms(start, 0)));
    editor.on_pointer_move(PointerEvent::at_ms(midway, 20));
    // Inside the frame interval: held back until pointer-up
    editor.on_pointer_move(PointerEvent::at_ms(target, 25));
    editor.on_pointer_up();

    let rect = current_rectangle(&editor, id);
    assert!((rect.width - 120.0).abs() < 0.01, "width should be 120, got {}", rect.width);
    assert!((rect.height - 70.0).abs() < 0.01, "height should be 70, got {}", rect.height);

    let moved = geo::distance_meters(rect.corner(editor.surface(), 2), opposite);
    assert!(moved < 0.01, "opposite corner moved by {} m", moved);

    let shape = editor.shape(id).unwrap();
    assert!(!shape.is_stale());
    match shape.properties() {
        ShapeProperties::Rectangle(p) => {
            assert_eq!(p.width, rect.width);
            assert_eq!(p.height, rect.height);
            let corners = rect.corners(editor.surface());
            for (cached, live) in p.corners.iter().zip(corners.iter()) {
                assert!(geo::distance_meters(*cached, *live) < 1e-6);
            }
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_corner_handles_are_rebuilt_at_final_positions() {
    let (mut editor, id, original) = editor_with_rectangle();
    let target = original.local_to_lat_lng(editor.surface(), -70.0, 40.0);

    let start = handle_at(&editor, HandleRole::Corner(0));
    editor.on_pointer_down(PointerEvent::at_ms(start, 0));
    editor.on_pointer_move(PointerEvent::at_ms(target, 20));
    editor.on_pointer_up();

    let rect = current_rectangle(&editor, id);
    for i in 0..4 {
        let handle = handle_at(&editor, HandleRole::Corner(i));
        let corner = rect.corner(editor.surface(), i);
        assert!(
            geo::distance_meters(handle, corner) < 1e-6,
            "corner {} handle is off by {} m",
            i,
            geo::distance_meters(handle, corner)
        );
    }
    assert_eq!(editor.surface().marker_count(), 10);
}

#[test]
fn test_side_drag_changes_one_dimension() {
    let (mut editor, id, original) = editor_with_rectangle();
    let target = original.local_to_lat_lng(editor.surface(), 80.0, 0.0);

    let start = handle_at(&editor, HandleRole::Side(1));
    editor.on_pointer_down(PointerEvent::at_ms(start, 0));
    editor.on_pointer_move(PointerEvent::at_ms(target, 20));
    editor.on_pointer_up();

    let rect = current_rectangle(&editor, id);
    assert!((rect.width - 130.0).abs() < 0.01, "width should be 130, got {}", rect.width);
    assert!((rect.height - 60.0).abs() < 1e-9);
    assert!((rect.rotation - 30.0).abs() < 1e-9);
}

#[test]
fn test_rotation_handle_faces_pointer() {
    let (mut editor, id, _) = editor_with_rectangle();
    let east = LatLng::new(45.0, 5.001);

    let start = handle_at(&editor, HandleRole::Rotation);
    editor.on_pointer_down(PointerEvent::at_ms(start, 0));
    editor.on_pointer_move(PointerEvent::at_ms(east, 20));
    editor.on_pointer_up();

    let rect = current_rectangle(&editor, id);
    assert!((rect.rotation - 270.0).abs() < 0.5, "rotation should be 270, got {}", rect.rotation);
    assert!((rect.width - 100.0).abs() < 1e-9);
}
