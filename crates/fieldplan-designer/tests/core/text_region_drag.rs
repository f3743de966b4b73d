use std::sync::Arc;

use fieldplan_core::geo;
use fieldplan_core::{EventBus, LatLng, ShapeId, ShapeProperties};
use fieldplan_designer::{
    HandleRole, HeadlessSurface, MapEditor, PointerEvent, ShapeGeometry, ShapeStyle, TextRegion,
};
use fieldplan_settings::EditorSettings;

const CENTER: LatLng = LatLng { lat: 45.0, lng: 5.0 };

fn editor_with_region() -> (MapEditor<HeadlessSurface>, ShapeId, TextRegion) {
    let surface = HeadlessSurface::centered(CENTER, 17.0);
    let mut editor = MapEditor::new(surface, EditorSettings::default(), Arc::new(EventBus::new()));
    let region = TextRegion::new(CENTER, 40.0, 20.0, 30.0, "Pump house").unwrap();
    let id = editor.add_shape(ShapeGeometry::TextRegion(region.clone()), ShapeStyle::default());
    editor.select(id).unwrap();
    (editor, id, region)
}

fn handle_at(editor: &MapEditor<HeadlessSurface>, role: HandleRole) -> LatLng {
    editor.controller().and_then(|c| c.handle(role)).map(|h| h.position).unwrap()
}

fn current_region(editor: &MapEditor<HeadlessSurface>, id: ShapeId) -> TextRegion {
    match editor.shape(id).unwrap().geometry() {
        ShapeGeometry::TextRegion(t) => t.clone(),
        other => panic!("unexpected {:?}", other),
    }
}

fn assert_handles_follow(editor: &MapEditor<HeadlessSurface>, region: &TextRegion) {
    for (i, corner) in region.corners().iter().enumerate() {
        let off = geo::distance_meters(handle_at(editor, HandleRole::Corner(i)), *corner);
        assert!(off < 1e-6, "corner {} handle is off by {} m", i, off);
    }
    let offset_m = geo::pixels_to_meters(
        editor.settings().interaction.rotation_handle_offset_px,
        region.center().lat,
        17.0,
    );
    let off = geo::distance_meters(handle_at(editor, HandleRole::Rotation), region.rotation_handle(offset_m));
    assert!(off < 1e-6, "rotation handle is off by {} m", off);
    assert_eq!(editor.surface().marker_count(), 6);
}

#[test]
fn test_corner_drag_pins_opposite_corner() {
    let (mut editor, id, original) = editor_with_region();
    let frame = original.frame();
    let opposite = original.corners()[3];
    let target = frame.from_local(30.0, 12.0);

    let start = handle_at(&editor, HandleRole::Corner(1));
    assert!(editor.on_pointer_down(PointerEvent::at_ms(start, 0)));
    editor.on_pointer_move(PointerEvent::at_ms(frame.from_local(25.0, 11.0), 20));

    // The pinned corner's handle is never touched mid-drag
    assert_eq!(handle_at(&editor, HandleRole::Corner(3)), opposite);

    editor.on_pointer_move(PointerEvent::at_ms(target, 40));
    editor.on_pointer_up();

    let region = current_region(&editor, id);
    assert!((region.width() - 50.0).abs() < 1e-3, "width should be 50, got {}", region.width());
    assert!((region.height() - 22.0).abs() < 1e-3, "height should be 22, got {}", region.height());
    assert!((region.rotation() - 30.0).abs() < 1e-6);

    let pinned = geo::distance_meters(region.corners()[3], opposite);
    assert!(pinned < 1e-3, "opposite corner moved by {} m", pinned);
    let reached = geo::distance_meters(region.corners()[1], target);
    assert!(reached < 1e-3, "dragged corner is {} m from the pointer", reached);

    let shape = editor.shape(id).unwrap();
    assert!(!shape.is_stale());
    match shape.properties() {
        ShapeProperties::TextRegion(p) => {
            assert!((p.width - region.width()).abs() < 1e-9);
            assert!((p.height - region.height()).abs() < 1e-9);
            assert!((p.area - region.width() * region.height()).abs() < 1e-6);
            assert_eq!(p.text, "Pump house");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_handles_follow(&editor, &region);
}

#[test]
fn test_corner_drag_past_opposite_keeps_minimum_size() {
    let (mut editor, id, original) = editor_with_region();
    let opposite = original.corners()[2];

    let start = handle_at(&editor, HandleRole::Corner(0));
    assert!(editor.on_pointer_down(PointerEvent::at_ms(start, 0)));
    // Well beyond the bottom-right corner
    editor.on_pointer_move(PointerEvent::at_ms(original.frame().from_local(40.0, -30.0), 20));
    editor.on_pointer_up();

    let region = current_region(&editor, id);
    assert!(region.width() > 0.0 && region.height() > 0.0);
    assert!(region.width() < 40.0 && region.height() < 20.0);
    let pinned = geo::distance_meters(region.corners()[2], opposite);
    assert!(pinned < 1e-3, "opposite corner moved by {} m", pinned);
    assert_handles_follow(&editor, &region);
}

#[test]
fn test_rotation_handle_turns_top_towards_pointer() {
    let (mut editor, id, _) = editor_with_region();
    let west = geo::from_local_meters(CENTER, -50.0, 0.0);

    let start = handle_at(&editor, HandleRole::Rotation);
    assert!(editor.on_pointer_down(PointerEvent::at_ms(start, 0)));
    editor.on_pointer_move(PointerEvent::at_ms(west, 20));
    editor.on_pointer_up();

    let region = current_region(&editor, id);
    assert!((region.rotation() - 90.0).abs() < 1e-6, "rotation should be 90, got {}", region.rotation());
    assert!((region.width() - 40.0).abs() < 1e-6);
    assert!((region.height() - 20.0).abs() < 1e-6);
    assert!(geo::distance_meters(region.center(), CENTER) < 1e-6);

    match editor.shape(id).unwrap().properties() {
        ShapeProperties::TextRegion(p) => assert!((p.rotation - region.rotation()).abs() < 1e-9),
        other => panic!("unexpected {:?}", other),
    }
    assert_handles_follow(&editor, &region);
}
