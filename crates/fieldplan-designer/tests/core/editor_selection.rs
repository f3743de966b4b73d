//! Selection exclusivity and control point lifetime.

use parking_lot::Mutex;
use std::sync::Arc;

use fieldplan_core::{EventBus, EventCategory, EventFilter, GeometryError, LatLng, PlanEvent, ShapeId, ShapeKind};
use fieldplan_designer::{
    Circle, DragOutcome, DrawingMode, HandleRole, HeadlessSurface, MapEditor, MarkerId, PointerEvent, RawGeometry,
    ShapeGeometry, ShapeStyle,
};
use fieldplan_settings::EditorSettings;

fn editor() -> MapEditor<HeadlessSurface> {
    let surface = HeadlessSurface::centered(LatLng::new(45.0, 5.0), 17.0);
    MapEditor::new(surface, EditorSettings::default(), Arc::new(EventBus::new()))
}

fn add_circle(editor: &mut MapEditor<HeadlessSurface>, lat: f64, lng: f64) -> ShapeId {
    let circle = Circle::new(LatLng::new(lat, lng), 20.0).unwrap();
    editor.add_shape(ShapeGeometry::Circle(circle), ShapeStyle::default())
}

fn live_markers(editor: &MapEditor<HeadlessSurface>) -> Vec<MarkerId> {
    let mut ids: Vec<MarkerId> = editor.surface().markers().map(|(id, _)| *id).collect();
    ids.sort();
    ids
}

fn owned_markers(editor: &MapEditor<HeadlessSurface>) -> Vec<MarkerId> {
    let mut ids: Vec<MarkerId> = editor
        .controller()
        .map(|c| c.handles().iter().map(|h| h.marker).collect())
        .unwrap_or_default();
    ids.sort();
    ids
}

fn radius_handle(editor: &MapEditor<HeadlessSurface>) -> LatLng {
    editor
        .controller()
        .and_then(|c| c.handle(HandleRole::Radius(0)))
        .map(|h| h.position)
        .unwrap()
}

#[test]
fn test_selecting_second_shape_releases_first() {
    let mut editor = editor();
    let a = add_circle(&mut editor, 45.0, 5.0);
    let b = add_circle(&mut editor, 45.002, 5.0);

    editor.select(a).unwrap();
    let a_markers = owned_markers(&editor);
    assert_eq!(a_markers.len(), 9);

    editor.select(b).unwrap();
    assert_eq!(editor.selected_id(), Some(b));

    // Every live marker belongs to B; none of A's survived
    let live = live_markers(&editor);
    assert_eq!(live, owned_markers(&editor));
    assert!(live.iter().all(|id| !a_markers.contains(id)));
    assert_eq!(editor.surface().tooltip_count(), 0);
}

#[test]
fn test_selection_change_mid_drag_restores_panning() {
    let mut editor = editor();
    let a = add_circle(&mut editor, 45.0, 5.0);
    let b = add_circle(&mut editor, 45.002, 5.0);
    editor.select(a).unwrap();

    let handle = radius_handle(&editor);
    assert!(editor.on_pointer_down(PointerEvent::at_ms(handle, 0)));
    assert!(!editor.surface().panning_enabled());
    assert_eq!(editor.surface().tooltip_count(), 1);

    editor.select(b).unwrap();
    assert!(editor.surface().panning_enabled());
    assert_eq!(editor.surface().tooltip_count(), 0);
    assert_eq!(live_markers(&editor), owned_markers(&editor));
}

#[test]
fn test_zoom_start_clears_everything() {
    let mut editor = editor();
    let a = add_circle(&mut editor, 45.0, 5.0);
    editor.select(a).unwrap();

    let handle = radius_handle(&editor);
    editor.on_pointer_down(PointerEvent::at_ms(handle, 0));
    editor.on_pointer_move(PointerEvent::at_ms(LatLng::new(45.0, 5.0004), 20));
    editor.on_zoom_start();

    assert_eq!(editor.selected_id(), None);
    assert!(editor.controller().is_none());
    assert_eq!(editor.surface().marker_count(), 0);
    assert_eq!(editor.surface().tooltip_count(), 0);
    assert!(editor.surface().panning_enabled());

    // Geometry keeps the last applied drag tick
    let radius = match editor.shape(a).unwrap().geometry() {
        ShapeGeometry::Circle(c) => c.radius,
        other => panic!("unexpected {:?}", other),
    };
    assert!(radius > 25.0, "radius should follow the drag, got {}", radius);
}

#[test]
fn test_pointer_up_ends_drag_and_is_idempotent() {
    let mut editor = editor();
    let a = add_circle(&mut editor, 45.0, 5.0);
    editor.select(a).unwrap();

    let handle = radius_handle(&editor);
    editor.on_pointer_down(PointerEvent::at_ms(handle, 0));
    editor.on_pointer_move(PointerEvent::at_ms(LatLng::new(45.0, 5.0005), 20));

    assert!(matches!(
        editor.on_pointer_up(),
        DragOutcome::Finished {
            geometry_changed: true,
            refresh_profile: false
        }
    ));
    assert_eq!(editor.on_pointer_up(), DragOutcome::Ignored);
    assert!(editor.surface().panning_enabled());
}

#[test]
fn test_shape_updated_is_published_once_per_drag() {
    let mut editor = editor();
    let a = add_circle(&mut editor, 45.0, 5.0);
    editor.select(a).unwrap();

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    editor
        .event_bus()
        .subscribe(EventFilter::Categories(vec![EventCategory::Shape]), move |event| {
            if let PlanEvent::ShapeUpdated { shape_id, .. } = event {
                sink.lock().push(shape_id);
            }
        });

    let handle = radius_handle(&editor);
    editor.on_pointer_down(PointerEvent::at_ms(handle, 0));
    for (i, lng) in [5.0003, 5.0004, 5.0005, 5.0006].iter().enumerate() {
        editor.on_pointer_move(PointerEvent::at_ms(LatLng::new(45.0, *lng), 20 * (i as u64 + 1)));
    }
    assert!(updates.lock().is_empty());
    assert!(editor.shape(a).unwrap().is_stale());

    editor.on_pointer_up();
    assert_eq!(updates.lock().as_slice(), &[a]);
    assert!(!editor.shape(a).unwrap().is_stale());
}

#[test]
fn test_drawing_semicircle_selects_it() {
    let mut editor = editor();
    editor.set_mode(DrawingMode::Semicircle);
    let id = editor
        .complete_drawing(RawGeometry::Circle {
            center: LatLng::new(45.0, 5.0),
            radius: 30.0,
        })
        .unwrap();

    let shape = editor.shape(id).unwrap();
    assert_eq!(shape.kind(), ShapeKind::Arc);
    match shape.geometry() {
        ShapeGeometry::Arc(a) => {
            assert_eq!(a.start_angle, 0.0);
            assert_eq!(a.stop_angle, 180.0);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(editor.selected_id(), Some(id));
    assert_eq!(editor.surface().marker_count(), 4);
}

#[test]
fn test_degenerate_drawing_is_rejected() {
    let mut editor = editor();
    editor.set_mode(DrawingMode::Polygon);
    let result = editor.complete_drawing(RawGeometry::Polygon {
        points: vec![LatLng::new(45.0, 5.0), LatLng::new(45.001, 5.0)],
    });

    assert!(matches!(
        result,
        Err(GeometryError::TooFewVertices {
            kind: ShapeKind::Polygon,
            required: 3,
            actual: 2
        })
    ));
    assert!(editor.store().is_empty());
    assert_eq!(editor.surface().marker_count(), 0);
}

#[test]
fn test_hover_preview_is_dropped_on_selection() {
    let mut editor = editor();
    let a = add_circle(&mut editor, 45.0, 5.0);
    let b = add_circle(&mut editor, 45.002, 5.0);
    editor.select(a).unwrap();

    editor.on_pointer_hover(LatLng::new(45.002, 5.0));
    assert_eq!(editor.hover().map(|h| h.shape_id()), Some(b));
    assert_eq!(editor.surface().marker_count(), 18);

    editor.select(b).unwrap();
    assert!(editor.hover().is_none());
    assert_eq!(live_markers(&editor), owned_markers(&editor));
}

#[test]
fn test_removed_shape_releases_controls() {
    let mut editor = editor();
    let a = add_circle(&mut editor, 45.0, 5.0);
    editor.select(a).unwrap();

    assert!(editor.remove_shape(a).is_some());
    assert_eq!(editor.selected_id(), None);
    assert_eq!(editor.surface().marker_count(), 0);

    // Events for a shape that no longer exists are ignored
    assert!(!editor.on_pointer_down(PointerEvent::at_ms(LatLng::new(45.0, 5.0), 0)));
    assert_eq!(editor.on_pointer_up(), DragOutcome::Ignored);
}
