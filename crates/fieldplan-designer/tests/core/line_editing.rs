use std::sync::Arc;

use fieldplan_core::{EventBus, LatLng, ShapeId};
use fieldplan_designer::{
    Circle, DragOutcome, ElevationPolyline, HandleRole, HeadlessSurface, MapEditor, PointerEvent, Polygon, Polyline,
    ShapeGeometry, ShapeStyle,
};
use fieldplan_settings::EditorSettings;

fn editor_at(center: LatLng) -> MapEditor<HeadlessSurface> {
    let surface = HeadlessSurface::centered(center, 17.0);
    MapEditor::new(surface, EditorSettings::default(), Arc::new(EventBus::new()))
}

fn vertices(editor: &MapEditor<HeadlessSurface>, id: ShapeId) -> Vec<LatLng> {
    editor
        .shape(id)
        .and_then(|s| s.geometry().vertices())
        .map(|v| v.to_vec())
        .unwrap()
}

#[test]
fn test_kilometer_line_length_and_midpoints() {
    let mut line = Polyline::new(vec![LatLng::new(0.0, 0.0), LatLng::new(0.01, 0.0)]).unwrap();
    let length = line.length();
    assert!((length - 1112.0).abs() < 11.12, "length should be ~1112 m, got {}", length);

    let mid = line.segment_midpoint(0).unwrap();
    line.insert_vertex(0, mid).unwrap();

    let mids = line.midpoints();
    assert_eq!(mids.len(), 2);
    assert!((mids[0].lat - 0.0025).abs() < 1e-12);
    assert!((mids[1].lat - 0.0075).abs() < 1e-12);
}

#[test]
fn test_circle_point_at_zero_lies_east() {
    let circle = Circle::new(LatLng::new(45.0, 5.0), 50.0).unwrap();
    let p = circle.point_on_circle(0.0);
    assert!(p.lng > 5.0);
    assert!((p.lat - 45.0).abs() < 1e-9);
}

#[test]
fn test_midpoint_drag_inserts_polygon_vertex() {
    let center = LatLng::new(45.0, 5.0);
    let mut editor = editor_at(center);
    let square = Polygon::new(vec![
        LatLng::new(45.0, 5.0),
        LatLng::new(45.0, 5.001),
        LatLng::new(45.001, 5.001),
        LatLng::new(45.001, 5.0),
    ])
    .unwrap();
    let id = editor.add_shape(ShapeGeometry::Polygon(square), ShapeStyle::default());
    editor.select(id).unwrap();
    assert_eq!(editor.surface().marker_count(), 9);

    let handle = editor
        .controller()
        .and_then(|c| c.handle(HandleRole::SegmentMidpoint(0)))
        .map(|h| h.position)
        .unwrap();
    let dragged = LatLng::new(44.9995, 5.0005);

    assert!(editor.on_pointer_down(PointerEvent::at_ms(handle, 0)));
    editor.on_pointer_move(PointerEvent::at_ms(dragged, 20));
    // The drag now follows the inserted vertex
    assert_eq!(
        editor.controller().and_then(|c| c.active_role()),
        Some(HandleRole::Vertex(1))
    );
    editor.on_pointer_up();

    let points = vertices(&editor, id);
    assert_eq!(points.len(), 5);
    assert_eq!(points[1], dragged);
    assert_eq!(editor.surface().marker_count(), 11);
}

#[test]
fn test_vertex_drag_moves_only_neighbouring_midpoints() {
    let mut editor = editor_at(LatLng::new(45.0, 5.0));
    let line = Polyline::new(vec![
        LatLng::new(45.0, 5.0),
        LatLng::new(45.0, 5.001),
        LatLng::new(45.0, 5.002),
        LatLng::new(45.0, 5.003),
    ])
    .unwrap();
    let id = editor.add_shape(ShapeGeometry::Polyline(line), ShapeStyle::default());
    editor.select(id).unwrap();

    let far_midpoint = |editor: &MapEditor<HeadlessSurface>| {
        editor
            .controller()
            .and_then(|c| c.handle(HandleRole::SegmentMidpoint(2)))
            .map(|h| h.position)
            .unwrap()
    };
    let before = far_midpoint(&editor);

    let handle = vertices(&editor, id)[0];
    editor.on_pointer_down(PointerEvent::at_ms(handle, 0));
    editor.on_pointer_move(PointerEvent::at_ms(LatLng::new(45.0003, 5.0), 20));

    assert_eq!(far_midpoint(&editor), before);
    let near = editor
        .controller()
        .and_then(|c| c.handle(HandleRole::SegmentMidpoint(0)))
        .map(|h| h.position)
        .unwrap();
    assert!((near.lat - 45.00015).abs() < 1e-9, "midpoint should follow, got {:?}", near);

    editor.on_pointer_up();
    assert_eq!(vertices(&editor, id)[0], LatLng::new(45.0003, 5.0));
}

#[test]
fn test_elevation_line_drag_requests_profile_refresh() {
    let mut editor = editor_at(LatLng::new(45.0, 5.0));
    let line = ElevationPolyline::new(vec![LatLng::new(45.0, 5.0), LatLng::new(45.0, 5.002)]).unwrap();
    let id = editor.add_shape(ShapeGeometry::ElevationPolyline(line), ShapeStyle::default());
    editor.select(id).unwrap();

    // Vertices only, no insertion handles
    assert_eq!(editor.surface().marker_count(), 3);

    let handle = vertices(&editor, id)[1];
    editor.on_pointer_down(PointerEvent::at_ms(handle, 0));
    editor.on_pointer_move(PointerEvent::at_ms(LatLng::new(45.001, 5.002), 20));

    assert_eq!(
        editor.on_pointer_up(),
        DragOutcome::Finished {
            geometry_changed: true,
            refresh_profile: true
        }
    );
    assert_eq!(vertices(&editor, id).len(), 2);
    let queued = editor.take_pending_profile_requests();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].shape_id, id);
}
