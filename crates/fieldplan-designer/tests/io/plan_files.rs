use std::sync::Arc;
use tempfile::TempDir;

use fieldplan_core::geo;
use fieldplan_core::{DataSource, EventBus, LatLng, ShapeKind};
use fieldplan_designer::{
    Circle, CircleArc, ElevationPolyline, ElevationSample, HeadlessSurface, MapEditor, PlanFile, Polygon, Rectangle,
    ShapeGeometry, ShapeRecord, ShapeStyle, TextRegion,
};
use fieldplan_settings::EditorSettings;

fn editor() -> MapEditor<HeadlessSurface> {
    let surface = HeadlessSurface::centered(LatLng::new(45.0, 5.0), 17.0);
    MapEditor::new(surface, EditorSettings::default(), Arc::new(EventBus::new()))
}

fn populate(editor: &mut MapEditor<HeadlessSurface>) {
    let c = LatLng::new(45.0, 5.0);
    editor.add_shape(
        ShapeGeometry::Circle(Circle::new(c, 15.0).unwrap()),
        ShapeStyle {
            color: "#00aa00".to_string(),
            ..ShapeStyle::default()
        },
    );
    editor.add_shape(
        ShapeGeometry::Arc(CircleArc::new(c, 30.0, 45.0, 135.0).unwrap()),
        ShapeStyle::default(),
    );
    editor.add_shape(
        ShapeGeometry::Rectangle(Rectangle::new(c, 40.0, 20.0, 15.0).unwrap()),
        ShapeStyle::default(),
    );
    editor.add_shape(
        ShapeGeometry::Polygon(
            Polygon::new(vec![
                LatLng::new(45.0, 5.0),
                LatLng::new(45.0, 5.001),
                LatLng::new(45.001, 5.0005),
            ])
            .unwrap(),
        ),
        ShapeStyle::default(),
    );
    editor.add_shape(
        ShapeGeometry::TextRegion(TextRegion::new(c, 30.0, 10.0, 20.0, "Pump house").unwrap()),
        ShapeStyle::default(),
    );
    let samples = vec![
        ElevationSample {
            distance: 0.0,
            elevation: 210.0,
        },
        ElevationSample {
            distance: 157.0,
            elevation: 224.5,
        },
    ];
    editor.add_shape(
        ShapeGeometry::ElevationPolyline(
            ElevationPolyline::new(vec![LatLng::new(45.0, 5.0), LatLng::new(45.0, 5.002)])
                .unwrap()
                .with_profile(samples, DataSource::Api),
        ),
        ShapeStyle::default(),
    );
}

#[test]
fn test_plan_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("orchard.json");

    let mut source = editor();
    populate(&mut source);
    source.export_plan("Orchard").save_to_file(&path).unwrap();

    let plan = PlanFile::load_from_file(&path).unwrap();
    assert_eq!(plan.version, "1.0");
    assert_eq!(plan.metadata.name, "Orchard");
    assert_eq!(plan.shapes.len(), 6);

    let mut target = editor();
    let ids = target.import_plan(&plan).unwrap();
    assert_eq!(ids.len(), 6);

    let kinds: Vec<ShapeKind> = target.store().iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ShapeKind::Circle,
            ShapeKind::Arc,
            ShapeKind::Rectangle,
            ShapeKind::Polygon,
            ShapeKind::TextRegion,
            ShapeKind::ElevationPolyline,
        ]
    );

    for (before, after) in source.store().iter().zip(target.store().iter()) {
        let drift = geo::distance_meters(before.center(), after.center());
        assert!(drift < 1e-6, "{} moved by {} m", after.id(), drift);
        assert_eq!(before.style, after.style);
    }

    let profile = target.shapes_of_kind(ShapeKind::ElevationPolyline).next().unwrap();
    match ShapeRecord::from_shape(profile) {
        ShapeRecord::ElevationLine(data) => {
            assert_eq!(data.samples.len(), 2);
            assert_eq!(data.data_source, DataSource::Api);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(target.store().iter().next().unwrap().style.color, "#00aa00");
}

#[test]
fn test_reloaded_text_region_keeps_its_frame() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("labels.json");

    let mut source = editor();
    populate(&mut source);
    source.export_plan("Labels").save_to_file(&path).unwrap();

    let mut target = editor();
    target.import_plan(&PlanFile::load_from_file(&path).unwrap()).unwrap();
    let region = target
        .shapes_of_kind(ShapeKind::TextRegion)
        .find_map(|s| match s.geometry() {
            ShapeGeometry::TextRegion(t) => Some(t.clone()),
            _ => None,
        })
        .unwrap();

    assert_eq!(region.text, "Pump house");
    assert!((region.width() - 30.0).abs() < 1e-3, "width {}", region.width());
    assert!((region.height() - 10.0).abs() < 1e-3, "height {}", region.height());
    assert!((region.rotation() - 20.0).abs() < 1e-3, "rotation {}", region.rotation());
}

#[test]
fn test_invalid_record_aborts_import() {
    let json = r##"{
        "version": "1.0",
        "metadata": {
            "name": "Broken",
            "created": "2026-03-01T08:00:00Z",
            "modified": "2026-03-01T08:00:00Z"
        },
        "shapes": [
            {"type": "circle", "data": {"center": [5.0, 45.0], "radius": 10.0}},
            {"type": "line", "data": {"points": [[5.0, 45.0]]}}
        ]
    }"##;
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    std::fs::write(&path, json).unwrap();

    let plan = PlanFile::load_from_file(&path).unwrap();
    let mut target = editor();
    let err = target.import_plan(&plan).unwrap_err();

    assert!(err.to_string().contains("#1"), "unexpected error: {}", err);
    assert!(target.store().is_empty());
}

#[test]
fn test_missing_file_has_context() {
    let temp_dir = TempDir::new().unwrap();
    let err = PlanFile::load_from_file(temp_dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read plan file"));
}
