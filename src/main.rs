use anyhow::{bail, Context};
use std::path::PathBuf;
use std::sync::Arc;

use fieldplan::{init_logging, EditorSettings, EventBus, HeadlessSurface, LatLng, MapEditor, PlanFile};

/// Zoom at which rectangle pixel math is evaluated.
const INSPECTION_ZOOM: f64 = 18.0;

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let Some(plan_path) = args.next().map(PathBuf::from) else {
        bail!("usage: fieldplan <plan.json> [settings.toml|settings.json]");
    };

    let settings = match args.next() {
        Some(path) => EditorSettings::load_from_file(path.as_ref())
            .with_context(|| format!("Failed to load settings from {}", path))?,
        None => EditorSettings::default(),
    };

    let plan = PlanFile::load_from_file(&plan_path)?;
    let parts = plan.to_geometries()?;
    let center = parts
        .first()
        .map(|(geometry, _)| geometry.center())
        .unwrap_or(LatLng::new(0.0, 0.0));

    let surface = HeadlessSurface::centered(center, INSPECTION_ZOOM);
    let mut editor = MapEditor::new(surface, settings, Arc::new(EventBus::new()));
    editor.import_plan(&plan)?;

    println!("{} ({} shapes)", plan.metadata.name, editor.store().len());
    for shape in editor.store().iter() {
        println!("\n{} {}", shape.id(), shape.kind());
        for property in shape.properties().to_property_list() {
            println!("  {:<20} {}", property.name, property.value);
        }
    }

    Ok(())
}
