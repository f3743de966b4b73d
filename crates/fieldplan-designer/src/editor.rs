//! Interaction routing for one map.
//!
//! [`MapEditor`] owns the shapes, the single selection, the active tool, and
//! at most two control point sets: the draggable one of the selected shape
//! and a temporary one for the shape under the pointer. Pointer handlers
//! never return errors; anything that cannot be routed is logged and
//! dropped so the host event loop keeps running.
//!
//! Editing an elevation line queues a fresh [`ProfileRequest`]. Hosts
//! either drain the queue with [`MapEditor::take_pending_profile_requests`]
//! and feed results back through [`MapEditor::complete_profile_refresh`],
//! or let [`MapEditor::resolve_pending_profiles`] do both.

use std::sync::Arc;
use tracing::{debug, warn};

use fieldplan_core::{
    EventBus, GeometryError, InteractionError, LatLng, PlanEvent, ShapeId, ShapeKind,
};
use fieldplan_settings::EditorSettings;

use crate::controls::{ControlPointController, DragOutcome};
use crate::elevation::{ElevationSampler, ElevationService, ProfileRequest, ProfileResult};
use crate::model::{Shape, ShapeGeometry, ShapeStyle};
use crate::projection::Projection;
use crate::selection_manager::SelectionManager;
use crate::serialization::PlanFile;
use crate::shape_store::ShapeStore;
use crate::surface::{InteractionSurface, PointerEvent, RawGeometry};
use crate::tools::DrawingMode;

/// Editing state bound to one interaction surface.
pub struct MapEditor<S: InteractionSurface> {
    surface: S,
    store: ShapeStore,
    selection: SelectionManager,
    mode: DrawingMode,
    controller: Option<ControlPointController>,
    hover: Option<ControlPointController>,
    bus: Arc<EventBus>,
    settings: EditorSettings,
    sampler: ElevationSampler,
    /// At most one request per elevation line, newest generation.
    pending_profiles: Vec<ProfileRequest>,
}

impl<S: InteractionSurface> MapEditor<S> {
    pub fn new(surface: S, settings: EditorSettings, bus: Arc<EventBus>) -> Self {
        let sampler = ElevationSampler::new(settings.elevation.clone());
        Self {
            surface,
            store: ShapeStore::new(),
            selection: SelectionManager::new(),
            mode: DrawingMode::default(),
            controller: None,
            hover: None,
            bus,
            settings,
            sampler,
            pending_profiles: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for view changes (pan, resize).
    ///
    /// Zoom changes should go through [`MapEditor::on_zoom_start`] first.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.store.get(id)
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.selection.selected_id()
    }

    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    /// Control points of the selected shape.
    pub fn controller(&self) -> Option<&ControlPointController> {
        self.controller.as_ref()
    }

    /// Temporary control points of the hovered shape.
    pub fn hover(&self) -> Option<&ControlPointController> {
        self.hover.as_ref()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn sampler(&self) -> &ElevationSampler {
        &self.sampler
    }

    /// Switches the active tool.
    ///
    /// Any drag in progress is cancelled. Drawing tools and the delete tool
    /// drop the current selection.
    pub fn set_mode(&mut self, mode: DrawingMode) {
        if mode == self.mode {
            return;
        }
        self.cancel_drag();
        self.clear_hover();
        if mode != DrawingMode::Select {
            self.deselect();
        }
        self.mode = mode;
        debug!("Drawing mode set to {}", mode);
        self.publish(PlanEvent::ToolChanged {
            tool: mode.to_string(),
        });
    }

    /// Turns a finished drawing gesture into a selected shape.
    pub fn complete_drawing(&mut self, raw: RawGeometry) -> Result<ShapeId, GeometryError> {
        let geometry = self.mode.build_geometry(raw, &self.surface)?;
        let id = self.add_shape(geometry, ShapeStyle::default());
        if let Err(e) = self.select(id) {
            warn!("Could not select new shape {}: {}", id, e);
        }
        Ok(id)
    }

    /// Adds already validated geometry on top of the draw order.
    pub fn add_shape(&mut self, geometry: ShapeGeometry, style: ShapeStyle) -> ShapeId {
        let id = self.store.allocate_id();
        let kind = geometry.kind();
        let mut shape = Shape::new(id, geometry, style, &self.surface);
        shape.attach_notifier(Arc::clone(&self.bus));
        self.store.insert(shape);
        debug!("Created {} ({})", id, kind);
        self.publish(PlanEvent::ShapeCreated { shape_id: id, kind });
        id
    }

    /// Removes a shape along with any control points it owns.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        if self.selection.is_selected(id) {
            self.deselect();
        }
        if self.hover.as_ref().is_some_and(|h| h.shape_id() == id) {
            self.clear_hover();
        }
        let shape = self.store.remove(id)?;
        self.pending_profiles.retain(|r| r.shape_id != id);
        self.publish(PlanEvent::ShapeRemoved { shape_id: id });
        Some(shape)
    }

    /// Removes every shape.
    pub fn clear(&mut self) {
        self.deselect();
        self.clear_hover();
        let ids: Vec<ShapeId> = self.store.draw_order().to_vec();
        self.store.clear();
        self.pending_profiles.clear();
        for shape_id in ids {
            self.publish(PlanEvent::ShapeRemoved { shape_id });
        }
    }

    /// Makes `id` the selected shape.
    ///
    /// The previous shape's control points are torn down before the new set
    /// is created.
    pub fn select(&mut self, id: ShapeId) -> Result<(), InteractionError> {
        if !self.store.contains(id) {
            return Err(InteractionError::ShapeNotFound(id));
        }
        if self.selection.is_selected(id) && self.controller.is_some() {
            return Ok(());
        }

        self.clear_hover();
        self.release_controls();

        let shape = self.store.get(id).ok_or(InteractionError::ShapeNotFound(id))?;
        self.controller = Some(ControlPointController::attach(
            shape,
            &mut self.surface,
            &self.settings,
        ));
        let previous = self.selection.select(id);
        self.publish(PlanEvent::SelectionChanged {
            previous,
            current: Some(id),
        });
        Ok(())
    }

    /// Clears the selection. Returns the shape that was selected.
    pub fn deselect(&mut self) -> Option<ShapeId> {
        self.release_controls();
        let previous = self.selection.clear();
        if previous.is_some() {
            self.publish(PlanEvent::SelectionChanged {
                previous,
                current: None,
            });
        }
        previous
    }

    /// Routes a pointer-down. Returns whether the event was consumed.
    pub fn on_pointer_down(&mut self, event: PointerEvent) -> bool {
        match self.try_pointer_down(event) {
            Ok(handled) => handled,
            Err(e) => {
                warn!("Ignoring pointer down: {}", e);
                false
            }
        }
    }

    /// Routes a pointer-move to the active drag, if any.
    pub fn on_pointer_move(&mut self, event: PointerEvent) {
        if let Err(e) = self.try_pointer_move(event) {
            warn!("Ignoring pointer move: {}", e);
            self.discard_orphaned_controls();
        }
    }

    /// Ends the active drag wherever the pointer was released.
    ///
    /// A changed elevation line gets a profile request queued.
    pub fn on_pointer_up(&mut self) -> DragOutcome {
        match self.try_pointer_up() {
            Ok(outcome) => {
                if let (DragOutcome::Finished { refresh_profile: true, .. }, Some(id)) =
                    (outcome, self.controller.as_ref().map(ControlPointController::shape_id))
                {
                    self.queue_profile_refresh(id);
                }
                outcome
            }
            Err(e) => {
                warn!("Ignoring pointer up: {}", e);
                self.discard_orphaned_controls();
                DragOutcome::Ignored
            }
        }
    }

    /// Shows temporary handles for the shape under the pointer.
    pub fn on_pointer_hover(&mut self, position: LatLng) {
        if self.mode != DrawingMode::Select
            || !self.surface.is_attached()
            || self.controller.as_ref().is_some_and(ControlPointController::is_dragging)
        {
            return;
        }

        let target = self
            .store
            .shape_at(position, &self.surface, self.settings.interaction.line_hit_tolerance_px)
            .filter(|id| !self.selection.is_selected(*id));

        if self.hover.as_ref().map(ControlPointController::shape_id) == target {
            return;
        }
        self.clear_hover();

        if let Some(shape) = target.and_then(|id| self.store.get(id)) {
            self.hover = Some(ControlPointController::attach_temporary(
                shape,
                &mut self.surface,
                &self.settings,
            ));
        }
    }

    /// The pointer left the map.
    pub fn on_pointer_leave(&mut self) {
        self.clear_hover();
    }

    /// A click on the map background clears the selection.
    pub fn on_map_click(&mut self, position: LatLng) {
        if self.mode != DrawingMode::Select
            || self.controller.as_ref().is_some_and(ControlPointController::is_dragging)
        {
            return;
        }
        let hit = self
            .store
            .shape_at(position, &self.surface, self.settings.interaction.line_hit_tolerance_px);
        if hit.is_none() {
            self.deselect();
        }
    }

    /// Zooming invalidates pixel-space handle math, so every handle goes.
    pub fn on_zoom_start(&mut self) {
        self.cancel_drag();
        self.clear_hover();
        self.deselect();
    }

    /// Ends the active drag without the final recompute.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(controller) = self.controller.as_mut() else {
            return false;
        };
        match self.store.get(controller.shape_id()) {
            Some(shape) => controller.cancel(shape, &mut self.surface),
            None => false,
        }
    }

    /// Applies a direct edit (from a property panel, say) to one shape.
    ///
    /// Handles of a selected shape follow the new geometry. An elevation
    /// line left with an outdated profile gets a request queued.
    pub fn edit_shape<R, F>(&mut self, id: ShapeId, f: F) -> fieldplan_core::Result<R>
    where
        F: FnOnce(&mut Shape, &dyn Projection) -> Result<R, GeometryError>,
    {
        let shape = self
            .store
            .get_mut(id)
            .ok_or(InteractionError::ShapeNotFound(id))?;
        let generation = shape.elevation_line_mut().map(|l| l.generation());
        let value = f(shape, &self.surface)?;

        let outdated = shape
            .elevation_line_mut()
            .is_some_and(|l| Some(l.generation()) != generation && l.is_profile_outdated());
        if outdated {
            self.queue_profile_refresh(id);
        }

        if let Some(controller) = self.controller.as_mut().filter(|c| c.shape_id() == id) {
            if let Some(shape) = self.store.get(id) {
                controller.sync_handles(shape, &mut self.surface);
            }
        }
        Ok(value)
    }

    /// Snapshots the sample points of an elevation line.
    ///
    /// Every new request supersedes the ones still in flight.
    pub fn begin_profile_refresh(&mut self, id: ShapeId) -> fieldplan_core::Result<ProfileRequest> {
        let shape = self
            .store
            .get_mut(id)
            .ok_or(InteractionError::ShapeNotFound(id))?;
        let kind = shape.kind();
        let line = shape
            .elevation_line_mut()
            .ok_or(GeometryError::UnsupportedOperation {
                kind,
                operation: "elevation_profile",
            })?;
        Ok(line.begin_profile_request(id, &self.sampler))
    }

    /// Requests queued by edits since the last call, oldest first.
    pub fn take_pending_profile_requests(&mut self) -> Vec<ProfileRequest> {
        std::mem::take(&mut self.pending_profiles)
    }

    pub fn pending_profile_requests(&self) -> &[ProfileRequest] {
        &self.pending_profiles
    }

    /// Fetches and applies every queued request. Returns how many applied.
    pub async fn resolve_pending_profiles(&mut self, service: &dyn ElevationService) -> usize {
        let mut applied = 0;
        for request in self.take_pending_profile_requests() {
            let result = self.sampler.fetch_profile(&request, service).await;
            if self.complete_profile_refresh(result) {
                applied += 1;
            }
        }
        applied
    }

    /// Applies a resolved profile. Stale or orphaned results are dropped.
    pub fn complete_profile_refresh(&mut self, result: ProfileResult) -> bool {
        let id = result.shape_id;
        let data_source = result.data_source;
        let sample_count = result.samples.len();

        let Some(shape) = self.store.get_mut(id) else {
            debug!("Dropping elevation profile for removed {}", id);
            return false;
        };
        let Some(line) = shape.elevation_line_mut() else {
            return false;
        };
        if !line.apply_profile(result) {
            return false;
        }
        shape.update_properties(&self.surface);

        self.publish(PlanEvent::ElevationProfileUpdated {
            shape_id: id,
            data_source,
            sample_count,
        });
        true
    }

    /// Fetches and applies a fresh profile for an elevation line.
    ///
    /// Service failures never surface here; they end in a simulated profile.
    pub async fn refresh_elevation_profile(
        &mut self,
        id: ShapeId,
        service: &dyn ElevationService,
    ) -> fieldplan_core::Result<bool> {
        let request = self.begin_profile_refresh(id)?;
        let result = self.sampler.fetch_profile(&request, service).await;
        Ok(self.complete_profile_refresh(result))
    }

    /// Appends the plan's shapes. Every record is validated before the
    /// first shape is added.
    pub fn import_plan(&mut self, plan: &PlanFile) -> anyhow::Result<Vec<ShapeId>> {
        let parts = plan.to_geometries()?;
        let ids = parts
            .into_iter()
            .map(|(geometry, style)| self.add_shape(geometry, style))
            .collect();
        Ok(ids)
    }

    pub fn export_plan(&self, name: impl Into<String>) -> PlanFile {
        PlanFile::from_shapes(name, self.store.iter())
    }

    /// Shapes of one variant, in draw order.
    pub fn shapes_of_kind(&self, kind: ShapeKind) -> impl Iterator<Item = &Shape> {
        self.store.iter().filter(move |s| s.kind() == kind)
    }

    fn try_pointer_down(&mut self, event: PointerEvent) -> Result<bool, InteractionError> {
        self.ensure_attached()?;
        let tolerance = self.settings.interaction.line_hit_tolerance_px;

        match self.mode {
            DrawingMode::Delete => match self.store.shape_at(event.position, &self.surface, tolerance) {
                Some(id) => {
                    self.remove_shape(id);
                    Ok(true)
                }
                None => Ok(false),
            },
            DrawingMode::Select => {
                if let Some(controller) = self.controller.as_mut() {
                    let id = controller.shape_id();
                    let shape = self.store.get(id).ok_or(InteractionError::ShapeNotFound(id))?;
                    if controller.pointer_down(shape, event, &mut self.surface) {
                        return Ok(true);
                    }
                }
                match self.store.shape_at(event.position, &self.surface, tolerance) {
                    Some(id) => {
                        self.select(id)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            // Drawing tools hand the gesture to the surface
            _ => Ok(false),
        }
    }

    fn try_pointer_move(&mut self, event: PointerEvent) -> Result<(), InteractionError> {
        let Some(id) = self
            .controller
            .as_ref()
            .filter(|c| c.is_dragging())
            .map(ControlPointController::shape_id)
        else {
            return Ok(());
        };
        self.ensure_attached()?;

        let shape = self
            .store
            .get_mut(id)
            .ok_or(InteractionError::ShapeNotFound(id))?;
        if let Some(controller) = self.controller.as_mut() {
            controller.pointer_move(shape, event, &mut self.surface);
        }
        Ok(())
    }

    fn try_pointer_up(&mut self) -> Result<DragOutcome, InteractionError> {
        let Some(controller) = self.controller.as_mut() else {
            return Ok(DragOutcome::Ignored);
        };
        if !controller.is_dragging() {
            return Ok(DragOutcome::Ignored);
        }
        let id = controller.shape_id();
        let shape = self
            .store
            .get_mut(id)
            .ok_or(InteractionError::ShapeNotFound(id))?;
        Ok(controller.pointer_up(shape, &mut self.surface))
    }

    /// Replaces any queued request for `id` with a fresh one.
    fn queue_profile_refresh(&mut self, id: ShapeId) {
        match self.begin_profile_refresh(id) {
            Ok(request) => {
                debug!(
                    "Queued {} elevation samples for {} (generation {})",
                    request.sample_count(),
                    id,
                    request.generation
                );
                self.pending_profiles.retain(|r| r.shape_id != id);
                self.pending_profiles.push(request);
            }
            Err(e) => warn!("Cannot queue elevation profile for {}: {}", id, e),
        }
    }

    fn ensure_attached(&self) -> Result<(), InteractionError> {
        if self.surface.is_attached() {
            Ok(())
        } else {
            Err(InteractionError::Detached)
        }
    }

    /// Drops controls whose shape vanished from under them.
    fn discard_orphaned_controls(&mut self) {
        let orphaned = self
            .controller
            .as_ref()
            .is_some_and(|c| !self.store.contains(c.shape_id()));
        if orphaned {
            self.deselect();
        }
    }

    fn release_controls(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.teardown(&mut self.surface);
        }
    }

    fn clear_hover(&mut self) {
        if let Some(mut hover) = self.hover.take() {
            hover.teardown(&mut self.surface);
        }
    }

    fn publish(&self, event: PlanEvent) {
        // No listener is a normal state for a headless editor
        self.bus.publish(event).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Circle;
    use crate::surface::HeadlessSurface;
    use fieldplan_core::EventBusConfig;

    fn editor() -> MapEditor<HeadlessSurface> {
        let surface = HeadlessSurface::centered(LatLng::new(45.0, 5.0), 17.0);
        MapEditor::new(surface, EditorSettings::default(), Arc::new(EventBus::new()))
    }

    fn circle_at(editor: &mut MapEditor<HeadlessSurface>, lat: f64, lng: f64) -> ShapeId {
        let circle = Circle::new(LatLng::new(lat, lng), 20.0).unwrap();
        editor.add_shape(ShapeGeometry::Circle(circle), ShapeStyle::default())
    }

    #[test]
    fn test_select_attaches_controls() {
        let mut editor = editor();
        let id = circle_at(&mut editor, 45.0, 5.0);
        editor.select(id).unwrap();

        assert_eq!(editor.selected_id(), Some(id));
        assert_eq!(editor.surface().marker_count(), 9);
    }

    #[test]
    fn test_select_missing_shape() {
        let mut editor = editor();
        assert_eq!(
            editor.select(ShapeId(42)),
            Err(InteractionError::ShapeNotFound(ShapeId(42)))
        );
    }

    #[test]
    fn test_detached_surface_ignores_pointer() {
        let mut editor = editor();
        let id = circle_at(&mut editor, 45.0, 5.0);
        editor.surface_mut().set_attached(false);

        let handled = editor.on_pointer_down(PointerEvent::at_ms(LatLng::new(45.0, 5.0), 0));
        assert!(!handled);
        assert_eq!(editor.selected_id(), None);
        assert!(editor.shape(id).is_some());
    }

    #[test]
    fn test_delete_mode_removes_shape() {
        let mut editor = editor();
        let id = circle_at(&mut editor, 45.0, 5.0);
        editor.select(id).unwrap();
        editor.set_mode(DrawingMode::Delete);

        assert!(editor.on_pointer_down(PointerEvent::at_ms(LatLng::new(45.0, 5.0), 0)));
        assert!(editor.store().is_empty());
        assert_eq!(editor.surface().marker_count(), 0);
    }

    #[test]
    fn test_set_mode_publishes_tool_change() {
        let bus = Arc::new(EventBus::with_config(EventBusConfig {
            enable_history: true,
            ..Default::default()
        }));
        let surface = HeadlessSurface::centered(LatLng::new(45.0, 5.0), 17.0);
        let mut editor = MapEditor::new(surface, EditorSettings::default(), bus);
        editor.set_mode(DrawingMode::Polygon);
        let history = editor.event_bus().history(None);
        assert!(history
            .iter()
            .any(|e| matches!(e, PlanEvent::ToolChanged { tool } if tool == "polygon")));
    }

    #[test]
    fn test_hover_shows_temporary_handles() {
        let mut editor = editor();
        let id = circle_at(&mut editor, 45.0, 5.0);
        editor.on_pointer_hover(LatLng::new(45.0, 5.0));

        let hover = editor.hover().unwrap();
        assert_eq!(hover.shape_id(), id);
        assert!(hover.is_temporary());

        editor.on_pointer_leave();
        assert!(editor.hover().is_none());
        assert_eq!(editor.surface().marker_count(), 0);
    }

    #[test]
    fn test_map_click_on_background_deselects() {
        let mut editor = editor();
        let id = circle_at(&mut editor, 45.0, 5.0);
        editor.select(id).unwrap();

        editor.on_map_click(LatLng::new(45.0, 5.0));
        assert_eq!(editor.selected_id(), Some(id));

        editor.on_map_click(LatLng::new(45.001, 5.001));
        assert_eq!(editor.selected_id(), None);
        assert_eq!(editor.surface().marker_count(), 0);
    }
}
