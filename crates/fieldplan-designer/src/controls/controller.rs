//! Drag state machine for one shape's control points.

use smallvec::SmallVec;
use tracing::{debug, warn};

use fieldplan_core::geo;
use fieldplan_core::{GeometryError, LatLng, ShapeId, ShapeKind};
use fieldplan_settings::{ArcSettings, EditorSettings, InteractionSettings};

use super::handles::{dependents, handle_position, roles_for, suppressed_during, HandleRole};
use super::labels::measurement_label;
use super::throttle::Throttle;
use crate::model::{Shape, ShapeGeometry};
use crate::projection::Projection;
use crate::surface::{InteractionSurface, MarkerId, MarkerStyle, PointerEvent, TooltipId};

/// A live control point on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub role: HandleRole,
    pub marker: MarkerId,
    pub position: LatLng,
}

/// Where the pointer caught a handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    /// Pointer position at pointer-down.
    pub origin: LatLng,
    /// Handle minus pointer, as east and north meters.
    pub offset_m: (f64, f64),
}

impl Grab {
    fn new(origin: LatLng, handle: LatLng) -> Self {
        Self {
            origin,
            offset_m: geo::to_local_meters(origin, handle),
        }
    }

    /// Handle position that keeps the grab offset to `pointer`.
    pub fn target(&self, pointer: LatLng) -> LatLng {
        let (east, north) = self.offset_m;
        geo::from_local_meters(pointer, east, north)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer went down on a handle; no move seen yet.
    Armed { role: HandleRole, grab: Grab },
    Dragging { role: HandleRole, grab: Grab },
}

impl DragState {
    fn role(&self) -> Option<HandleRole> {
        match self {
            DragState::Idle => None,
            DragState::Armed { role, .. } | DragState::Dragging { role, .. } => Some(*role),
        }
    }

    fn grab(&self) -> Option<Grab> {
        match self {
            DragState::Idle => None,
            DragState::Armed { grab, .. } | DragState::Dragging { grab, .. } => Some(*grab),
        }
    }
}

/// What a pointer-up did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// No drag was in progress.
    Ignored,
    Finished {
        geometry_changed: bool,
        /// The shape is an elevation line whose profile must be refetched.
        refresh_profile: bool,
    },
}

/// Owns the handles of exactly one shape.
///
/// Created on selection (or hover, as a temporary set without drag wiring)
/// and torn down explicitly with [`ControlPointController::teardown`].
#[derive(Debug)]
pub struct ControlPointController {
    shape_id: ShapeId,
    temporary: bool,
    handles: Vec<Handle>,
    state: DragState,
    tooltip: Option<TooltipId>,
    hidden: SmallVec<[HandleRole; 2]>,
    pending: Option<LatLng>,
    /// Geometry at pointer-down.
    reference: Option<ShapeGeometry>,
    frame_throttle: Throttle,
    tooltip_throttle: Throttle,
    interaction: InteractionSettings,
    arc: ArcSettings,
}

impl ControlPointController {
    /// Creates the full, draggable handle set for `shape`.
    pub fn attach<S: InteractionSurface>(shape: &Shape, surface: &mut S, settings: &EditorSettings) -> Self {
        Self::create(shape, surface, settings, false)
    }

    /// Creates a lighter hover-only handle set.
    pub fn attach_temporary<S: InteractionSurface>(shape: &Shape, surface: &mut S, settings: &EditorSettings) -> Self {
        Self::create(shape, surface, settings, true)
    }

    fn create<S: InteractionSurface>(shape: &Shape, surface: &mut S, settings: &EditorSettings, temporary: bool) -> Self {
        let mut controller = Self {
            shape_id: shape.id(),
            temporary,
            handles: Vec::new(),
            state: DragState::Idle,
            tooltip: None,
            hidden: SmallVec::new(),
            pending: None,
            reference: None,
            frame_throttle: Throttle::new(settings.interaction.drag_frame_interval()),
            tooltip_throttle: Throttle::new(settings.interaction.tooltip_interval()),
            interaction: settings.interaction.clone(),
            arc: settings.arc.clone(),
        };
        controller.spawn_handles(shape, surface);
        debug!(
            "Attached {} {} handles to {}",
            controller.handles.len(),
            if temporary { "temporary" } else { "active" },
            shape.id()
        );
        controller
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn active_role(&self) -> Option<HandleRole> {
        self.state.role()
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    /// Geometry the shape had when the active drag started.
    pub fn reference_geometry(&self) -> Option<&ShapeGeometry> {
        self.reference.as_ref()
    }

    pub fn handle(&self, role: HandleRole) -> Option<&Handle> {
        self.handles.iter().find(|h| h.role == role)
    }

    /// Nearest visible handle within the hit tolerance.
    pub fn hit_test(&self, point: LatLng, projection: &dyn Projection) -> Option<HandleRole> {
        let target = projection.lat_lng_to_container_point(point);
        self.handles
            .iter()
            .filter(|h| !self.hidden.contains(&h.role))
            .map(|h| {
                let p = projection.lat_lng_to_container_point(h.position);
                (h.role, p.distance_to(&target))
            })
            .filter(|(_, d)| *d <= self.interaction.handle_hit_tolerance_px)
            // Ties go to the handle drawn above the center marker
            .min_by(|a, b| {
                a.1.total_cmp(&b.1)
                    .then_with(|| (a.0 == HandleRole::Center).cmp(&(b.0 == HandleRole::Center)))
            })
            .map(|(role, _)| role)
    }

    /// Arms a drag when the pointer lands on a handle.
    pub fn pointer_down<S: InteractionSurface>(&mut self, shape: &Shape, event: PointerEvent, surface: &mut S) -> bool {
        if self.temporary || self.is_dragging() {
            return false;
        }
        let Some(role) = self.hit_test(event.position, &*surface) else {
            return false;
        };
        let Some(anchor) = self.handle(role).map(|h| h.position) else {
            return false;
        };

        surface.set_panning_enabled(false);
        self.state = DragState::Armed {
            role,
            grab: Grab::new(event.position, anchor),
        };
        self.pending = None;
        self.reference = Some(shape.geometry().clone());
        self.frame_throttle.reset();
        self.tooltip_throttle.reset();
        self.hide_siblings(shape.geometry(), role, surface);

        if let Some(text) = measurement_label(shape.geometry(), role) {
            self.tooltip = Some(surface.open_tooltip(anchor, &text));
        }

        debug!("Drag armed on {} of {}", role, shape.id());
        true
    }

    /// Applies one drag tick, throttled to the frame interval.
    ///
    /// The handle follows the pointer at the offset it was grabbed with.
    /// Only geometry changes here; the property cache stays stale until
    /// pointer-up.
    pub fn pointer_move<S: InteractionSurface>(&mut self, shape: &mut Shape, event: PointerEvent, surface: &mut S) {
        let (role, grab) = match self.state {
            DragState::Idle => return,
            DragState::Armed { role, grab } | DragState::Dragging { role, grab } => (role, grab),
        };
        self.state = DragState::Dragging { role, grab };

        if !self.frame_throttle.ready(event.timestamp) {
            self.pending = Some(event.position);
            return;
        }
        self.pending = None;
        self.apply_drag(shape, event.position, surface);

        if self.tooltip_throttle.ready(event.timestamp) {
            self.refresh_tooltip(shape, surface);
        }
    }

    /// Finishes the drag: one full recompute, then a fresh handle set.
    pub fn pointer_up<S: InteractionSurface>(&mut self, shape: &mut Shape, surface: &mut S) -> DragOutcome {
        let Some(role) = self.state.role() else {
            return DragOutcome::Ignored;
        };

        if let Some(point) = self.pending.take() {
            self.apply_drag(shape, point, surface);
        }

        surface.set_panning_enabled(true);
        self.close_tooltip(surface);

        if shape.is_stale() {
            shape.update_properties(&*surface);
        }

        // Topology may have changed, so rebuild rather than patch
        self.hidden.clear();
        self.remove_handles(surface);
        self.spawn_handles(shape, surface);
        self.state = DragState::Idle;

        let geometry_changed = self
            .reference
            .take()
            .is_some_and(|start| &start != shape.geometry());
        debug!("Drag on {} of {} finished", role, shape.id());
        DragOutcome::Finished {
            geometry_changed,
            refresh_profile: geometry_changed && shape.kind() == ShapeKind::ElevationPolyline,
        }
    }

    /// Ends a drag without the final recompute.
    ///
    /// Panning comes back, hidden handles reappear at their current
    /// positions, and the geometry keeps its last applied state.
    pub fn cancel<S: InteractionSurface>(&mut self, shape: &Shape, surface: &mut S) -> bool {
        if !self.is_dragging() {
            return false;
        }
        surface.set_panning_enabled(true);
        self.close_tooltip(surface);
        self.pending = None;
        self.reference = None;
        self.state = DragState::Idle;

        for role in std::mem::take(&mut self.hidden) {
            if let Some(h) = self.handle(role) {
                surface.set_marker_opacity(h.marker, 1.0);
            }
        }
        self.sync_handles(shape, surface);
        debug!("Drag on {} cancelled", shape.id());
        true
    }

    /// Repositions every handle from the current geometry.
    pub fn sync_handles<S: InteractionSurface>(&mut self, shape: &Shape, surface: &mut S) {
        if roles_for(shape.geometry()).len() != self.handles.len() {
            self.remove_handles(surface);
            self.spawn_handles(shape, surface);
            return;
        }
        let roles: Vec<HandleRole> = self.handles.iter().map(|h| h.role).collect();
        self.move_handles(shape.geometry(), &roles, surface);
    }

    /// Removes every marker and tooltip this controller created.
    pub fn teardown<S: InteractionSurface>(&mut self, surface: &mut S) {
        if self.is_dragging() {
            surface.set_panning_enabled(true);
            self.state = DragState::Idle;
        }
        self.close_tooltip(surface);
        self.remove_handles(surface);
        self.hidden.clear();
        self.pending = None;
        self.reference = None;
        debug!("Detached handles from {}", self.shape_id);
    }

    /// Moves the active handle to `pointer` plus the grab offset.
    fn apply_drag<S: InteractionSurface>(&mut self, shape: &mut Shape, pointer: LatLng, surface: &mut S) {
        let (Some(role), Some(grab)) = (self.state.role(), self.state.grab()) else {
            return;
        };
        let point = grab.target(pointer);

        let result = match role {
            HandleRole::Center => shape.move_to(point, false, &*surface),
            HandleRole::Radius(_) | HandleRole::ArcRadius => {
                shape.resize_from_control_point(point, false, &*surface)
            }
            HandleRole::ArcStart | HandleRole::ArcStop => self.drag_arc_end(shape, role, point, &*surface),
            HandleRole::Corner(i) => shape.resize_from_corner(i, point, false, &*surface),
            HandleRole::Side(i) => shape.resize_from_side(i, point, false, &*surface),
            HandleRole::Rotation => shape.rotate_towards(point, false, &*surface),
            HandleRole::Vertex(i) => shape.move_vertex(i, point, false, &*surface),
            HandleRole::SegmentMidpoint(i) => {
                self.split_segment(shape, i, pointer, surface);
                return;
            }
        };

        match result {
            Ok(()) => {
                let deps = dependents(shape.geometry(), role);
                self.move_handles(shape.geometry(), &deps, surface);
            }
            Err(e) => warn!("Ignoring {} drag on {}: {}", role, shape.id(), e),
        }
    }

    fn drag_arc_end(
        &self,
        shape: &mut Shape,
        role: HandleRole,
        point: LatLng,
        projection: &dyn Projection,
    ) -> Result<(), GeometryError> {
        let (start, stop) = match shape.geometry() {
            ShapeGeometry::Arc(a) => (a.start_angle, a.stop_angle),
            other => {
                return Err(GeometryError::UnsupportedOperation {
                    kind: other.kind(),
                    operation: "set_angles",
                })
            }
        };
        let angle = geo::angle_to(shape.center(), point);
        let (start, stop) = if role == HandleRole::ArcStart {
            (angle, stop)
        } else {
            (start, angle)
        };
        shape.set_angles(start, stop, &self.arc, false, projection)
    }

    /// Inserts a vertex at the midpoint of `segment`, then drags that vertex.
    fn split_segment<S: InteractionSurface>(&mut self, shape: &mut Shape, segment: usize, pointer: LatLng, surface: &mut S) {
        let Some(mid) = handle_position(
            shape.geometry(),
            HandleRole::SegmentMidpoint(segment),
            &*surface,
            self.interaction.rotation_handle_offset_px,
        ) else {
            return;
        };

        let index = match shape.insert_vertex(segment, mid, false, &*surface) {
            Ok(index) => index,
            Err(e) => {
                warn!("Cannot insert vertex into {}: {}", shape.id(), e);
                return;
            }
        };

        // The new vertex starts under the midpoint handle; the grab offset still holds
        let Some(grab) = self.state.grab() else {
            return;
        };
        let role = HandleRole::Vertex(index);
        self.state = DragState::Dragging { role, grab };

        self.remove_handles(surface);
        self.hidden.clear();
        self.spawn_handles(shape, surface);
        self.hide_siblings(shape.geometry(), role, surface);
        debug!("Inserted vertex {} into {}, drag retargeted", index, shape.id());

        self.apply_drag(shape, pointer, surface);
    }

    fn move_handles<S: InteractionSurface>(&mut self, geometry: &ShapeGeometry, roles: &[HandleRole], surface: &mut S) {
        let offset = self.interaction.rotation_handle_offset_px;
        for handle in self.handles.iter_mut() {
            if !roles.contains(&handle.role) || self.hidden.contains(&handle.role) {
                continue;
            }
            if let Some(position) = handle_position(geometry, handle.role, &*surface, offset) {
                handle.position = position;
                surface.move_marker(handle.marker, position);
            }
        }
    }

    fn hide_siblings<S: InteractionSurface>(&mut self, geometry: &ShapeGeometry, role: HandleRole, surface: &mut S) {
        for sibling in suppressed_during(geometry, role) {
            if let Some(h) = self.handle(sibling) {
                surface.set_marker_opacity(h.marker, 0.0);
                self.hidden.push(sibling);
            }
        }
    }

    fn refresh_tooltip<S: InteractionSurface>(&self, shape: &Shape, surface: &mut S) {
        let (Some(id), Some(role)) = (self.tooltip, self.state.role()) else {
            return;
        };
        let anchor = self.handle(role).map(|h| h.position);
        if let (Some(text), Some(anchor)) = (measurement_label(shape.geometry(), role), anchor) {
            surface.update_tooltip(id, anchor, &text);
        }
    }

    fn close_tooltip<S: InteractionSurface>(&mut self, surface: &mut S) {
        if let Some(id) = self.tooltip.take() {
            surface.close_tooltip(id);
        }
    }

    fn spawn_handles<S: InteractionSurface>(&mut self, shape: &Shape, surface: &mut S) {
        let offset = self.interaction.rotation_handle_offset_px;
        for role in roles_for(shape.geometry()) {
            let Some(position) = handle_position(shape.geometry(), role, &*surface, offset) else {
                continue;
            };
            let style = if self.temporary {
                MarkerStyle::temporary(role.color())
            } else {
                MarkerStyle::handle(role.color())
            };
            let marker = surface.add_marker(position, &style);
            self.handles.push(Handle { role, marker, position });
        }
    }

    fn remove_handles<S: InteractionSurface>(&mut self, surface: &mut S) {
        for handle in self.handles.drain(..) {
            surface.remove_marker(handle.marker);
        }
    }
}
