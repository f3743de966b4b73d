//! In-memory interaction surface.
//!
//! Keeps markers and tooltips in maps instead of drawing them. Used for
//! server-side plan processing and as the surface in tests, where the live
//! overlay counts expose leaked handles.

use std::collections::BTreeMap;

use fieldplan_core::{LatLng, PixelPoint};

use super::{InteractionSurface, MarkerId, MarkerStyle, TooltipId};
use crate::projection::{Projection, WebMercatorProjection};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub position: LatLng,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipState {
    pub anchor: LatLng,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    projection: WebMercatorProjection,
    attached: bool,
    panning_enabled: bool,
    next_id: u64,
    markers: BTreeMap<MarkerId, MarkerState>,
    tooltips: BTreeMap<TooltipId, TooltipState>,
    marker_moves: usize,
}

impl HeadlessSurface {
    pub fn new(projection: WebMercatorProjection) -> Self {
        Self {
            projection,
            attached: true,
            panning_enabled: true,
            next_id: 1,
            markers: BTreeMap::new(),
            tooltips: BTreeMap::new(),
            marker_moves: 0,
        }
    }

    /// An 800x600 view centered on `center`.
    pub fn centered(center: LatLng, zoom: f64) -> Self {
        Self::new(WebMercatorProjection::new(center, zoom, 800.0, 600.0))
    }

    pub fn projection(&self) -> &WebMercatorProjection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut WebMercatorProjection {
        &mut self.projection
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn panning_enabled(&self) -> bool {
        self.panning_enabled
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn tooltip_count(&self) -> usize {
        self.tooltips.len()
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerState> {
        self.markers.get(&id)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerId, &MarkerState)> {
        self.markers.iter()
    }

    pub fn tooltips(&self) -> impl Iterator<Item = (&TooltipId, &TooltipState)> {
        self.tooltips.iter()
    }

    /// Total `move_marker` calls since creation.
    pub fn marker_moves(&self) -> usize {
        self.marker_moves
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Projection for HeadlessSurface {
    fn lat_lng_to_container_point(&self, position: LatLng) -> PixelPoint {
        self.projection.lat_lng_to_container_point(position)
    }

    fn container_point_to_lat_lng(&self, point: PixelPoint) -> LatLng {
        self.projection.container_point_to_lat_lng(point)
    }

    fn zoom(&self) -> f64 {
        self.projection.zoom()
    }
}

impl InteractionSurface for HeadlessSurface {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn set_panning_enabled(&mut self, enabled: bool) {
        self.panning_enabled = enabled;
    }

    fn add_marker(&mut self, position: LatLng, style: &MarkerStyle) -> MarkerId {
        let id = MarkerId(self.allocate());
        self.markers.insert(
            id,
            MarkerState {
                position,
                style: style.clone(),
            },
        );
        id
    }

    fn move_marker(&mut self, id: MarkerId, position: LatLng) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.position = position;
            self.marker_moves += 1;
        }
    }

    fn set_marker_opacity(&mut self, id: MarkerId, opacity: f64) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.style.opacity = opacity;
            marker.style.fill_opacity = opacity;
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.markers.remove(&id).is_none() {
            tracing::warn!("Removing unknown marker {:?}", id);
        }
    }

    fn open_tooltip(&mut self, anchor: LatLng, text: &str) -> TooltipId {
        let id = TooltipId(self.allocate());
        self.tooltips.insert(
            id,
            TooltipState {
                anchor,
                text: text.to_string(),
            },
        );
        id
    }

    fn update_tooltip(&mut self, id: TooltipId, anchor: LatLng, text: &str) {
        if let Some(tooltip) = self.tooltips.get_mut(&id) {
            tooltip.anchor = anchor;
            tooltip.text = text.to_string();
        }
    }

    fn close_tooltip(&mut self, id: TooltipId) {
        if self.tooltips.remove(&id).is_none() {
            tracing::warn!("Closing unknown tooltip {:?}", id);
        }
    }
}
