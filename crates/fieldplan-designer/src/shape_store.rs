use std::collections::BTreeMap;

use fieldplan_core::{LatLng, ShapeId};

use crate::model::Shape;
use crate::projection::Projection;

/// Owns every shape on the plan and their draw order.
#[derive(Debug, Default)]
pub struct ShapeStore {
    shapes: BTreeMap<ShapeId, Shape>,
    draw_order: Vec<ShapeId>,
    next_id: u64,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self {
            shapes: BTreeMap::new(),
            draw_order: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserves a fresh id. Ids are never reused.
    pub fn allocate_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Inserts a shape on top of the draw order.
    pub fn insert(&mut self, shape: Shape) {
        let id = shape.id();
        self.next_id = self.next_id.max(id.0 + 1);
        if self.shapes.insert(id, shape).is_none() {
            self.draw_order.push(id);
        }
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        self.draw_order.retain(|&other| other != id);
        Some(shape)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shapes bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.draw_order.iter().filter_map(|id| self.shapes.get(id))
    }

    pub fn draw_order(&self) -> &[ShapeId] {
        &self.draw_order
    }

    /// Topmost shape under `point`.
    pub fn shape_at(&self, point: LatLng, projection: &dyn Projection, tolerance_px: f64) -> Option<ShapeId> {
        self.draw_order
            .iter()
            .rev()
            .copied()
            .find(|id| {
                self.shapes
                    .get(id)
                    .is_some_and(|s| s.contains(point, projection, tolerance_px))
            })
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.draw_order.clear();
    }
}
