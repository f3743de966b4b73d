use fieldplan_core::ShapeId;

/// Tracks the single selected shape.
///
/// Selection is exclusive: selecting a shape replaces whatever was selected
/// before. The editor tears down the old shape's control points before it
/// records the new selection here.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected_id: Option<ShapeId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self { selected_id: None }
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.selected_id
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected_id == Some(id)
    }

    /// Replaces the selection and returns the previous one.
    pub fn select(&mut self, id: ShapeId) -> Option<ShapeId> {
        self.selected_id.replace(id)
    }

    pub fn clear(&mut self) -> Option<ShapeId> {
        self.selected_id.take()
    }
}
