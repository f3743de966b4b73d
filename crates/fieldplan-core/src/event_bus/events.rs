//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so an external panel can mirror
//! them over any transport it likes.

use serde::{Deserialize, Serialize};

use crate::data::{DataSource, ShapeId, ShapeKind, ShapeProperties};

/// Root event enum for plan editing events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanEvent {
    /// A shape's derived properties were recomputed.
    ShapeUpdated {
        /// The shape that changed.
        shape_id: ShapeId,
        /// The freshly computed properties.
        properties: ShapeProperties,
    },
    /// A shape was created from a completed drawing gesture or a loaded plan.
    ShapeCreated {
        /// The new shape.
        shape_id: ShapeId,
        /// Its variant.
        kind: ShapeKind,
    },
    /// A shape was deleted.
    ShapeRemoved {
        /// The deleted shape.
        shape_id: ShapeId,
    },
    /// The selected shape changed.
    SelectionChanged {
        /// Previously selected shape, if any.
        previous: Option<ShapeId>,
        /// Newly selected shape, if any.
        current: Option<ShapeId>,
    },
    /// The active drawing tool changed.
    ToolChanged {
        /// Name of the new tool.
        tool: String,
    },
    /// An elevation profile was resolved for a shape.
    ElevationProfileUpdated {
        /// The elevation polyline.
        shape_id: ShapeId,
        /// Where the samples came from.
        data_source: DataSource,
        /// Number of samples in the profile.
        sample_count: usize,
    },
}

impl PlanEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            PlanEvent::ShapeUpdated { .. }
            | PlanEvent::ShapeCreated { .. }
            | PlanEvent::ShapeRemoved { .. } => EventCategory::Shape,
            PlanEvent::SelectionChanged { .. } => EventCategory::Selection,
            PlanEvent::ToolChanged { .. } => EventCategory::Tool,
            PlanEvent::ElevationProfileUpdated { .. } => EventCategory::Elevation,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            PlanEvent::ShapeUpdated { shape_id, .. } => format!("{} properties updated", shape_id),
            PlanEvent::ShapeCreated { shape_id, kind } => format!("{} created ({})", shape_id, kind),
            PlanEvent::ShapeRemoved { shape_id } => format!("{} removed", shape_id),
            PlanEvent::SelectionChanged { current, .. } => match current {
                Some(id) => format!("{} selected", id),
                None => "Selection cleared".to_string(),
            },
            PlanEvent::ToolChanged { tool } => format!("Tool changed to {}", tool),
            PlanEvent::ElevationProfileUpdated {
                shape_id,
                data_source,
                sample_count,
            } => format!(
                "{} profile updated: {} samples from {}",
                shape_id, sample_count, data_source
            ),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Shape lifecycle and property events.
    Shape,
    /// Selection events.
    Selection,
    /// Drawing tool events.
    Tool,
    /// Elevation profile events.
    Elevation,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Shape => write!(f, "Shape"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Tool => write!(f, "Tool"),
            EventCategory::Elevation => write!(f, "Elevation"),
        }
    }
}
