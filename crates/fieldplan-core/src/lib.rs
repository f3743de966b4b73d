//! # FieldPlan Core
//!
//! Core types and utilities shared by the FieldPlan crates.
//! Provides the geographic value types, the geometry math used by every
//! shape variant, the error taxonomy, and the shape-change event bus.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod geo;
pub mod units;

pub use data::{
    ArcProperties, CircleProperties, DataSource, ElevationStats, ElevationProperties, LatLng,
    PixelPoint, PolygonProperties, PolylineProperties, Property, PropertyValue,
    RectangleProperties, ShapeId, ShapeKind, ShapeProperties, TextRegionProperties,
};

pub use error::{ElevationError, Error, GeometryError, InteractionError, Result};

pub use event_bus::{
    EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter, PlanEvent,
    SubscriptionId,
};
