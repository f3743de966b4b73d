//! Error handling for FieldPlan
//!
//! Error types for each layer of the editor:
//! - Geometry errors (construction and mutation validation)
//! - Elevation errors (remote profile requests)
//! - Interaction errors (pointer events that cannot be routed)
//!
//! Only geometry errors raised at construction time are meant to reach the
//! caller. Interaction errors are logged and dropped at the event boundary,
//! and elevation errors are absorbed by the sampler's fallback.

use thiserror::Error;

use crate::data::{ShapeId, ShapeKind};

/// Geometry validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A coordinate is NaN, infinite, or outside the degree range
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lng: f64,
    },

    /// A vertex-based shape has fewer vertices than its variant allows
    #[error("{kind} requires at least {required} vertices, got {actual}")]
    TooFewVertices {
        /// The shape variant being built.
        kind: ShapeKind,
        /// Minimum vertex count for the variant.
        required: usize,
        /// Vertex count supplied.
        actual: usize,
    },

    /// Radius is zero, negative, or not finite
    #[error("Radius must be positive, got {radius}")]
    NonPositiveRadius {
        /// The rejected radius in meters.
        radius: f64,
    },

    /// Width, height, or another length is zero, negative, or not finite
    #[error("Invalid dimension '{name}': {value}")]
    InvalidDimension {
        /// Name of the dimension.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A vertex index does not address an existing vertex
    #[error("Vertex index {index} out of range for {len} vertices")]
    VertexOutOfRange {
        /// The requested index.
        index: usize,
        /// Current vertex count.
        len: usize,
    },

    /// The variant does not accept new vertices
    #[error("{kind} does not accept vertex insertion")]
    InsertionNotAllowed {
        /// The shape variant that refused.
        kind: ShapeKind,
    },

    /// The operation does not apply to this variant
    #[error("Operation '{operation}' is not supported by {kind}")]
    UnsupportedOperation {
        /// The shape variant.
        kind: ShapeKind,
        /// Name of the operation.
        operation: &'static str,
    },
}

/// Elevation service error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElevationError {
    /// The request itself failed (network, HTTP status, timeout)
    #[error("Elevation request failed: {message}")]
    Request {
        /// A message describing the failure.
        message: String,
    },

    /// The service answered with a different number of points
    #[error("Elevation response has {actual} points, expected {expected}")]
    CountMismatch {
        /// Number of sample points requested.
        expected: usize,
        /// Number of points returned.
        actual: usize,
    },

    /// An elevation value is missing or not finite
    #[error("Invalid elevation at sample {index}")]
    InvalidElevation {
        /// Index of the offending sample.
        index: usize,
    },

    /// A returned point does not match the requested coordinate
    #[error("Elevation sample {index} does not match the requested location")]
    LocationMismatch {
        /// Index of the offending sample.
        index: usize,
    },
}

/// Interaction routing error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InteractionError {
    /// The event targets a shape that no longer exists
    #[error("Shape {0} not found")]
    ShapeNotFound(ShapeId),

    /// The event needs a selected shape and none is selected
    #[error("No shape is selected")]
    NoActiveSelection,

    /// The interaction surface has no map attached
    #[error("Interaction surface is detached")]
    Detached,
}

/// Main error type for FieldPlan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Geometry error
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Elevation error
    #[error("Elevation error: {0}")]
    Elevation(#[from] ElevationError),

    /// Interaction error
    #[error("Interaction error: {0}")]
    Interaction(#[from] InteractionError),
}

/// Result type for FieldPlan operations
pub type Result<T> = std::result::Result<T, Error>;
