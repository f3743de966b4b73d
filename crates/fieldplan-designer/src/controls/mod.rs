//! Control points.
//!
//! Each selected shape gets one [`ControlPointController`] owning its
//! handles. Handle roles and positions live in [`handles`], measurement
//! tooltip text in [`labels`].

pub mod controller;
pub mod handles;
pub mod labels;
pub mod throttle;

pub use controller::{ControlPointController, DragOutcome, DragState, Grab, Handle};
pub use handles::{dependents, handle_position, roles_for, suppressed_during, HandleRole};
pub use labels::measurement_label;
pub use throttle::Throttle;
