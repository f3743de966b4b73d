//! Change notifications from the editing engine.
//!
//! Whatever displays plan data (property panel, plan list, status bar)
//! listens here. Shapes publish `ShapeUpdated` only from their property
//! recompute, so geometry-only mutations during a drag stay silent.
//!
//! ```rust,ignore
//! use fieldplan_core::event_bus::{EventBus, EventCategory, EventFilter, PlanEvent};
//!
//! let bus = EventBus::new();
//! let id = bus.subscribe(EventFilter::Categories(vec![EventCategory::Shape]), |event| {
//!     if let PlanEvent::ShapeUpdated { shape_id, properties } = event {
//!         println!("{} now covers {:?} m²", shape_id, properties.area());
//!     }
//! });
//! bus.unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::{EventBus, EventBusConfig, EventBusError, EventFilter, SubscriptionId};
pub use events::{EventCategory, PlanEvent};
