//! # Event Bus Module
//!
//! Publish/subscribe channel between elements, the editor session and the
//! host UI. Elements publish a notification after every mutating operation
//! so that views subscribe once instead of re-reading element state on a
//! timer.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Supports both sync handlers and async receivers
//!
//! There is no process-wide instance: each editor session owns its bus and
//! hands it to the elements it creates.
//!
//! ## Usage
//!
//! ```rust
//! use diagramkit_core::event_bus::{EditorEvent, ElementEvent, EventBus, EventCategory, EventFilter};
//! use diagramkit_core::ElementId;
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Element]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.publish(EditorEvent::Element(ElementEvent::Updated { id: ElementId::new() }))
//!     .ok();
//!
//! assert!(bus.unsubscribe(subscription));
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
