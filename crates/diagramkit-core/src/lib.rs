//! # DiagramKit Core
//!
//! Core types shared by every DiagramKit crate: element identifiers and
//! kinds, the error taxonomy of the editing model, and the event bus that
//! carries change notifications from elements to whoever is listening.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{EditError, ElementError, Error, ImageError, Result, SessionError};

pub use event_bus::{
    DiagnosticEvent, EditingEvent, EditorEvent, ElementEvent, EventBus, EventBusConfig,
    EventBusError, EventCategory, EventFilter, SelectionEvent, SequencedEvent, SubscriptionId,
};

pub use types::{ElementId, ElementKind, LineStatus};
