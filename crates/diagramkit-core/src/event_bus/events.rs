//! Event type definitions for the event bus.
//!
//! Events are grouped by category and are cloneable and serializable so a
//! host can log or replay them.

use serde::{Deserialize, Serialize};

use crate::types::{ElementId, ElementKind};

/// Root event enum for all editor events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Element lifecycle and property changes
    Element(ElementEvent),
    /// Registry selection changes
    Selection(SelectionEvent),
    /// Edit-mode and node-level changes
    Editing(EditingEvent),
    /// Rejections and resource failures worth showing to the user
    Diagnostic(DiagnosticEvent),
}

impl EditorEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::Element(_) => EventCategory::Element,
            EditorEvent::Selection(_) => EventCategory::Selection,
            EditorEvent::Editing(_) => EventCategory::Editing,
            EditorEvent::Diagnostic(_) => EventCategory::Diagnostic,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            EditorEvent::Element(e) => e.description(),
            EditorEvent::Selection(e) => e.description(),
            EditorEvent::Editing(e) => e.description(),
            EditorEvent::Diagnostic(e) => e.description(),
        }
    }

    /// The element the event is about, if any
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            EditorEvent::Element(e) => Some(e.id()),
            EditorEvent::Selection(SelectionEvent::Changed { primary, .. }) => *primary,
            EditorEvent::Editing(e) => Some(e.id()),
            EditorEvent::Diagnostic(DiagnosticEvent::Rejected { id, .. }) => *id,
            EditorEvent::Diagnostic(DiagnosticEvent::ImageLoadFailed { id, .. }) => Some(*id),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Element lifecycle events.
    Element,
    /// Selection events.
    Selection,
    /// Edit-mode events.
    Editing,
    /// Diagnostic events.
    Diagnostic,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Element => write!(f, "Element"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Editing => write!(f, "Editing"),
            EventCategory::Diagnostic => write!(f, "Diagnostic"),
        }
    }
}

/// Element lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementEvent {
    /// Element registered with the session.
    Added {
        /// The new element.
        id: ElementId,
        /// Its kind.
        kind: ElementKind,
    },
    /// Properties or geometry changed.
    Updated {
        /// The changed element.
        id: ElementId,
    },
    /// Element destroyed; the session drops it when it sees this.
    Deleted {
        /// The destroyed element.
        id: ElementId,
    },
    /// An image finished decoding and its body is on the scene.
    Loaded {
        /// The image element.
        id: ElementId,
    },
}

impl ElementEvent {
    pub fn id(&self) -> ElementId {
        match self {
            ElementEvent::Added { id, .. }
            | ElementEvent::Updated { id }
            | ElementEvent::Deleted { id }
            | ElementEvent::Loaded { id } => *id,
        }
    }

    fn description(&self) -> String {
        match self {
            ElementEvent::Added { id, kind } => format!("Added {} {}", kind, id),
            ElementEvent::Updated { id } => format!("Updated {}", id),
            ElementEvent::Deleted { id } => format!("Deleted {}", id),
            ElementEvent::Loaded { id } => format!("Loaded {}", id),
        }
    }
}

/// Selection events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The selection set changed.
    Changed {
        /// Primary selection, defined only when exactly one element is selected.
        primary: Option<ElementId>,
        /// Every selected element.
        selected: Vec<ElementId>,
    },
}

impl SelectionEvent {
    fn description(&self) -> String {
        match self {
            SelectionEvent::Changed { primary, selected } => match primary {
                Some(id) => format!("Selected {}", id),
                None if selected.is_empty() => "Selection cleared".to_string(),
                None => format!("Selected {} elements", selected.len()),
            },
        }
    }
}

/// Edit-mode events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditingEvent {
    /// Element entered or left edit mode.
    ModeChanged {
        /// The element.
        id: ElementId,
        /// Whether edit mode is now on.
        enabled: bool,
    },
    /// The selected node changed.
    NodeSelected {
        /// The element.
        id: ElementId,
        /// Selected node index, if any.
        index: Option<usize>,
    },
    /// A node was inserted or removed.
    NodesChanged {
        /// The element.
        id: ElementId,
        /// Node count after the change.
        count: usize,
    },
}

impl EditingEvent {
    pub fn id(&self) -> ElementId {
        match self {
            EditingEvent::ModeChanged { id, .. }
            | EditingEvent::NodeSelected { id, .. }
            | EditingEvent::NodesChanged { id, .. } => *id,
        }
    }

    fn description(&self) -> String {
        match self {
            EditingEvent::ModeChanged { id, enabled } => format!(
                "{} {} edit mode",
                id,
                if *enabled { "entered" } else { "left" }
            ),
            EditingEvent::NodeSelected { id, index } => match index {
                Some(index) => format!("{} node {} selected", id, index),
                None => format!("{} node selection cleared", id),
            },
            EditingEvent::NodesChanged { id, count } => format!("{} now has {} nodes", id, count),
        }
    }
}

/// Diagnostic events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagnosticEvent {
    /// An operation was rejected by an invariant guard.
    Rejected {
        /// The element involved, if any.
        id: Option<ElementId>,
        /// Human readable reason.
        reason: String,
    },
    /// An image could not be loaded.
    ImageLoadFailed {
        /// The image element.
        id: ElementId,
        /// The source reference.
        src: String,
        /// Human readable reason.
        reason: String,
    },
}

impl DiagnosticEvent {
    fn description(&self) -> String {
        match self {
            DiagnosticEvent::Rejected { reason, .. } => format!("Rejected: {}", reason),
            DiagnosticEvent::ImageLoadFailed { src, reason, .. } => {
                format!("Image '{}' failed: {}", src, reason)
            }
        }
    }
}
