//! Error handling for DiagramKit
//!
//! The editing model separates failures by who is responsible for them:
//! - Edit errors: a user operation hit an invariant guard and was rejected
//! - Element errors: the caller broke an element's contract
//! - Image errors: a resource could not be fetched or decoded
//! - Session errors: the registry was asked about something it does not hold
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::types::{ElementId, ElementKind};

/// Rejection of an editing operation by an invariant guard.
///
/// These are expected at runtime and leave the element untouched. Hosts
/// surface them as a non-blocking notification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Node deletion was requested with no node selected
    #[error("No node is selected")]
    NoNodeSelected,

    /// The operation would leave fewer vertices than the kind allows
    #[error("A {kind} needs at least {minimum} points")]
    MinimumPoints {
        /// The element kind whose minimum applies.
        kind: ElementKind,
        /// The minimum vertex count.
        minimum: usize,
    },

    /// Edge index past the last edge
    #[error("Edge {index} is out of range ({edges} edges)")]
    EdgeOutOfRange {
        /// The requested edge index.
        index: usize,
        /// The number of edges the element has.
        edges: usize,
    },

    /// Node index past the last node
    #[error("Node {index} is out of range ({nodes} nodes)")]
    NodeOutOfRange {
        /// The requested node index.
        index: usize,
        /// The number of nodes the element has.
        nodes: usize,
    },
}

/// Contract violation by the caller of an element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    /// An edit-mode-only operation was called outside edit mode
    #[error("{operation} requires edit mode")]
    NotInEditMode {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The element kind does not offer this operation
    #[error("{operation} is not supported by {kind} elements")]
    Unsupported {
        /// The element kind.
        kind: ElementKind,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The element was destroyed and must not be used again
    #[error("Element {id} has been destroyed")]
    Destroyed {
        /// The destroyed element.
        id: ElementId,
    },

    /// A property patch for one kind was applied to another
    #[error("Expected a {expected} element, found {actual}")]
    KindMismatch {
        /// The kind the patch was written for.
        expected: ElementKind,
        /// The kind of the element it was applied to.
        actual: ElementKind,
    },

    /// The image has not finished loading
    #[error("Image element {id} has not finished loading")]
    NotLoaded {
        /// The image element.
        id: ElementId,
    },
}

/// Failure to fetch or decode an image resource.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// No source reference was given
    #[error("Image source is empty")]
    EmptySource,

    /// The bytes could not be fetched
    #[error("Failed to load image '{src}': {reason}")]
    Load {
        /// The source reference.
        src: String,
        /// The reason loading failed.
        reason: String,
    },

    /// The bytes are not a decodable image
    #[error("Failed to decode image '{src}': {reason}")]
    Decode {
        /// The source reference.
        src: String,
        /// The reason decoding failed.
        reason: String,
    },
}

/// Registry-level failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The id is not registered in the session
    #[error("Unknown element {id}")]
    UnknownElement {
        /// The requested id.
        id: ElementId,
    },

    /// The operation needs a selection and there is none
    #[error("Nothing is selected")]
    NothingSelected,

    /// Grouping needs at least two active primitives
    #[error("Grouping needs at least 2 selected primitives, found {count}")]
    GroupRequiresMultiple {
        /// Number of active primitives.
        count: usize,
    },

    /// Ungroup was requested on something that is not a group
    #[error("The active primitive is not a group")]
    NotAGroup,

    /// An element with this id is already registered
    #[error("Element {id} is already registered")]
    DuplicateId {
        /// The clashing id.
        id: ElementId,
    },
}

/// Unified error type for DiagramKit
#[derive(Error, Debug)]
pub enum Error {
    /// Guard rejection
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Element contract violation
    #[error(transparent)]
    Element(#[from] ElementError),

    /// Image resource failure
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Registry failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a guard rejection the user should be told about
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Edit(_))
    }

    /// Check if this is a caller-side contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::Element(_))
    }

    /// Check if this is an image resource failure
    pub fn is_image_error(&self) -> bool {
        matches!(self, Error::Image(_))
    }

    /// Check if this is a registry failure
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::Session(_))
    }
}

/// Result type for DiagramKit operations
pub type Result<T> = std::result::Result<T, Error>;
