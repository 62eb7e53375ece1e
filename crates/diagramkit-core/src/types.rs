//! Identifiers and enumerations shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, stable identifier of an element.
///
/// Identifiers are random v4 UUIDs, so a session never hands out the same
/// id twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one read back from a saved document.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The four element variants. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Closed shape with at least three vertices
    Polygon,
    /// Open path with at least two vertices
    #[serde(alias = "line")]
    Polyline,
    /// Editable text box
    Text,
    /// Bitmap loaded asynchronously
    Image,
}

impl ElementKind {
    /// Smallest vertex count the kind tolerates, for kinds with vertices.
    pub fn min_points(&self) -> Option<usize> {
        match self {
            Self::Polygon => Some(3),
            Self::Polyline => Some(2),
            Self::Text | Self::Image => None,
        }
    }

    /// Whether the kind exposes node/edge editing.
    pub fn has_vertices(&self) -> bool {
        self.min_points().is_some()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polygon => write!(f, "polygon"),
            Self::Polyline => write!(f, "polyline"),
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Operating status a polyline can carry when it stands for a
/// connection between pieces of equipment in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Running,
    Idle,
    Off,
    Alarm,
    Maintenance,
    Breakdown,
    Disconnected,
}

impl LineStatus {
    pub const ALL: [LineStatus; 7] = [
        LineStatus::Running,
        LineStatus::Idle,
        LineStatus::Off,
        LineStatus::Alarm,
        LineStatus::Maintenance,
        LineStatus::Breakdown,
        LineStatus::Disconnected,
    ];
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Idle => write!(f, "idle"),
            Self::Off => write!(f, "off"),
            Self::Alarm => write!(f, "alarm"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::Breakdown => write!(f, "breakdown"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}
