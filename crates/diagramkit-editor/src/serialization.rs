//! Serialization and deserialization of diagrams.
//!
//! An element persists as `{id, kind, properties}`; a design file wraps the
//! element list with a format version and metadata and is stored as pretty
//! JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diagramkit_core::{ElementId, ElementKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::element::ElementProperties;

/// Design file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// Persisted form of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawElementRecord")]
pub struct ElementRecord {
    pub id: ElementId,
    pub kind: ElementKind,
    pub properties: ElementProperties,
}

/// Properties are decoded once the kind is known.
#[derive(Deserialize)]
struct RawElementRecord {
    id: ElementId,
    kind: ElementKind,
    #[serde(default)]
    properties: serde_json::Value,
}

impl TryFrom<RawElementRecord> for ElementRecord {
    type Error = serde_json::Error;

    fn try_from(raw: RawElementRecord) -> std::result::Result<Self, Self::Error> {
        let value = if raw.properties.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            raw.properties
        };
        let properties = match raw.kind {
            ElementKind::Polygon => ElementProperties::Polygon(serde_json::from_value(value)?),
            ElementKind::Polyline => ElementProperties::Polyline(serde_json::from_value(value)?),
            ElementKind::Text => ElementProperties::Text(serde_json::from_value(value)?),
            ElementKind::Image => ElementProperties::Image(serde_json::from_value(value)?),
        };
        Ok(Self {
            id: raw.id,
            kind: raw.kind,
            properties,
        })
    }
}

/// Complete design file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignFile {
    pub version: String,
    pub metadata: DesignMetadata,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
}

/// Design metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

impl DesignFile {
    /// Create a new empty design file
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: DesignMetadata {
                name: name.into(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
            },
            elements: Vec::new(),
        }
    }

    /// Design file holding `elements`.
    pub fn with_elements(name: impl Into<String>, elements: Vec<ElementRecord>) -> Self {
        Self {
            elements,
            ..Self::new(name)
        }
    }

    /// Save design to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize design to JSON")?;

        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write file: {}", path.as_ref().display()))?;

        tracing::info!(
            "Saved {} elements to {}",
            self.elements.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Load design from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read file: {}", path.as_ref().display()))?;

        let mut design: DesignFile =
            serde_json::from_str(&content).context("Failed to parse design file")?;

        if design.version != FILE_FORMAT_VERSION {
            tracing::warn!(
                "Design file version {} differs from {}",
                design.version,
                FILE_FORMAT_VERSION
            );
        }
        design.metadata.modified = Utc::now();

        tracing::info!(
            "Loaded {} elements from {}",
            design.elements.len(),
            path.as_ref().display()
        );
        Ok(design)
    }
}
