//! # DiagramKit
//!
//! The editing model of a vector diagram editor: polygons, polylines, text
//! and images drawn onto a retained scene, with node-level editing,
//! selection, grouping and record-based persistence.
//!
//! ## Architecture
//!
//! DiagramKit is organized as a workspace with multiple crates:
//!
//! 1. **diagramkit-core** - Identifiers, error taxonomy, event bus
//! 2. **diagramkit-settings** - Editor defaults and appearance, TOML config
//! 3. **diagramkit-editor** - Scene, elements, session, serialization
//! 4. **diagramkit** - This crate: re-exports and logging setup

pub use diagramkit_core::{
    DiagnosticEvent, EditError, EditingEvent, EditorEvent, ElementError, ElementEvent, ElementId,
    ElementKind, Error, EventBus, EventCategory, EventFilter, ImageError, LineStatus, Result,
    SelectionEvent, SessionError,
};

pub use diagramkit_settings::{AppearanceSettings, Config, EditorSettings, SettingsError};

pub use diagramkit_editor::{
    DesignFile, EditorKey, EditorSession, Element, ElementRecord, FileImageLoader, ImageLoader,
    ImagePatch, MemoryImageLoader, Placement, Point, PolygonPatch, PolylinePatch, PropertyPatch,
    RetainedScene, SceneEvent, SceneGraph, ShapePreset, TextPatch,
};

pub use diagramkit_editor as editor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting, or JSON lines when
///   `DIAGRAMKIT_LOG_FORMAT=json`
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let json = std::env::var("DIAGRAMKIT_LOG_FORMAT").is_ok_and(|format| format == "json");

    let result = if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .json();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
