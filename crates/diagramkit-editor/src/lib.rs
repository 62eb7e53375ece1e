//! # DiagramKit Editor
//!
//! The editing model of a vector diagram editor. Elements (polygons,
//! polylines, text and images) live on a retained scene of primitives and
//! are managed by an editor session.
//!
//! ## Core Components
//!
//! ### Elements
//! - **Polygon / Polyline**: node-level editing with draggable vertices,
//!   edge handles for inserting and moving segments, and a rigid body in
//!   normal mode
//! - **Text**: inline editing with commit on exit
//! - **Image**: asynchronous loading with stale-result protection
//!
//! ### Session
//! - Element registry in insertion order
//! - Single and multi selection
//! - Grouping and ungrouping of selected primitives
//! - Input translation from scene events and keys
//! - Record-based persistence
//!
//! ## Architecture
//!
//! ```text
//! EditorSession
//!   ├── SceneGraph (RetainedScene by default)
//!   ├── Elements ── own primitives on the scene
//!   ├── PrimitiveIndex (primitive -> element, role)
//!   ├── SelectionManager
//!   └── EventBus (Added / Updated / Deleted / Editing ...)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diagramkit_editor::{EditorSession, ElementKind};
//!
//! let mut session = EditorSession::in_memory(Default::default());
//! let id = session.add_element(ElementKind::Polygon, None)?;
//! session.set_selected_edit_mode(true)?;
//! session.add_node_at_edge(0)?;
//! ```

pub mod element;
pub mod geometry;
pub mod image_loader;
pub mod primitive_index;
pub mod scene;
pub mod selection_manager;
pub mod serialization;
pub mod session;
pub mod transform;

pub use element::{
    EdgeMarkers, Element, ElementBase, ElementContext, ElementProperties, ImageElement,
    ImageLoadTicket, ImagePatch, ImageProps, OwnedPrimitive, PolygonElement, PolygonKind,
    PolygonPatch, PolygonProps, PolylineElement, PolylineKind, PolylinePatch, PolylineProps,
    PrimitiveRole, PropertyPatch, TextElement, TextPatch, TextProps, Topology, VertexElement,
    VertexKind,
};
pub use geometry::{bounding_box, midpoint, Bounds, Point, ShapePreset};
pub use image_loader::{DecodedImage, FileImageLoader, ImageLoader, MemoryImageLoader};
pub use primitive_index::{PrimitiveIndex, PrimitiveOwner};
pub use scene::{
    EditorKey, Interactivity, Primitive, PrimitiveId, PrimitiveShape, RetainedScene, SceneEvent,
    SceneGraph, Style,
};
pub use selection_manager::SelectionManager;
pub use serialization::{DesignFile, DesignMetadata, ElementRecord, FILE_FORMAT_VERSION};
pub use session::EditorSession;
pub use transform::{Affine, Decomposed, Placement};

pub use diagramkit_core::{ElementId, ElementKind, LineStatus};
