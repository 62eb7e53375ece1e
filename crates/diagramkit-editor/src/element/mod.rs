//! Elements: the logical objects a user places on the canvas.
//!
//! Every element owns a kind-specific property set and the scene primitives
//! that currently render it. Polygons and polylines share the node/edge
//! editing state machine in [`vertex`]; text and images have their own,
//! simpler edit behavior.
//!
//! ```text
//! Element (closed sum type, dispatch by match)
//!   ├── PolygonElement  = VertexElement<PolygonKind>   closed, ≥ 3 points
//!   ├── PolylineElement = VertexElement<PolylineKind>  open,   ≥ 2 points
//!   ├── TextElement     inline text editing
//!   └── ImageElement    asynchronous load, last load wins
//! ```

mod image;
mod polygon;
mod polyline;
mod text;
pub mod vertex;

pub use image::{ImageElement, ImageLoadTicket, ImagePatch, ImageProps};
pub use polygon::{PolygonElement, PolygonKind, PolygonPatch, PolygonProps};
pub use polyline::{PolylineElement, PolylineKind, PolylinePatch, PolylineProps};
pub use text::{TextElement, TextPatch, TextProps};
pub use vertex::{EdgeMarkers, Topology, VertexElement, VertexKind};

use diagramkit_core::{
    EditorEvent, ElementError, ElementEvent, ElementId, ElementKind, EventBus, Result,
};
use diagramkit_settings::Config;
use serde::Serialize;
use std::sync::Arc;

use crate::geometry::Point;
use crate::scene::{PrimitiveId, SceneGraph};
use crate::serialization::ElementRecord;

/// What an element needs from its session: the bus it reports to and the
/// configuration it styles itself from.
#[derive(Debug, Clone)]
pub struct ElementContext {
    pub bus: Arc<EventBus>,
    pub config: Arc<Config>,
}

impl ElementContext {
    pub fn new(config: Config) -> Self {
        Self {
            bus: Arc::new(EventBus::new()),
            config: Arc::new(config),
        }
    }

    pub fn with_bus(config: Config, bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            config: Arc::new(config),
        }
    }
}

impl Default for ElementContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Part an owned primitive plays for its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveRole {
    /// The shape or content itself
    Body,
    /// Vertex marker, edit mode only
    Node(usize),
    /// Dashed edge guide, edit mode only
    EdgeLine(usize),
    /// Edge midpoint handle, edit mode only
    EdgeHandle(usize),
}

/// A scene primitive together with the part it plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedPrimitive {
    pub id: PrimitiveId,
    pub role: PrimitiveRole,
}

impl OwnedPrimitive {
    pub fn new(id: PrimitiveId, role: PrimitiveRole) -> Self {
        Self { id, role }
    }
}

/// State every element kind carries.
#[derive(Debug, Clone)]
pub struct ElementBase {
    id: ElementId,
    kind: ElementKind,
    edit_mode: bool,
    selected: bool,
    destroyed: bool,
    ctx: ElementContext,
}

impl ElementBase {
    pub(crate) fn new(id: ElementId, kind: ElementKind, ctx: ElementContext) -> Self {
        Self {
            id,
            kind,
            edit_mode: false,
            selected: false,
            destroyed: false,
            ctx,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn set_edit_mode_flag(&mut self, enabled: bool) {
        self.edit_mode = enabled;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn config(&self) -> Arc<Config> {
        Arc::clone(&self.ctx.config)
    }

    pub(crate) fn ensure_alive(&self) -> std::result::Result<(), ElementError> {
        if self.destroyed {
            tracing::error!("Operation on destroyed element {}", self.id);
            return Err(ElementError::Destroyed { id: self.id });
        }
        Ok(())
    }

    pub(crate) fn ensure_editing(
        &self,
        operation: &'static str,
    ) -> std::result::Result<(), ElementError> {
        self.ensure_alive()?;
        if !self.edit_mode {
            tracing::error!("{} called on {} outside edit mode", operation, self.id);
            return Err(ElementError::NotInEditMode { operation });
        }
        Ok(())
    }

    pub(crate) fn publish(&self, event: EditorEvent) {
        if let Err(e) = self.ctx.bus.publish(event) {
            tracing::trace!("Event from {} not delivered: {}", self.id, e);
        }
    }

    pub(crate) fn notify_update(&self) {
        self.publish(EditorEvent::Element(ElementEvent::Updated { id: self.id }));
    }

    /// Mark destroyed and tell the session. Returns false if it already was.
    pub(crate) fn mark_destroyed(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.edit_mode = false;
        self.selected = false;
        self.publish(EditorEvent::Element(ElementEvent::Deleted { id: self.id }));
        true
    }
}

/// Full property set of any element kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ElementProperties {
    Polygon(PolygonProps),
    Polyline(PolylineProps),
    Text(TextProps),
    Image(ImageProps),
}

impl ElementProperties {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Polygon(_) => ElementKind::Polygon,
            Self::Polyline(_) => ElementKind::Polyline,
            Self::Text(_) => ElementKind::Text,
            Self::Image(_) => ElementKind::Image,
        }
    }

    /// Vertices for polygon and polyline properties.
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            Self::Polygon(props) => Some(&props.points),
            Self::Polyline(props) => Some(&props.points),
            Self::Text(_) | Self::Image(_) => None,
        }
    }
}

/// Partial property update for one element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyPatch {
    Polygon(PolygonPatch),
    Polyline(PolylinePatch),
    Text(TextPatch),
    Image(ImagePatch),
}

impl PropertyPatch {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Polygon(_) => ElementKind::Polygon,
            Self::Polyline(_) => ElementKind::Polyline,
            Self::Text(_) => ElementKind::Text,
            Self::Image(_) => ElementKind::Image,
        }
    }
}

impl From<PolygonPatch> for PropertyPatch {
    fn from(patch: PolygonPatch) -> Self {
        Self::Polygon(patch)
    }
}

impl From<PolylinePatch> for PropertyPatch {
    fn from(patch: PolylinePatch) -> Self {
        Self::Polyline(patch)
    }
}

impl From<TextPatch> for PropertyPatch {
    fn from(patch: TextPatch) -> Self {
        Self::Text(patch)
    }
}

impl From<ImagePatch> for PropertyPatch {
    fn from(patch: ImagePatch) -> Self {
        Self::Image(patch)
    }
}

/// Any element, dispatched by kind.
#[derive(Debug)]
pub enum Element {
    Polygon(PolygonElement),
    Polyline(PolylineElement),
    Text(TextElement),
    Image(ImageElement),
}

macro_rules! dispatch {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            Element::Polygon($e) => $body,
            Element::Polyline($e) => $body,
            Element::Text($e) => $body,
            Element::Image($e) => $body,
        }
    };
}

macro_rules! vertex_op {
    ($self:expr, $operation:literal, $e:ident => $body:expr) => {
        match $self {
            Element::Polygon($e) => $body,
            Element::Polyline($e) => $body,
            other => Err(ElementError::Unsupported {
                kind: other.kind(),
                operation: $operation,
            }
            .into()),
        }
    };
}

impl Element {
    pub fn base(&self) -> &ElementBase {
        dispatch!(self, e => e.base())
    }

    pub fn id(&self) -> ElementId {
        self.base().id()
    }

    pub fn kind(&self) -> ElementKind {
        self.base().kind()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.base().is_edit_mode()
    }

    pub fn is_selected(&self) -> bool {
        self.base().is_selected()
    }

    pub fn is_destroyed(&self) -> bool {
        self.base().is_destroyed()
    }

    /// Handle of the body primitive, if one is on the scene.
    pub fn body(&self) -> Option<PrimitiveId> {
        dispatch!(self, e => e.body())
    }

    /// Every primitive the element currently has on the scene.
    pub fn owned_primitives(&self) -> Vec<OwnedPrimitive> {
        dispatch!(self, e => e.owned_primitives())
    }

    /// Current properties, with geometry read back from the scene.
    pub fn properties(&self, scene: &dyn SceneGraph) -> ElementProperties {
        match self {
            Element::Polygon(e) => ElementProperties::Polygon(e.resolved_props(scene)),
            Element::Polyline(e) => ElementProperties::Polyline(e.resolved_props(scene)),
            Element::Text(e) => ElementProperties::Text(e.resolved_props(scene)),
            Element::Image(e) => ElementProperties::Image(e.resolved_props(scene)),
        }
    }

    /// Merge a patch. Returns a load ticket when an image source changed.
    pub fn update(
        &mut self,
        scene: &mut dyn SceneGraph,
        patch: PropertyPatch,
    ) -> Result<Option<ImageLoadTicket>> {
        match (self, patch) {
            (Element::Polygon(e), PropertyPatch::Polygon(p)) => e.update(scene, p).map(|_| None),
            (Element::Polyline(e), PropertyPatch::Polyline(p)) => e.update(scene, p).map(|_| None),
            (Element::Text(e), PropertyPatch::Text(p)) => e.update(scene, p).map(|_| None),
            (Element::Image(e), PropertyPatch::Image(p)) => e.update(scene, p),
            (element, patch) => Err(ElementError::KindMismatch {
                expected: element.kind(),
                actual: patch.kind(),
            }
            .into()),
        }
    }

    pub fn set_edit_mode(&mut self, scene: &mut dyn SceneGraph, enabled: bool) -> Result<()> {
        dispatch!(self, e => e.set_edit_mode(scene, enabled))
    }

    pub fn select(&mut self) {
        dispatch!(self, e => e.select())
    }

    pub fn deselect(&mut self) {
        dispatch!(self, e => e.deselect())
    }

    /// Remove every owned primitive and report the deletion.
    pub fn destroy(&mut self, scene: &mut dyn SceneGraph) {
        dispatch!(self, e => e.destroy(scene))
    }

    pub fn bring_to_front(&self, scene: &mut dyn SceneGraph) -> Result<()> {
        dispatch!(self, e => e.bring_to_front(scene))
    }

    pub fn send_to_back(&self, scene: &mut dyn SceneGraph) -> Result<()> {
        dispatch!(self, e => e.send_to_back(scene))
    }

    pub fn serialize(&self, scene: &dyn SceneGraph) -> ElementRecord {
        ElementRecord {
            id: self.id(),
            kind: self.kind(),
            properties: self.properties(scene),
        }
    }

    /// Points of a polygon or polyline as stored by the element.
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            Element::Polygon(e) => Some(e.points()),
            Element::Polyline(e) => Some(e.points()),
            Element::Text(_) | Element::Image(_) => None,
        }
    }

    pub fn selected_node(&self) -> Option<usize> {
        match self {
            Element::Polygon(e) => e.selected_node(),
            Element::Polyline(e) => e.selected_node(),
            Element::Text(_) | Element::Image(_) => None,
        }
    }

    pub fn select_node(&mut self, scene: &mut dyn SceneGraph, index: usize) -> Result<()> {
        vertex_op!(self, "select_node", e => e.select_node(scene, index))
    }

    pub fn drag_node(&mut self, scene: &mut dyn SceneGraph, index: usize, to: Point) -> Result<()> {
        vertex_op!(self, "drag_node", e => e.drag_node(scene, index, to))
    }

    pub fn begin_edge_drag(&mut self, scene: &mut dyn SceneGraph, edge: usize) -> Result<()> {
        vertex_op!(self, "begin_edge_drag", e => e.begin_edge_drag(scene, edge))
    }

    pub fn drag_edge(
        &mut self,
        scene: &mut dyn SceneGraph,
        edge: usize,
        handle_position: Point,
    ) -> Result<()> {
        vertex_op!(self, "drag_edge", e => e.drag_edge(scene, edge, handle_position))
    }

    pub fn end_drag(&mut self) -> Result<()> {
        vertex_op!(self, "end_drag", e => e.end_drag())
    }

    pub fn add_node_at_edge(&mut self, scene: &mut dyn SceneGraph, edge: usize) -> Result<usize> {
        vertex_op!(self, "add_node_at_edge", e => e.add_node_at_edge(scene, edge))
    }

    pub fn add_node_at_position(
        &mut self,
        scene: &mut dyn SceneGraph,
        position: Point,
    ) -> Result<usize> {
        vertex_op!(self, "add_node_at_position", e => e.add_node_at_position(scene, position))
    }

    pub fn delete_selected_node(&mut self, scene: &mut dyn SceneGraph) -> Result<()> {
        vertex_op!(self, "delete_selected_node", e => e.delete_selected_node(scene))
    }

    /// The body was dragged or scaled; text and images copy its placement.
    pub fn on_body_moving(&mut self, scene: &dyn SceneGraph) {
        match self {
            Element::Text(e) => e.sync_from_body(scene),
            Element::Image(e) => e.sync_from_body(scene),
            Element::Polygon(_) | Element::Polyline(_) => {}
        }
    }

    /// A gesture on the body finished.
    pub fn on_body_modified(&mut self, scene: &dyn SceneGraph) {
        self.on_body_moving(scene);
        if !self.is_destroyed() {
            self.base().notify_update();
        }
    }

    pub fn as_polygon(&self) -> Option<&PolygonElement> {
        match self {
            Element::Polygon(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_polyline(&self) -> Option<&PolylineElement> {
        match self {
            Element::Polyline(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextElement> {
        match self {
            Element::Text(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageElement> {
        match self {
            Element::Image(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageElement> {
        match self {
            Element::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PolygonElement> for Element {
    fn from(e: PolygonElement) -> Self {
        Element::Polygon(e)
    }
}

impl From<PolylineElement> for Element {
    fn from(e: PolylineElement) -> Self {
        Element::Polyline(e)
    }
}

impl From<TextElement> for Element {
    fn from(e: TextElement) -> Self {
        Element::Text(e)
    }
}

impl From<ImageElement> for Element {
    fn from(e: ImageElement) -> Self {
        Element::Image(e)
    }
}
