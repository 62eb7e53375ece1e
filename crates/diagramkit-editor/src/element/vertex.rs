//! Node and edge editing shared by polygons and polylines.
//!
//! In normal mode the element is a single interactive body primitive that
//! the user can move, scale and rotate freely. Entering edit mode bakes the
//! body's accumulated transform into the stored points, freezes the body and
//! lays out one draggable marker per vertex plus a guide line and midpoint
//! handle per edge:
//!
//! ```text
//!   normal ──set_edit_mode(true)──▶ editing
//!     ▲      capture world vertices     │ node / edge drags,
//!     │      body inert, markers up     │ add / delete nodes
//!     └───────set_edit_mode(false)──────┘
//!            markers removed, body interactive and active again
//! ```
//!
//! Stacking while editing: body, then edge guides and handles, then nodes.

use diagramkit_core::{EditError, EditingEvent, EditorEvent, ElementId, ElementKind, Result};
use diagramkit_settings::{Config, NodeColors};
use std::marker::PhantomData;

use super::{ElementBase, ElementContext, OwnedPrimitive, PrimitiveRole};
use crate::geometry::{midpoint, Point};
use crate::scene::{Interactivity, Primitive, PrimitiveId, PrimitiveShape, SceneGraph, Style};

/// How consecutive vertices are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Last vertex connects back to the first: `n` edges
    Closed,
    /// No closing edge: `n - 1` edges
    Open,
}

impl Topology {
    pub fn edge_count(&self, nodes: usize) -> usize {
        match self {
            Topology::Closed if nodes >= 2 => nodes,
            Topology::Closed => 0,
            Topology::Open => nodes.saturating_sub(1),
        }
    }

    /// Vertex indices at the two ends of `edge`.
    pub fn edge_endpoints(&self, edge: usize, nodes: usize) -> (usize, usize) {
        (edge, (edge + 1) % nodes.max(1))
    }

    /// Edges that have `node` as an endpoint.
    pub fn edges_touching(&self, node: usize, nodes: usize) -> Vec<usize> {
        let edges = self.edge_count(nodes);
        let mut touching = Vec::with_capacity(2);
        match self {
            Topology::Closed => {
                if edges == 0 {
                    return touching;
                }
                touching.push((node + nodes - 1) % nodes);
                if !touching.contains(&node) {
                    touching.push(node);
                }
            }
            Topology::Open => {
                if node > 0 {
                    touching.push(node - 1);
                }
                if node < edges {
                    touching.push(node);
                }
            }
        }
        touching
    }
}

/// What distinguishes one vertex element kind from another.
pub trait VertexKind {
    type Props: Clone + std::fmt::Debug;

    const KIND: ElementKind;
    const TOPOLOGY: Topology;
    const MIN_POINTS: usize;

    fn points(props: &Self::Props) -> &[Point];

    fn points_mut(props: &mut Self::Props) -> &mut Vec<Point>;

    /// Untransformed body geometry; `None` when the points cannot form one.
    fn shape(points: &[Point]) -> Option<Primitive>;

    fn body_style(props: &Self::Props, config: &Config) -> Style;

    fn node_colors(config: &Config) -> &NodeColors;
}

/// Guide line and midpoint handle of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeMarkers {
    pub line: PrimitiveId,
    pub handle: PrimitiveId,
}

/// Endpoint positions captured when an edge drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EdgeDrag {
    edge: usize,
    start_a: Point,
    start_b: Point,
    handle_start: Point,
}

/// A polygon or polyline together with its edit-mode markers.
#[derive(Debug)]
pub struct VertexElement<K: VertexKind> {
    base: ElementBase,
    props: K::Props,
    body: Option<PrimitiveId>,
    nodes: Vec<PrimitiveId>,
    edges: Vec<EdgeMarkers>,
    selected_node: Option<usize>,
    edge_drag: Option<EdgeDrag>,
    _kind: PhantomData<K>,
}

impl<K: VertexKind> VertexElement<K> {
    /// Build the element and put its body on the scene.
    pub fn create(
        scene: &mut dyn SceneGraph,
        ctx: ElementContext,
        id: ElementId,
        props: K::Props,
    ) -> Result<Self> {
        let count = K::points(&props).len();
        if count < K::MIN_POINTS {
            return Err(EditError::MinimumPoints {
                kind: K::KIND,
                minimum: K::MIN_POINTS,
            }
            .into());
        }

        let mut element = Self {
            base: ElementBase::new(id, K::KIND, ctx),
            props,
            body: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            selected_node: None,
            edge_drag: None,
            _kind: PhantomData,
        };
        element.rebuild_body(scene);
        scene.request_render();
        tracing::debug!("Created {} {} with {} points", K::KIND, id, count);
        Ok(element)
    }

    pub fn base(&self) -> &ElementBase {
        &self.base
    }

    pub fn id(&self) -> ElementId {
        self.base.id()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.base.is_edit_mode()
    }

    pub fn props(&self) -> &K::Props {
        &self.props
    }

    pub(crate) fn props_mut(&mut self) -> &mut K::Props {
        &mut self.props
    }

    /// Stored points. These lag behind the body while it is being
    /// transformed in normal mode; see [`current_points`](Self::current_points).
    pub fn points(&self) -> &[Point] {
        K::points(&self.props)
    }

    pub fn body(&self) -> Option<PrimitiveId> {
        self.body
    }

    pub fn nodes(&self) -> &[PrimitiveId] {
        &self.nodes
    }

    pub fn edge_markers(&self) -> &[EdgeMarkers] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        K::TOPOLOGY.edge_count(self.points().len())
    }

    pub fn selected_node(&self) -> Option<usize> {
        self.selected_node
    }

    pub fn owned_primitives(&self) -> Vec<OwnedPrimitive> {
        let mut owned = Vec::with_capacity(1 + self.nodes.len() + self.edges.len() * 2);
        if let Some(body) = self.body {
            owned.push(OwnedPrimitive::new(body, PrimitiveRole::Body));
        }
        for (i, edge) in self.edges.iter().enumerate() {
            owned.push(OwnedPrimitive::new(edge.line, PrimitiveRole::EdgeLine(i)));
            owned.push(OwnedPrimitive::new(edge.handle, PrimitiveRole::EdgeHandle(i)));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            owned.push(OwnedPrimitive::new(*node, PrimitiveRole::Node(i)));
        }
        owned
    }

    /// Points with the body's accumulated transform applied.
    pub fn current_points(&self, scene: &dyn SceneGraph) -> Vec<Point> {
        self.body
            .and_then(|id| scene.world_primitive(id))
            .map(|body| body.world_vertices())
            .filter(|world| world.len() == self.points().len())
            .unwrap_or_else(|| self.points().to_vec())
    }

    /// Properties with geometry resolved from the scene.
    pub fn resolved_props(&self, scene: &dyn SceneGraph) -> K::Props {
        let mut props = self.props.clone();
        if !self.is_edit_mode() {
            *K::points_mut(&mut props) = self.current_points(scene);
        }
        props
    }

    pub fn select(&mut self) {
        self.base.set_selected(true);
    }

    pub fn deselect(&mut self) {
        self.base.set_selected(false);
    }

    pub fn set_edit_mode(&mut self, scene: &mut dyn SceneGraph, enabled: bool) -> Result<()> {
        self.base.ensure_alive()?;
        if self.is_edit_mode() == enabled {
            return Ok(());
        }

        if enabled {
            scene.clear_active();
            let captured = self.current_points(scene);
            *K::points_mut(&mut self.props) = captured;
            self.selected_node = None;
            self.edge_drag = None;
            self.base.set_edit_mode_flag(true);
            self.rebuild_body(scene);
            self.create_markers(scene);
        } else {
            self.remove_markers(scene);
            self.selected_node = None;
            self.edge_drag = None;
            self.base.set_edit_mode_flag(false);
            self.rebuild_body(scene);
            if let Some(body) = self.body {
                scene.set_active(&[body]);
            }
        }

        scene.request_render();
        tracing::debug!(
            "{} {} edit mode {}",
            K::KIND,
            self.id(),
            if enabled { "on" } else { "off" }
        );
        self.base.publish(EditorEvent::Editing(EditingEvent::ModeChanged {
            id: self.id(),
            enabled,
        }));
        Ok(())
    }

    pub fn select_node(&mut self, scene: &mut dyn SceneGraph, index: usize) -> Result<()> {
        self.base.ensure_editing("select_node")?;
        self.check_node(index)?;

        self.selected_node = Some(index);
        self.recolor_nodes(scene);
        scene.request_render();
        self.base.publish(EditorEvent::Editing(EditingEvent::NodeSelected {
            id: self.id(),
            index: Some(index),
        }));
        Ok(())
    }

    /// Move vertex `index` to `to`, dragging its adjacent edges along.
    pub fn drag_node(&mut self, scene: &mut dyn SceneGraph, index: usize, to: Point) -> Result<()> {
        self.base.ensure_editing("drag_node")?;
        self.check_node(index)?;

        K::points_mut(&mut self.props)[index] = to;
        if let Some(node) = self.nodes.get(index).and_then(|id| scene.primitive_mut(*id)) {
            node.placement.left = to.x;
            node.placement.top = to.y;
        }
        self.rebuild_body(scene);
        let nodes = self.points().len();
        for edge in K::TOPOLOGY.edges_touching(index, nodes) {
            self.reposition_edge(scene, edge);
        }
        scene.request_render();
        self.base.notify_update();
        Ok(())
    }

    /// Record where an edge's endpoints are before dragging its handle.
    pub fn begin_edge_drag(&mut self, scene: &mut dyn SceneGraph, edge: usize) -> Result<()> {
        self.base.ensure_editing("begin_edge_drag")?;
        self.check_edge(edge)?;

        let handle_start = self
            .edges
            .get(edge)
            .and_then(|markers| scene.primitive(markers.handle))
            .map(|handle| handle.origin());
        self.edge_drag = Some(self.snapshot_edge(edge, handle_start));
        Ok(())
    }

    /// Move both endpoints of `edge` rigidly with its handle.
    ///
    /// Without a preceding [`begin_edge_drag`](Self::begin_edge_drag) the
    /// drag starts from the edge's current midpoint.
    pub fn drag_edge(
        &mut self,
        scene: &mut dyn SceneGraph,
        edge: usize,
        handle_position: Point,
    ) -> Result<()> {
        self.base.ensure_editing("drag_edge")?;
        self.check_edge(edge)?;

        let drag = match self.edge_drag {
            Some(drag) if drag.edge == edge => drag,
            _ => self.snapshot_edge(edge, None),
        };
        self.edge_drag = Some(drag);

        let delta = handle_position - drag.handle_start;
        let (a, b) = K::TOPOLOGY.edge_endpoints(edge, self.points().len());
        {
            let points = K::points_mut(&mut self.props);
            points[a] = drag.start_a + delta;
            points[b] = drag.start_b + delta;
        }

        self.rebuild_body(scene);
        self.reposition_markers(scene);
        scene.request_render();
        self.base.notify_update();
        Ok(())
    }

    /// Finish a node or edge drag.
    pub fn end_drag(&mut self) -> Result<()> {
        self.base.ensure_alive()?;
        if self.edge_drag.take().is_some() {
            tracing::trace!("Edge drag on {} finished", self.id());
        }
        self.base.notify_update();
        Ok(())
    }

    /// Insert a vertex at the midpoint of `edge` and select it.
    pub fn add_node_at_edge(&mut self, scene: &mut dyn SceneGraph, edge: usize) -> Result<usize> {
        self.base.ensure_editing("add_node_at_edge")?;
        self.check_edge(edge)?;

        let (a, b) = K::TOPOLOGY.edge_endpoints(edge, self.points().len());
        let points = K::points_mut(&mut self.props);
        let inserted = midpoint(points[a], points[b]);
        let index = edge + 1;
        points.insert(index, inserted);

        self.selected_node = Some(index);
        self.rebuild_all(scene);
        tracing::debug!("Added node {} to {} on edge {}", index, self.id(), edge);
        self.publish_nodes_changed();
        Ok(index)
    }

    /// Append a vertex at `position` and select it.
    pub fn add_node_at_position(
        &mut self,
        scene: &mut dyn SceneGraph,
        position: Point,
    ) -> Result<usize> {
        self.base.ensure_editing("add_node_at_position")?;

        let points = K::points_mut(&mut self.props);
        points.push(position);
        let index = points.len() - 1;

        self.selected_node = Some(index);
        self.rebuild_all(scene);
        tracing::debug!("Appended node {} to {}", index, self.id());
        self.publish_nodes_changed();
        Ok(index)
    }

    /// Remove the selected vertex, keeping at least the minimum count.
    pub fn delete_selected_node(&mut self, scene: &mut dyn SceneGraph) -> Result<()> {
        self.base.ensure_editing("delete_selected_node")?;

        let Some(index) = self.selected_node else {
            return Err(EditError::NoNodeSelected.into());
        };
        if self.points().len() <= K::MIN_POINTS {
            return Err(EditError::MinimumPoints {
                kind: K::KIND,
                minimum: K::MIN_POINTS,
            }
            .into());
        }

        K::points_mut(&mut self.props).remove(index);
        self.selected_node = None;
        self.rebuild_all(scene);
        tracing::debug!("Deleted node {} from {}", index, self.id());
        self.publish_nodes_changed();
        Ok(())
    }

    /// Remove everything this element put on the scene.
    pub fn destroy(&mut self, scene: &mut dyn SceneGraph) {
        if self.base.is_destroyed() {
            return;
        }
        self.remove_markers(scene);
        if let Some(body) = self.body.take() {
            scene.remove_primitive(body);
        }
        self.selected_node = None;
        self.edge_drag = None;
        scene.request_render();
        self.base.mark_destroyed();
        tracing::debug!("Destroyed {} {}", K::KIND, self.id());
    }

    pub fn bring_to_front(&self, scene: &mut dyn SceneGraph) -> Result<()> {
        self.base.ensure_alive()?;
        for owned in self.owned_primitives() {
            scene.bring_to_front(owned.id);
        }
        scene.request_render();
        Ok(())
    }

    pub fn send_to_back(&self, scene: &mut dyn SceneGraph) -> Result<()> {
        self.base.ensure_alive()?;
        for owned in self.owned_primitives().iter().rev() {
            scene.send_to_back(owned.id);
        }
        scene.request_render();
        Ok(())
    }

    /// Replace the stored points and rebuild what depends on them.
    pub(crate) fn replace_points(
        &mut self,
        scene: &mut dyn SceneGraph,
        points: Vec<Point>,
    ) -> Result<()> {
        if points.len() < K::MIN_POINTS {
            return Err(EditError::MinimumPoints {
                kind: K::KIND,
                minimum: K::MIN_POINTS,
            }
            .into());
        }
        let count = points.len();
        *K::points_mut(&mut self.props) = points;
        if self.selected_node.is_some_and(|i| i >= count) {
            self.selected_node = None;
        }
        self.edge_drag = None;

        if self.is_edit_mode() {
            self.rebuild_all(scene);
        } else {
            self.rebuild_body(scene);
        }
        Ok(())
    }

    /// Reapply the body style after a non-geometric property change.
    pub(crate) fn restyle_body(&mut self, scene: &mut dyn SceneGraph) {
        let config = self.base.config();
        let style = K::body_style(&self.props, &config);
        if let Some(body) = self.body {
            scene.detach_from_group(body);
            if let Some(primitive) = scene.primitive_mut(body) {
                primitive.style = style;
            }
        }
    }

    fn check_node(&self, index: usize) -> Result<()> {
        let nodes = self.points().len();
        if index >= nodes {
            return Err(EditError::NodeOutOfRange { index, nodes }.into());
        }
        Ok(())
    }

    fn check_edge(&self, index: usize) -> Result<()> {
        let edges = self.edge_count();
        if index >= edges {
            return Err(EditError::EdgeOutOfRange { index, edges }.into());
        }
        Ok(())
    }

    fn snapshot_edge(&self, edge: usize, handle_start: Option<Point>) -> EdgeDrag {
        let (a, b) = K::TOPOLOGY.edge_endpoints(edge, self.points().len());
        let start_a = self.points()[a];
        let start_b = self.points()[b];
        EdgeDrag {
            edge,
            start_a,
            start_b,
            handle_start: handle_start.unwrap_or_else(|| midpoint(start_a, start_b)),
        }
    }

    fn body_interactivity(&self) -> Interactivity {
        if self.is_edit_mode() {
            Interactivity::INERT
        } else {
            Interactivity::INTERACTIVE
        }
    }

    /// Construct a fresh body from the stored points at the old body's
    /// stacking position.
    fn rebuild_body(&mut self, scene: &mut dyn SceneGraph) {
        let config = self.base.config();
        let built = K::shape(self.points()).map(|shape| {
            shape
                .with_style(K::body_style(&self.props, &config))
                .with_interactivity(self.body_interactivity())
        });

        self.body = match (self.body.take(), built) {
            (Some(old), Some(body)) => Some(scene.replace_primitive(old, body)),
            (None, Some(body)) => Some(scene.add_primitive(body)),
            (old, None) => {
                if let Some(old) = old {
                    scene.remove_primitive(old);
                }
                tracing::warn!(
                    "{} {} has {} points, skipping body",
                    K::KIND,
                    self.id(),
                    self.points().len()
                );
                None
            }
        };
    }

    /// Structural change: indices shift, so any edge drag snapshot is stale.
    fn rebuild_all(&mut self, scene: &mut dyn SceneGraph) {
        self.edge_drag = None;
        self.remove_markers(scene);
        self.rebuild_body(scene);
        self.create_markers(scene);
        scene.request_render();
    }

    fn create_markers(&mut self, scene: &mut dyn SceneGraph) {
        let config = self.base.config();
        let editor = &config.editor;
        let appearance = &config.appearance;
        let nodes = self.points().len();

        for edge in 0..K::TOPOLOGY.edge_count(nodes) {
            let (a, b) = K::TOPOLOGY.edge_endpoints(edge, nodes);
            let (pa, pb) = (self.points()[a], self.points()[b]);

            let line = Primitive::line(pa, pb)
                .with_style(Style {
                    stroke: Some(appearance.edge_guide.clone()),
                    stroke_width: editor.edge_guide_width,
                    dash: editor.edge_guide_dash.clone(),
                    ..Style::default()
                })
                .with_interactivity(Interactivity::INERT);
            let handle = Primitive::circle(midpoint(pa, pb), editor.edge_handle_radius)
                .with_style(Style {
                    fill: Some(appearance.edge_handle_fill.clone()),
                    stroke: Some(appearance.edge_guide.clone()),
                    stroke_width: editor.edge_handle_stroke_width,
                    ..Style::default()
                })
                .with_interactivity(Interactivity::HANDLE);

            self.edges.push(EdgeMarkers {
                line: scene.add_primitive(line),
                handle: scene.add_primitive(handle),
            });
        }

        for i in 0..nodes {
            let marker = Primitive::circle(self.points()[i], editor.node_radius)
                .with_style(Style {
                    fill: Some(self.node_color(&config, i).to_string()),
                    stroke: Some(appearance.marker_stroke.clone()),
                    stroke_width: editor.node_stroke_width,
                    ..Style::default()
                })
                .with_interactivity(Interactivity::HANDLE);
            self.nodes.push(scene.add_primitive(marker));
        }
    }

    fn remove_markers(&mut self, scene: &mut dyn SceneGraph) {
        for node in self.nodes.drain(..) {
            scene.remove_primitive(node);
        }
        for edge in self.edges.drain(..) {
            scene.remove_primitive(edge.line);
            scene.remove_primitive(edge.handle);
        }
    }

    fn reposition_markers(&mut self, scene: &mut dyn SceneGraph) {
        if self.nodes.len() != self.points().len() || self.edges.len() != self.edge_count() {
            self.remove_markers(scene);
            self.create_markers(scene);
            return;
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(marker) = scene.primitive_mut(*node) {
                marker.placement.left = self.points()[i].x;
                marker.placement.top = self.points()[i].y;
            }
        }
        for edge in 0..self.edges.len() {
            self.reposition_edge(scene, edge);
        }
    }

    fn reposition_edge(&self, scene: &mut dyn SceneGraph, edge: usize) {
        let Some(markers) = self.edges.get(edge) else {
            return;
        };
        let (a, b) = K::TOPOLOGY.edge_endpoints(edge, self.points().len());
        let (pa, pb) = (self.points()[a], self.points()[b]);

        if let Some(line) = scene.primitive_mut(markers.line) {
            if let PrimitiveShape::Line { from, to } = &mut line.shape {
                *from = pa;
                *to = pb;
            }
        }
        if let Some(handle) = scene.primitive_mut(markers.handle) {
            let mid = midpoint(pa, pb);
            handle.placement.left = mid.x;
            handle.placement.top = mid.y;
        }
    }

    fn node_color<'a>(&self, config: &'a Config, index: usize) -> &'a str {
        let last = self.points().len().saturating_sub(1);
        let endpoint = K::TOPOLOGY == Topology::Open && (index == 0 || index == last);
        K::node_colors(config).color(self.selected_node == Some(index), endpoint)
    }

    fn recolor_nodes(&self, scene: &mut dyn SceneGraph) {
        let config = self.base.config();
        for (i, node) in self.nodes.iter().enumerate() {
            let color = self.node_color(&config, i).to_string();
            if let Some(marker) = scene.primitive_mut(*node) {
                marker.style.fill = Some(color);
            }
        }
    }

    fn publish_nodes_changed(&self) {
        self.base.publish(EditorEvent::Editing(EditingEvent::NodesChanged {
            id: self.id(),
            count: self.points().len(),
        }));
        self.base.notify_update();
    }
}
