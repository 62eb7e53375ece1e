//! Editor session: the registry of elements and everything that spans them.
//!
//! The session owns the scene, the elements, the selection, the primitive
//! side table and the event bus. Hosts drive it through the methods below
//! and through [`EditorSession::handle_event`] / [`EditorSession::handle_key`],
//! which translate raw scene input into element operations.
//!
//! Elements report their own destruction on the bus; the session removes
//! them from its map and selection only in response to that notification.

use diagramkit_core::{
    DiagnosticEvent, EditorEvent, ElementError, ElementEvent, ElementId, ElementKind, Error,
    EventBus, EventCategory, EventFilter, ImageError, Result, SelectionEvent, SessionError,
    SubscriptionId,
};
use diagramkit_settings::Config;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::element::{
    Element, ElementContext, ElementProperties, ImageElement, ImageLoadTicket, ImagePatch,
    ImageProps, PolygonElement, PolygonProps, PolylineElement, PolylineProps, PrimitiveRole,
    PropertyPatch, TextElement, TextProps,
};
use crate::geometry::{bounding_box, preset_points, Bounds, Point};
use crate::image_loader::{ImageLoader, MemoryImageLoader};
use crate::primitive_index::{PrimitiveIndex, PrimitiveOwner};
use crate::scene::{
    EditorKey, Primitive, PrimitiveId, PrimitiveShape, RetainedScene, SceneEvent, SceneGraph,
};
use crate::selection_manager::SelectionManager;
use crate::serialization::ElementRecord;
use crate::transform::Placement;

pub struct EditorSession<S: SceneGraph = RetainedScene> {
    scene: S,
    elements: HashMap<ElementId, Element>,
    /// Insertion order
    order: Vec<ElementId>,
    selection: SelectionManager,
    index: PrimitiveIndex,
    ctx: ElementContext,
    loader: Arc<dyn ImageLoader>,
    deleted: Arc<Mutex<Vec<ElementId>>>,
    subscription: SubscriptionId,
    pending_loads: Vec<ImageLoadTicket>,
}

impl EditorSession<RetainedScene> {
    /// Session over an empty in-memory scene with an in-memory image store.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            RetainedScene::new(),
            config,
            Arc::new(MemoryImageLoader::new()),
        )
    }
}

impl<S: SceneGraph> EditorSession<S> {
    pub fn new(scene: S, config: Config, loader: Arc<dyn ImageLoader>) -> Self {
        Self::with_context(scene, ElementContext::new(config), loader)
    }

    pub fn with_context(scene: S, ctx: ElementContext, loader: Arc<dyn ImageLoader>) -> Self {
        let deleted = Arc::new(Mutex::new(Vec::new()));
        let inbox = Arc::clone(&deleted);
        let subscription = ctx.bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Element]),
            move |event| {
                if let EditorEvent::Element(ElementEvent::Deleted { id }) = event {
                    inbox.lock().push(id);
                }
            },
        );

        Self {
            scene,
            elements: HashMap::new(),
            order: Vec::new(),
            selection: SelectionManager::new(),
            index: PrimitiveIndex::new(),
            ctx,
            loader,
            deleted,
            subscription,
            pending_loads: Vec::new(),
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Direct scene access, e.g. to simulate gestures. Report the resulting
    /// events through [`handle_event`](Self::handle_event).
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.ctx.bus
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in the order they were added.
    pub fn elements(&self) -> Vec<&Element> {
        self.order
            .iter()
            .filter_map(|id| self.elements.get(id))
            .collect()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// The primary selection: defined while exactly one element is selected.
    pub fn selected_element(&self) -> Option<&Element> {
        self.selection
            .primary()
            .and_then(|id| self.elements.get(&id))
    }

    /// Owner of whatever primitive lies under `point`.
    pub fn primitive_at(&self, point: Point) -> Option<PrimitiveOwner> {
        self.scene
            .hit_test(point)
            .and_then(|id| self.index.resolve(id))
    }

    pub fn resolve_primitive(&self, id: PrimitiveId) -> Option<PrimitiveOwner> {
        self.index.resolve(id)
    }

    /// Add an element of `kind` at the next default position and make it the
    /// sole selection. Images go through [`add_image_element`](Self::add_image_element).
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        options: Option<PropertyPatch>,
    ) -> Result<ElementId> {
        if let Some(patch) = &options {
            if patch.kind() != kind {
                return Err(ElementError::KindMismatch {
                    expected: kind,
                    actual: patch.kind(),
                }
                .into());
            }
        }

        let config = Arc::clone(&self.ctx.config);
        let count = self.elements.len();
        let offset = count as f64 * config.editor.placement_step;
        let (cx, cy) = config.editor.canvas_center();
        let id = ElementId::new();

        let element: Element = match (kind, options) {
            (ElementKind::Polygon, patch) => {
                let mut props = PolygonProps::square(
                    Point::new(cx + offset, cy + offset),
                    config.editor.polygon_half_extent,
                    &config.appearance,
                );
                props.fill_color = config.appearance.palette_color(count).to_string();
                if let Some(PropertyPatch::Polygon(patch)) = patch {
                    let preset = patch.shape_type;
                    patch.apply_to(&mut props);
                    if let Some(points) = preset.and_then(|preset| {
                        bounding_box(&props.points).and_then(|b| {
                            preset_points(preset, &b, config.editor.circle_segments)
                        })
                    }) {
                        props.points = points;
                    }
                }
                PolygonElement::create(&mut self.scene, self.ctx.clone(), id, props)?.into()
            }
            (ElementKind::Polyline, patch) => {
                let mut props = PolylineProps::horizontal(
                    Point::new(cx + offset, cy + offset),
                    config.editor.polyline_half_length,
                    &config.appearance,
                );
                if let Some(PropertyPatch::Polyline(patch)) = patch {
                    patch.apply_to(&mut props);
                }
                PolylineElement::create(&mut self.scene, self.ctx.clone(), id, props)?.into()
            }
            (ElementKind::Text, patch) => {
                let mut props = TextProps::from_appearance(&config.appearance);
                props.left = cx - 100.0 + offset;
                props.top = cy + offset;
                if let Some(PropertyPatch::Text(patch)) = patch {
                    patch.apply_to(&mut props);
                }
                TextElement::create(&mut self.scene, self.ctx.clone(), id, props)?.into()
            }
            (ElementKind::Image, _) => {
                return Err(ElementError::Unsupported {
                    kind,
                    operation: "add_element",
                }
                .into());
            }
        };

        self.register(element);
        self.select_element(Some(id), false)?;
        Ok(id)
    }

    /// Load an image and add it once it has decoded.
    ///
    /// Nothing is registered when loading fails.
    pub async fn add_image_element(&mut self, patch: ImagePatch) -> Result<ElementId> {
        let src = patch
            .src
            .clone()
            .filter(|src| !src.trim().is_empty())
            .ok_or(ImageError::EmptySource)?;

        let config = Arc::clone(&self.ctx.config);
        let offset = self.elements.len() as f64 * config.editor.placement_step;
        let (cx, cy) = config.editor.canvas_center();
        let props = patch.resolve(ImageProps {
            left: cx - 100.0 + offset,
            top: cy - 100.0 + offset,
            ..ImageProps::new(src)
        });

        let id = ElementId::new();
        let loader = Arc::clone(&self.loader);
        let element =
            ImageElement::create(&mut self.scene, self.ctx.clone(), loader.as_ref(), id, props)
                .await;
        if !element.is_loaded() {
            return Err(load_failure(&element).into());
        }

        self.register(element.into());
        self.select_element(Some(id), false)?;
        Ok(id)
    }

    /// Destroy an element; it leaves the registry through its deletion
    /// notification.
    pub fn delete_element(&mut self, id: ElementId) -> Result<()> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(SessionError::UnknownElement { id })?;
        element.destroy(&mut self.scene);
        self.reap();
        Ok(())
    }

    /// Delete every selected element and return how many went.
    pub fn delete_selected_elements(&mut self) -> Result<usize> {
        let ids = self.selection.selected().to_vec();
        if ids.is_empty() {
            return Err(SessionError::NothingSelected.into());
        }
        for id in &ids {
            self.delete_element(*id)?;
        }
        self.scene.clear_active();
        Ok(ids.len())
    }

    /// Remove every element.
    pub fn clear_all(&mut self) {
        for id in self.order.clone() {
            if let Some(element) = self.elements.get_mut(&id) {
                element.destroy(&mut self.scene);
            }
        }
        self.reap();
        self.pending_loads.clear();
        self.scene.clear_active();
        tracing::info!("Cleared all elements");
    }

    /// Select `id`, or clear the selection with `None`.
    ///
    /// Single mode replaces the selection, deselecting and leaving edit mode
    /// on everything else. Multi mode toggles `id`.
    pub fn select_element(&mut self, id: Option<ElementId>, multi: bool) -> Result<()> {
        let Some(id) = id else {
            self.clear_selection();
            return Ok(());
        };
        if !self.elements.contains_key(&id) {
            return Err(SessionError::UnknownElement { id }.into());
        }

        if multi {
            let selected = self.selection.toggle(id);
            if let Some(element) = self.elements.get_mut(&id) {
                if selected {
                    element.select();
                } else {
                    element.deselect();
                }
            }
            self.sync_active();
        } else {
            let dropped = self.selection.select_only(id);
            self.release(&dropped);
            if let Some(element) = self.elements.get_mut(&id) {
                element.select();
                if !element.is_edit_mode() {
                    if let Some(body) = element.body() {
                        self.scene.set_active(&[body]);
                    }
                }
            }
        }

        self.publish_selection();
        Ok(())
    }

    /// Replace the selection with `ids` (marquee selection).
    pub fn set_selected_elements(&mut self, ids: &[ElementId]) -> Result<()> {
        if let Some(unknown) = ids.iter().find(|id| !self.elements.contains_key(id)) {
            return Err(SessionError::UnknownElement { id: *unknown }.into());
        }
        let dropped = self.selection.set(ids);
        self.release(&dropped);
        for id in ids {
            if let Some(element) = self.elements.get_mut(id) {
                element.select();
            }
        }
        self.sync_active();
        self.publish_selection();
        Ok(())
    }

    /// Deselect everything, leaving edit mode where needed.
    pub fn clear_selection(&mut self) {
        let dropped = self.selection.clear();
        self.release(&dropped);
        self.scene.clear_active();
        self.publish_selection();
    }

    pub fn update_element(&mut self, id: ElementId, patch: PropertyPatch) -> Result<()> {
        let ticket = self.with_element(id, |element, scene| element.update(scene, patch))?;
        if let Some(ticket) = ticket {
            self.pending_loads.push(ticket);
        }
        Ok(())
    }

    /// Update the primary selection.
    pub fn update_selected_element(&mut self, patch: PropertyPatch) -> Result<()> {
        let id = self.primary()?;
        self.update_element(id, patch)
    }

    /// Image loads started by updates and not yet run.
    pub fn pending_loads(&self) -> usize {
        self.pending_loads.len()
    }

    /// Run queued image loads in request order. Loads superseded by a newer
    /// request for the same element are skipped; returns how many applied.
    pub async fn run_pending_loads(&mut self) -> usize {
        let tickets = std::mem::take(&mut self.pending_loads);
        let loader = Arc::clone(&self.loader);
        let mut applied = 0;

        for ticket in tickets {
            let current = self
                .elements
                .get(&ticket.element())
                .and_then(Element::as_image)
                .is_some_and(|image| image.is_current(&ticket));
            if !current {
                tracing::debug!(
                    "Skipping superseded load of '{}' for {}",
                    ticket.src(),
                    ticket.element()
                );
                continue;
            }

            let result = loader.load(ticket.src()).await;
            if let Some(image) = self
                .elements
                .get_mut(&ticket.element())
                .and_then(Element::as_image_mut)
            {
                if image.finish_load(&mut self.scene, &ticket, result) {
                    applied += 1;
                }
            }
            self.resync(ticket.element());
        }
        applied
    }

    /// Turn edit mode on or off for the primary selection.
    pub fn set_selected_edit_mode(&mut self, enabled: bool) -> Result<()> {
        let id = self.primary()?;
        self.with_element(id, |element, scene| element.set_edit_mode(scene, enabled))
    }

    pub fn select_node(&mut self, index: usize) -> Result<()> {
        let id = self.primary()?;
        self.with_element(id, |element, scene| element.select_node(scene, index))
    }

    pub fn drag_node(&mut self, index: usize, to: Point) -> Result<()> {
        let id = self.primary()?;
        self.with_element(id, |element, scene| element.drag_node(scene, index, to))
    }

    pub fn add_node_at_edge(&mut self, edge: usize) -> Result<usize> {
        let id = self.primary()?;
        self.with_element(id, |element, scene| element.add_node_at_edge(scene, edge))
    }

    pub fn add_node_at_position(&mut self, position: Point) -> Result<usize> {
        let id = self.primary()?;
        self.with_element(id, |element, scene| {
            element.add_node_at_position(scene, position)
        })
    }

    pub fn delete_selected_node(&mut self) -> Result<()> {
        let id = self.primary()?;
        self.with_element(id, |element, scene| element.delete_selected_node(scene))
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> Result<()> {
        self.with_element(id, |element, scene| element.bring_to_front(scene))
    }

    pub fn send_to_back(&mut self, id: ElementId) -> Result<()> {
        self.with_element(id, |element, scene| element.send_to_back(scene))
    }

    /// Route a scene event to the element owning its target.
    pub fn handle_event(&mut self, event: SceneEvent) -> Result<()> {
        match event {
            SceneEvent::MouseDown {
                target: None,
                additive,
            } => {
                if let Some(id) = self.editing_primary() {
                    self.with_element(id, |element, scene| element.set_edit_mode(scene, false))
                } else {
                    if !additive {
                        self.clear_selection();
                    }
                    Ok(())
                }
            }
            SceneEvent::MouseDown {
                target: Some(target),
                additive,
            } => match self.index.resolve(target) {
                Some(PrimitiveOwner {
                    element,
                    role: PrimitiveRole::Body,
                }) => self.select_element(Some(element), additive),
                Some(PrimitiveOwner {
                    element,
                    role: PrimitiveRole::Node(index),
                }) => self.with_element(element, |e, scene| e.select_node(scene, index)),
                Some(PrimitiveOwner {
                    element,
                    role: PrimitiveRole::EdgeHandle(edge),
                }) => self.with_element(element, |e, scene| e.begin_edge_drag(scene, edge)),
                Some(_) => Ok(()),
                None => {
                    tracing::debug!("Mouse down on unowned primitive {}", target);
                    Ok(())
                }
            },
            SceneEvent::Moving { target } => {
                let position = self.scene.primitive(target).map(Primitive::origin);
                match (self.index.resolve(target), position) {
                    (
                        Some(PrimitiveOwner {
                            element,
                            role: PrimitiveRole::Node(index),
                        }),
                        Some(to),
                    ) => self.with_element(element, |e, scene| e.drag_node(scene, index, to)),
                    (
                        Some(PrimitiveOwner {
                            element,
                            role: PrimitiveRole::EdgeHandle(edge),
                        }),
                        Some(to),
                    ) => self.with_element(element, |e, scene| e.drag_edge(scene, edge, to)),
                    (
                        Some(PrimitiveOwner {
                            element,
                            role: PrimitiveRole::Body,
                        }),
                        _,
                    ) => self.with_element(element, |e, scene| {
                        e.on_body_moving(scene);
                        Ok(())
                    }),
                    _ => Ok(()),
                }
            }
            SceneEvent::Scaling { target } => match self.index.resolve(target) {
                Some(PrimitiveOwner {
                    element,
                    role: PrimitiveRole::Body,
                }) => self.with_element(element, |e, scene| {
                    e.on_body_moving(scene);
                    Ok(())
                }),
                _ => Ok(()),
            },
            SceneEvent::Modified { target } => match self.index.resolve(target) {
                Some(PrimitiveOwner {
                    element,
                    role: PrimitiveRole::Body,
                }) => self.with_element(element, |e, scene| {
                    e.on_body_modified(scene);
                    Ok(())
                }),
                Some(PrimitiveOwner {
                    element,
                    role: PrimitiveRole::Node(_) | PrimitiveRole::EdgeHandle(_),
                }) => self.with_element(element, |e, _| e.end_drag()),
                _ => Ok(()),
            },
            SceneEvent::DoubleClick { target, position } => {
                match target.and_then(|t| self.index.resolve(t)) {
                    Some(PrimitiveOwner {
                        element,
                        role: PrimitiveRole::EdgeHandle(edge) | PrimitiveRole::EdgeLine(edge),
                    }) => self
                        .with_element(element, |e, scene| e.add_node_at_edge(scene, edge))
                        .map(|_| ()),
                    Some(PrimitiveOwner {
                        element,
                        role: PrimitiveRole::Body,
                    }) if self.kind_of(element) == Some(ElementKind::Text) => {
                        self.select_element(Some(element), false)?;
                        self.with_element(element, |e, scene| e.set_edit_mode(scene, true))
                    }
                    Some(_) => Ok(()),
                    None if target.is_none() => match self.editing_primary() {
                        Some(id) if self.kind_of(id).is_some_and(|k| k.has_vertices()) => self
                            .with_element(id, |e, scene| e.add_node_at_position(scene, position))
                            .map(|_| ()),
                        _ => Ok(()),
                    },
                    None => Ok(()),
                }
            }
            SceneEvent::TextChanged { target, text } => match self.index.resolve(target) {
                Some(PrimitiveOwner { element, .. }) => self.with_element(element, |e, scene| {
                    if let Some(text_element) = e.as_text_mut() {
                        text_element.on_text_changed(scene, &text);
                    }
                    Ok(())
                }),
                None => Ok(()),
            },
            SceneEvent::EditingExited { target } => match self.index.resolve(target) {
                Some(PrimitiveOwner { element, .. }) => {
                    self.with_element(element, |e, scene| e.set_edit_mode(scene, false))
                }
                None => Ok(()),
            },
        }
    }

    /// Keyboard shortcuts: Delete removes the selection or the selected
    /// node, Escape leaves edit mode or clears the selection.
    pub fn handle_key(&mut self, key: EditorKey) -> Result<()> {
        match key {
            EditorKey::Delete => {
                if self.selection.selected_count() > 1 {
                    return self.delete_selected_elements().map(|_| ());
                }
                let state = self
                    .selected_element()
                    .map(|element| (element.is_edit_mode(), element.kind().has_vertices()));
                match state {
                    // Inline text editing handles its own deletions
                    Some((true, false)) | None => Ok(()),
                    Some((true, true)) => self.delete_selected_node(),
                    Some((false, _)) => self.delete_selected_elements().map(|_| ()),
                }
            }
            EditorKey::Escape => match self.editing_primary() {
                Some(id) => self.with_element(id, |e, scene| e.set_edit_mode(scene, false)),
                None => {
                    self.clear_selection();
                    Ok(())
                }
            },
        }
    }

    /// Combine the active primitives into one group primitive.
    ///
    /// Members keep their handles and are re-placed relative to the group's
    /// top-left corner, so nothing moves on screen.
    pub fn group_selected_primitives(&mut self) -> Result<PrimitiveId> {
        let active = self.scene.active_primitives();
        if active.len() < 2 {
            return Err(SessionError::GroupRequiresMultiple {
                count: active.len(),
            }
            .into());
        }

        let bounds = active
            .iter()
            .filter_map(|id| self.scene.primitive(*id))
            .filter_map(Primitive::world_bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0));
        let origin = bounds.min();

        let mut members = Vec::with_capacity(active.len());
        for id in active {
            if let Some(mut member) = self.scene.remove_primitive(id) {
                member.placement.left -= origin.x;
                member.placement.top -= origin.y;
                members.push((id, member));
            }
        }

        let count = members.len();
        let group = self.scene.add_primitive(Primitive::group(members, origin));
        let dropped = self.selection.clear();
        for id in dropped {
            if let Some(element) = self.elements.get_mut(&id) {
                element.deselect();
            }
        }
        self.scene.set_active(&[group]);
        self.scene.request_render();
        self.publish_selection();
        tracing::info!("Grouped {} primitives into {}", count, group);
        Ok(group)
    }

    /// Split the active group back into its members, carrying the group's
    /// transform into each member's own placement.
    pub fn ungroup_selected_primitive(&mut self) -> Result<Vec<PrimitiveId>> {
        let active = self.scene.active_primitives();
        let group_id = match active.as_slice() {
            [id] if self.scene.primitive(*id).is_some_and(Primitive::is_group) => *id,
            [] => return Err(SessionError::NothingSelected.into()),
            _ => return Err(SessionError::NotAGroup.into()),
        };
        let Some(group) = self.scene.remove_primitive(group_id) else {
            return Err(SessionError::NotAGroup.into());
        };

        let group_matrix = group.matrix();
        let PrimitiveShape::Group { members } = group.shape else {
            return Err(SessionError::NotAGroup.into());
        };

        let mut restored = Vec::with_capacity(members.len());
        for (id, mut member) in members {
            if self.index.resolve(id).is_none() {
                tracing::warn!("Dropping unowned primitive {} from group {}", id, group_id);
                continue;
            }
            let absolute = group_matrix.multiply(&member.matrix());
            member.placement = Placement::from_matrix(&absolute);
            self.scene.restore_primitive(id, member);
            restored.push(id);
        }
        self.scene.set_active(&restored);
        self.scene.request_render();
        tracing::info!("Ungrouped {} into {} primitives", group_id, restored.len());
        Ok(restored)
    }

    /// Records of every element with geometry resolved from the scene.
    pub fn serialize(&self) -> Vec<ElementRecord> {
        self.order
            .iter()
            .filter_map(|id| self.elements.get(id))
            .map(|element| element.serialize(&self.scene))
            .collect()
    }

    /// Replace the session's contents with `records`, keeping their ids.
    ///
    /// Records that cannot be recreated are skipped with a diagnostic.
    /// Returns how many elements were loaded.
    pub async fn load_records(&mut self, records: Vec<ElementRecord>) -> Result<usize> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id) {
                return Err(SessionError::DuplicateId { id: record.id }.into());
            }
        }

        self.clear_all();
        self.clear_selection();
        let loader = Arc::clone(&self.loader);
        let total = records.len();
        let mut loaded = 0;

        for record in records {
            let id = record.id;
            let ctx = self.ctx.clone();
            let created: Result<Element> = match record.properties {
                ElementProperties::Polygon(props) => {
                    PolygonElement::create(&mut self.scene, ctx, id, props).map(Element::from)
                }
                ElementProperties::Polyline(props) => {
                    PolylineElement::create(&mut self.scene, ctx, id, props).map(Element::from)
                }
                ElementProperties::Text(props) => {
                    TextElement::create(&mut self.scene, ctx, id, props).map(Element::from)
                }
                ElementProperties::Image(props) => {
                    let image =
                        ImageElement::create(&mut self.scene, ctx, loader.as_ref(), id, props)
                            .await;
                    if image.is_loaded() {
                        Ok(image.into())
                    } else {
                        Err(load_failure(&image).into())
                    }
                }
            };

            match created {
                Ok(element) => {
                    self.register(element);
                    loaded += 1;
                }
                Err(error) => {
                    tracing::warn!("Skipping {} {}: {}", record.kind, id, error);
                    self.publish(EditorEvent::Diagnostic(DiagnosticEvent::Rejected {
                        id: Some(id),
                        reason: error.to_string(),
                    }));
                }
            }
        }

        tracing::info!("Loaded {} of {} elements", loaded, total);
        Ok(loaded)
    }

    fn register(&mut self, element: Element) {
        let id = element.id();
        let kind = element.kind();
        self.index.sync(id, &element.owned_primitives());
        self.elements.insert(id, element);
        self.order.push(id);
        tracing::info!("Added {} {}", kind, id);
        self.publish(EditorEvent::Element(ElementEvent::Added { id, kind }));
    }

    /// Run `f` on element `id`, then refresh the side table, report any
    /// rejection and drop elements that were destroyed along the way.
    fn with_element<T>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Element, &mut dyn SceneGraph) -> Result<T>,
    ) -> Result<T> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(SessionError::UnknownElement { id })?;
        let result = f(element, &mut self.scene);
        self.index.sync(id, &element.owned_primitives());
        if let Err(error) = &result {
            self.report(Some(id), error);
        }
        self.reap();
        result
    }

    fn primary(&self) -> Result<ElementId> {
        self.selection
            .primary()
            .ok_or_else(|| SessionError::NothingSelected.into())
    }

    fn editing_primary(&self) -> Option<ElementId> {
        self.selected_element()
            .filter(|element| element.is_edit_mode())
            .map(Element::id)
    }

    fn kind_of(&self, id: ElementId) -> Option<ElementKind> {
        self.elements.get(&id).map(Element::kind)
    }

    /// Deselect `ids`, taking them out of edit mode.
    fn release(&mut self, ids: &[ElementId]) {
        for id in ids {
            let Some(element) = self.elements.get_mut(id) else {
                continue;
            };
            element.deselect();
            if element.is_edit_mode() {
                if let Err(error) = element.set_edit_mode(&mut self.scene, false) {
                    tracing::error!("Could not leave edit mode on {}: {}", id, error);
                }
                self.index.sync(*id, &element.owned_primitives());
            }
        }
    }

    /// Make the scene's active set match the selected, non-editing bodies.
    fn sync_active(&mut self) {
        let bodies: Vec<PrimitiveId> = self
            .selection
            .selected()
            .iter()
            .filter_map(|id| self.elements.get(id))
            .filter(|element| !element.is_edit_mode())
            .filter_map(Element::body)
            .collect();
        self.scene.set_active(&bodies);
    }

    fn resync(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get(&id) {
            self.index.sync(id, &element.owned_primitives());
        }
    }

    /// Drop every element that announced its deletion.
    fn reap(&mut self) {
        let deleted: Vec<ElementId> = std::mem::take(&mut *self.deleted.lock());
        let mut selection_changed = false;
        for id in deleted {
            if self.elements.remove(&id).is_none() {
                continue;
            }
            self.order.retain(|other| *other != id);
            self.index.remove_element(id);
            self.pending_loads.retain(|ticket| ticket.element() != id);
            selection_changed |= self.selection.remove(id);
            tracing::info!("Deleted element {}", id);
        }
        if selection_changed {
            self.publish_selection();
        }
    }

    fn report(&self, id: Option<ElementId>, error: &Error) {
        if error.is_rejection() {
            tracing::warn!("Rejected: {}", error);
            self.publish(EditorEvent::Diagnostic(DiagnosticEvent::Rejected {
                id,
                reason: error.to_string(),
            }));
        } else {
            tracing::error!("Operation failed: {}", error);
        }
    }

    fn publish_selection(&self) {
        self.publish(EditorEvent::Selection(SelectionEvent::Changed {
            primary: self.selection.primary(),
            selected: self.selection.selected().to_vec(),
        }));
    }

    fn publish(&self, event: EditorEvent) {
        if let Err(error) = self.ctx.bus.publish(event) {
            tracing::trace!("Session event not delivered: {}", error);
        }
    }
}

fn load_failure(image: &ImageElement) -> ImageError {
    image
        .last_error()
        .cloned()
        .unwrap_or_else(|| ImageError::Load {
            src: image.props().src.clone(),
            reason: "no image produced".to_string(),
        })
}

impl<S: SceneGraph> Drop for EditorSession<S> {
    fn drop(&mut self) {
        self.ctx.bus.unsubscribe(self.subscription);
    }
}

impl<S: SceneGraph + std::fmt::Debug> std::fmt::Debug for EditorSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("scene", &self.scene)
            .field("elements", &self.order)
            .field("selection", &self.selection)
            .field("pending_loads", &self.pending_loads.len())
            .finish_non_exhaustive()
    }
}
