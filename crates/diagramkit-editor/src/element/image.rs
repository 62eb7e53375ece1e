//! Bitmap image elements.
//!
//! An image has no body until its source has loaded. Every load is tagged
//! with a generation number; a result carrying an older generation than the
//! element's current one is dropped, so the most recently requested source
//! always wins no matter in which order loads complete.

use diagramkit_core::{
    DiagnosticEvent, EditorEvent, ElementError, ElementEvent, ElementId, ElementKind, ImageError,
    Result,
};
use serde::{Deserialize, Serialize};

use super::{ElementBase, ElementContext, OwnedPrimitive, PrimitiveRole};
use crate::image_loader::{DecodedImage, ImageLoader};
use crate::scene::{Interactivity, Primitive, PrimitiveId, SceneGraph, Style};
use crate::transform::Placement;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    pub src: String,
    pub opacity: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for ImageProps {
    fn default() -> Self {
        Self {
            src: String::new(),
            opacity: 1.0,
            flip_x: false,
            flip_y: false,
            left: 200.0,
            top: 200.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl ImageProps {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    fn placement(&self) -> Placement {
        Placement {
            left: self.left,
            top: self.top,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            angle: 0.0,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePatch {
    pub src: Option<String>,
    pub opacity: Option<f64>,
    pub flip_x: Option<bool>,
    pub flip_y: Option<bool>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
}

impl ImagePatch {
    pub fn src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// Fill unset fields from `props`.
    pub fn resolve(self, mut props: ImageProps) -> ImageProps {
        if let Some(src) = self.src {
            props.src = src;
        }
        if let Some(opacity) = self.opacity {
            props.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(flip) = self.flip_x {
            props.flip_x = flip;
        }
        if let Some(flip) = self.flip_y {
            props.flip_y = flip;
        }
        if let Some(left) = self.left {
            props.left = left;
        }
        if let Some(top) = self.top {
            props.top = top;
        }
        if let Some(scale) = self.scale_x {
            props.scale_x = scale;
        }
        if let Some(scale) = self.scale_y {
            props.scale_y = scale;
        }
        props
    }
}

/// Identifies one load request of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLoadTicket {
    element: ElementId,
    generation: u64,
    src: String,
}

impl ImageLoadTicket {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

#[derive(Debug)]
pub struct ImageElement {
    base: ElementBase,
    props: ImageProps,
    body: Option<PrimitiveId>,
    natural_size: Option<DecodedImage>,
    generation: u64,
    last_error: Option<ImageError>,
}

impl ImageElement {
    /// Create the element and load its source.
    ///
    /// A failed load still yields the element, without a body; inspect
    /// [`is_loaded`](Self::is_loaded) and [`last_error`](Self::last_error).
    pub async fn create(
        scene: &mut dyn SceneGraph,
        ctx: ElementContext,
        loader: &dyn ImageLoader,
        id: ElementId,
        props: ImageProps,
    ) -> Self {
        let mut element = Self::pending(ctx, id, props);
        element.reload(scene, loader).await;
        element
    }

    /// Element with no load started yet.
    pub fn pending(ctx: ElementContext, id: ElementId, mut props: ImageProps) -> Self {
        props.opacity = props.opacity.clamp(0.0, 1.0);
        Self {
            base: ElementBase::new(id, ElementKind::Image, ctx),
            props,
            body: None,
            natural_size: None,
            generation: 0,
            last_error: None,
        }
    }

    pub fn base(&self) -> &ElementBase {
        &self.base
    }

    pub fn props(&self) -> &ImageProps {
        &self.props
    }

    pub fn body(&self) -> Option<PrimitiveId> {
        self.body
    }

    pub fn is_loaded(&self) -> bool {
        self.body.is_some()
    }

    pub fn last_error(&self) -> Option<&ImageError> {
        self.last_error.as_ref()
    }

    /// Natural size of the loaded bitmap.
    pub fn natural_size(&self) -> Option<DecodedImage> {
        self.natural_size
    }

    /// Displayed size: natural size times scale.
    pub fn dimensions(&self) -> Option<(f64, f64)> {
        self.natural_size.map(|size| {
            (
                size.width as f64 * self.props.scale_x,
                size.height as f64 * self.props.scale_y,
            )
        })
    }

    pub fn owned_primitives(&self) -> Vec<OwnedPrimitive> {
        self.body
            .map(|id| OwnedPrimitive::new(id, PrimitiveRole::Body))
            .into_iter()
            .collect()
    }

    pub fn resolved_props(&self, scene: &dyn SceneGraph) -> ImageProps {
        let mut props = self.props.clone();
        if let Some(body) = self.body.and_then(|id| scene.world_primitive(id)) {
            Self::copy_placement(&mut props, &body.placement);
        }
        props
    }

    pub fn select(&mut self) {
        self.base.set_selected(true);
    }

    pub fn deselect(&mut self) {
        self.base.set_selected(false);
    }

    /// Images have no edit mode; turning it off is always fine.
    pub fn set_edit_mode(&mut self, _scene: &mut dyn SceneGraph, enabled: bool) -> Result<()> {
        self.base.ensure_alive()?;
        if enabled {
            return Err(ElementError::Unsupported {
                kind: ElementKind::Image,
                operation: "set_edit_mode",
            }
            .into());
        }
        Ok(())
    }

    /// Start a new load, superseding any in flight, and drop the current body.
    pub fn begin_load(&mut self, scene: &mut dyn SceneGraph) -> ImageLoadTicket {
        self.generation += 1;
        if let Some(body) = self.body.take() {
            self.sync_props_from(scene, body);
            scene.remove_primitive(body);
            scene.request_render();
        }
        tracing::debug!(
            "Loading '{}' for image {} (generation {})",
            self.props.src,
            self.base.id(),
            self.generation
        );
        ImageLoadTicket {
            element: self.base.id(),
            generation: self.generation,
            src: self.props.src.clone(),
        }
    }

    /// Whether `ticket` is still the latest load of this element.
    pub fn is_current(&self, ticket: &ImageLoadTicket) -> bool {
        !self.base.is_destroyed()
            && ticket.element == self.base.id()
            && ticket.generation == self.generation
    }

    /// Apply a finished load. Returns false when the ticket was stale and the
    /// result was dropped.
    pub fn finish_load(
        &mut self,
        scene: &mut dyn SceneGraph,
        ticket: &ImageLoadTicket,
        result: std::result::Result<DecodedImage, ImageError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                "Dropping stale load of '{}' for image {} (generation {}, current {})",
                ticket.src,
                self.base.id(),
                ticket.generation,
                self.generation
            );
            return false;
        }

        match result {
            Ok(decoded) => {
                let body = Primitive::image(
                    ticket.src.clone(),
                    decoded.width as f64,
                    decoded.height as f64,
                    self.props.placement(),
                )
                .with_style(Style {
                    opacity: self.props.opacity,
                    ..Style::default()
                })
                .with_interactivity(Interactivity::INTERACTIVE);
                self.body = Some(scene.add_primitive(body));
                self.natural_size = Some(decoded);
                self.last_error = None;
                scene.request_render();
                tracing::info!(
                    "Loaded image {} '{}' ({}x{})",
                    self.base.id(),
                    ticket.src,
                    decoded.width,
                    decoded.height
                );
                self.base.publish(EditorEvent::Element(ElementEvent::Loaded {
                    id: self.base.id(),
                }));
            }
            Err(e) => {
                tracing::warn!("Image {} failed to load: {}", self.base.id(), e);
                self.base
                    .publish(EditorEvent::Diagnostic(DiagnosticEvent::ImageLoadFailed {
                        id: self.base.id(),
                        src: ticket.src.clone(),
                        reason: e.to_string(),
                    }));
                self.natural_size = None;
                self.last_error = Some(e);
            }
        }
        true
    }

    /// Load the current source again.
    pub async fn reload(&mut self, scene: &mut dyn SceneGraph, loader: &dyn ImageLoader) -> bool {
        let ticket = self.begin_load(scene);
        let result = loader.load(ticket.src()).await;
        self.finish_load(scene, &ticket, result)
    }

    /// Merge `patch`. A changed source starts a new load and returns its
    /// ticket; the caller completes it with [`finish_load`](Self::finish_load).
    pub fn update(
        &mut self,
        scene: &mut dyn SceneGraph,
        patch: ImagePatch,
    ) -> Result<Option<ImageLoadTicket>> {
        self.base.ensure_alive()?;
        if let Some(body) = self.body {
            self.sync_props_from(scene, body);
        }

        // An empty source leaves the current one in place
        let patch = ImagePatch {
            src: patch.src.filter(|src| !src.is_empty()),
            ..patch
        };
        let src_changed = patch.src.as_ref().is_some_and(|src| *src != self.props.src);
        self.props = patch.resolve(self.props.clone());

        if src_changed {
            self.base.notify_update();
            return Ok(Some(self.begin_load(scene)));
        }

        let placement = self.props.placement();
        let opacity = self.props.opacity;
        if let Some(body) = self.body_mut(scene) {
            let angle = body.placement.angle;
            body.placement = Placement { angle, ..placement };
            body.style.opacity = opacity;
        }
        scene.request_render();
        self.base.notify_update();
        Ok(None)
    }

    /// Back to natural size.
    pub fn reset_size(&mut self, scene: &mut dyn SceneGraph) -> Result<()> {
        self.base.ensure_alive()?;
        let Some(body) = self.body_mut(scene) else {
            return Err(ElementError::NotLoaded { id: self.base.id() }.into());
        };
        body.placement.scale_x = 1.0;
        body.placement.scale_y = 1.0;
        self.props.scale_x = 1.0;
        self.props.scale_y = 1.0;
        scene.request_render();
        self.base.notify_update();
        Ok(())
    }

    /// Copy position, scale and flips from the body after a gesture.
    pub fn sync_from_body(&mut self, scene: &dyn SceneGraph) {
        if let Some(body) = self.body {
            self.sync_props_from(scene, body);
        }
    }

    pub fn destroy(&mut self, scene: &mut dyn SceneGraph) {
        if self.base.is_destroyed() {
            return;
        }
        self.generation += 1;
        if let Some(body) = self.body.take() {
            scene.remove_primitive(body);
        }
        scene.request_render();
        self.base.mark_destroyed();
        tracing::debug!("Destroyed image {}", self.base.id());
    }

    pub fn bring_to_front(&self, scene: &mut dyn SceneGraph) -> Result<()> {
        self.base.ensure_alive()?;
        if let Some(body) = self.body {
            scene.bring_to_front(body);
            scene.request_render();
        }
        Ok(())
    }

    pub fn send_to_back(&self, scene: &mut dyn SceneGraph) -> Result<()> {
        self.base.ensure_alive()?;
        if let Some(body) = self.body {
            scene.send_to_back(body);
            scene.request_render();
        }
        Ok(())
    }

    fn sync_props_from(&mut self, scene: &dyn SceneGraph, body: PrimitiveId) {
        if let Some(primitive) = scene.world_primitive(body) {
            Self::copy_placement(&mut self.props, &primitive.placement);
        }
    }

    /// The body for in-place changes, lifted out of any group first.
    fn body_mut<'s>(&self, scene: &'s mut dyn SceneGraph) -> Option<&'s mut Primitive> {
        let body = self.body?;
        scene.detach_from_group(body);
        scene.primitive_mut(body)
    }

    fn copy_placement(props: &mut ImageProps, placement: &Placement) {
        props.left = placement.left;
        props.top = placement.top;
        props.scale_x = placement.scale_x;
        props.scale_y = placement.scale_y;
        props.flip_x = placement.flip_x;
        props.flip_y = placement.flip_y;
    }
}
