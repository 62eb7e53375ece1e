//! Editable text elements.
//!
//! Edit mode here means inline text editing: the body keeps its controls,
//! shows a caret, and starts with the whole text selected. Leaving edit mode
//! commits whatever the body currently holds.

use diagramkit_core::{EditingEvent, EditorEvent, ElementId, ElementKind, Result};
use diagramkit_settings::AppearanceSettings;
use serde::{Deserialize, Serialize};

use super::{ElementBase, ElementContext, OwnedPrimitive, PrimitiveRole};
use crate::scene::{
    FontStyle, FontWeight, Interactivity, Primitive, PrimitiveId, PrimitiveShape, SceneGraph,
    Style, TextAlign, TextContent,
};

pub const DEFAULT_TEXT: &str = "Double click to edit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub text: String,
    pub font_size: f64,
    pub font_color: String,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub underline: bool,
    pub text_align: TextAlign,
    pub left: f64,
    pub top: f64,
}

impl TextProps {
    pub fn from_appearance(appearance: &AppearanceSettings) -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            font_size: appearance.font_size,
            font_color: appearance.text_color.clone(),
            font_family: appearance.font_family.clone(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            text_align: TextAlign::Left,
            left: 200.0,
            top: 200.0,
        }
    }

    fn content(&self, editing: bool) -> TextContent {
        TextContent {
            text: self.text.clone(),
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            font_weight: self.font_weight,
            font_style: self.font_style,
            underline: self.underline,
            align: self.text_align,
            editing,
            selection: None,
        }
    }

    fn style(&self) -> Style {
        Style {
            fill: Some(self.font_color.clone()),
            ..Style::default()
        }
    }
}

impl Default for TextProps {
    fn default() -> Self {
        Self::from_appearance(&AppearanceSettings::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_color: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub underline: Option<bool>,
    pub text_align: Option<TextAlign>,
    pub left: Option<f64>,
    pub top: Option<f64>,
}

impl TextPatch {
    pub fn apply_to(self, props: &mut TextProps) {
        if let Some(text) = self.text {
            props.text = text;
        }
        if let Some(size) = self.font_size {
            props.font_size = size;
        }
        if let Some(color) = self.font_color {
            props.font_color = color;
        }
        if let Some(family) = self.font_family {
            props.font_family = family;
        }
        if let Some(weight) = self.font_weight {
            props.font_weight = weight;
        }
        if let Some(style) = self.font_style {
            props.font_style = style;
        }
        if let Some(underline) = self.underline {
            props.underline = underline;
        }
        if let Some(align) = self.text_align {
            props.text_align = align;
        }
        if let Some(left) = self.left {
            props.left = left;
        }
        if let Some(top) = self.top {
            props.top = top;
        }
    }
}

#[derive(Debug)]
pub struct TextElement {
    base: ElementBase,
    props: TextProps,
    body: Option<PrimitiveId>,
}

impl TextElement {
    pub fn create(
        scene: &mut dyn SceneGraph,
        ctx: ElementContext,
        id: ElementId,
        props: TextProps,
    ) -> Result<Self> {
        let body = Primitive::text(props.content(false), props.left, props.top)
            .with_style(props.style())
            .with_interactivity(Interactivity::INTERACTIVE);
        let body = scene.add_primitive(body);
        scene.request_render();
        tracing::debug!("Created text {} at ({}, {})", id, props.left, props.top);

        Ok(Self {
            base: ElementBase::new(id, ElementKind::Text, ctx),
            props,
            body: Some(body),
        })
    }

    pub fn base(&self) -> &ElementBase {
        &self.base
    }

    pub fn props(&self) -> &TextProps {
        &self.props
    }

    pub fn body(&self) -> Option<PrimitiveId> {
        self.body
    }

    pub fn text(&self) -> &str {
        &self.props.text
    }

    /// Inline editing is active.
    pub fn is_editing(&self) -> bool {
        self.base.is_edit_mode()
    }

    pub fn owned_primitives(&self) -> Vec<OwnedPrimitive> {
        self.body
            .map(|id| OwnedPrimitive::new(id, PrimitiveRole::Body))
            .into_iter()
            .collect()
    }

    pub fn resolved_props(&self, scene: &dyn SceneGraph) -> TextProps {
        let mut props = self.props.clone();
        if let Some(body) = self.body.and_then(|id| scene.world_primitive(id)) {
            props.left = body.placement.left;
            props.top = body.placement.top;
            if let PrimitiveShape::Text(content) = &body.shape {
                props.text = content.text.clone();
            }
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
        if self.is_editing() == enabled {
            return Ok(());
        }

        if enabled {
            if let Some(body) = self.body {
                scene.detach_from_group(body);
                scene.set_active(&[body]);
            }
            self.with_content(scene, |content| {
                content.editing = true;
                content.selection = Some((0, content.char_count()));
            });
        } else {
            let mut committed = None;
            self.with_content(scene, |content| {
                content.editing = false;
                content.selection = None;
                committed = Some(content.text.clone());
            });
            if let Some(text) = committed {
                self.props.text = text;
            }
        }

        self.base.set_edit_mode_flag(enabled);
        scene.request_render();
        tracing::debug!(
            "Text {} editing {}",
            self.base.id(),
            if enabled { "started" } else { "finished" }
        );
        self.base.publish(EditorEvent::Editing(EditingEvent::ModeChanged {
            id: self.base.id(),
            enabled,
        }));
        if !enabled {
            self.base.notify_update();
        }
        Ok(())
    }

    /// Replace the text programmatically.
    pub fn set_text(&mut self, scene: &mut dyn SceneGraph, text: impl Into<String>) -> Result<()> {
        self.base.ensure_alive()?;
        let text = text.into();
        self.with_content(scene, |content| {
            content.text = text.clone();
            content.selection = None;
        });
        self.props.text = text;
        scene.request_render();
        self.base.notify_update();
        Ok(())
    }

    /// Content typed into the body while editing.
    pub fn on_text_changed(&mut self, scene: &mut dyn SceneGraph, text: &str) {
        if self.base.is_destroyed() {
            return;
        }
        self.with_content(scene, |content| {
            if content.text != text {
                content.text = text.to_string();
            }
        });
        self.props.text = text.to_string();
        self.base.notify_update();
    }

    /// Copy the body's position into the properties.
    pub fn sync_from_body(&mut self, scene: &dyn SceneGraph) {
        if let Some(body) = self.body.and_then(|id| scene.world_primitive(id)) {
            self.props.left = body.placement.left;
            self.props.top = body.placement.top;
        }
    }

    pub fn update(&mut self, scene: &mut dyn SceneGraph, patch: TextPatch) -> Result<()> {
        self.base.ensure_alive()?;
        self.sync_from_body(scene);

        patch.apply_to(&mut self.props);

        let editing = self.is_editing();
        let content = self.props.content(editing);
        let style = self.props.style();
        let (left, top) = (self.props.left, self.props.top);
        if let Some(body) = self.body_mut(scene) {
            body.shape = PrimitiveShape::Text(content);
            body.style = style;
            body.placement.left = left;
            body.placement.top = top;
        }
        scene.request_render();
        self.base.notify_update();
        Ok(())
    }

    pub fn destroy(&mut self, scene: &mut dyn SceneGraph) {
        if self.base.is_destroyed() {
            return;
        }
        if let Some(body) = self.body.take() {
            scene.remove_primitive(body);
        }
        scene.request_render();
        self.base.mark_destroyed();
        tracing::debug!("Destroyed text {}", self.base.id());
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

    fn with_content(&self, scene: &mut dyn SceneGraph, f: impl FnOnce(&mut TextContent)) {
        if let Some(body) = self.body_mut(scene) {
            if let PrimitiveShape::Text(content) = &mut body.shape {
                f(content);
            }
        }
    }

    /// The body for in-place changes, lifted out of any group first.
    fn body_mut<'s>(&self, scene: &'s mut dyn SceneGraph) -> Option<&'s mut Primitive> {
        let body = self.body?;
        scene.detach_from_group(body);
        scene.primitive_mut(body)
    }
}
