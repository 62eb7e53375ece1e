//! Scene graph boundary.
//!
//! The scene owns pixels, pointer tracking and transforms. Elements only
//! talk to it through [`SceneGraph`]; the host forwards what the scene
//! reports back to the editor session as [`SceneEvent`]s.

mod primitive;
mod retained;

pub use primitive::{
    FontStyle, FontWeight, Interactivity, Primitive, PrimitiveId, PrimitiveShape, Style, TextAlign,
    TextContent,
};
pub use retained::RetainedScene;

use crate::geometry::Point;

/// Commands the editing model issues to the rendering layer.
pub trait SceneGraph {
    /// Add on top of the stack and return the new handle.
    fn add_primitive(&mut self, primitive: Primitive) -> PrimitiveId;

    /// Remove and return the primitive; `None` if it is not on the scene.
    fn remove_primitive(&mut self, id: PrimitiveId) -> Option<Primitive>;

    /// Put a previously removed primitive back on top under its old handle.
    fn restore_primitive(&mut self, id: PrimitiveId, primitive: Primitive);

    /// Swap `old` for a freshly constructed primitive at the same stacking
    /// position. Falls back to adding on top when `old` is gone.
    fn replace_primitive(&mut self, old: PrimitiveId, primitive: Primitive) -> PrimitiveId;

    fn primitive(&self, id: PrimitiveId) -> Option<&Primitive>;

    fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive>;

    /// Copy of `id` as it appears on screen, with the placement of any
    /// enclosing group folded in. Also finds group members.
    fn world_primitive(&self, id: PrimitiveId) -> Option<Primitive> {
        self.primitive(id).cloned()
    }

    /// Lift a group member back to the top level, directly above its group,
    /// keeping its on-screen placement. A group left empty is removed.
    /// Returns false when `id` is not inside a group.
    fn detach_from_group(&mut self, id: PrimitiveId) -> bool;

    fn contains(&self, id: PrimitiveId) -> bool {
        self.primitive(id).is_some()
    }

    /// Handles bottom to top.
    fn primitive_ids(&self) -> Vec<PrimitiveId>;

    fn bring_to_front(&mut self, id: PrimitiveId);

    fn send_to_back(&mut self, id: PrimitiveId);

    fn request_render(&mut self);

    fn active_primitives(&self) -> Vec<PrimitiveId>;

    fn set_active(&mut self, ids: &[PrimitiveId]);

    fn clear_active(&mut self);

    /// Top-most evented primitive under `point`.
    fn hit_test(&self, point: Point) -> Option<PrimitiveId>;
}

/// Pointer and text events reported by the scene, forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Pointer pressed; `target` is `None` on empty canvas. `additive` is
    /// set while the multi-select modifier is held.
    MouseDown {
        target: Option<PrimitiveId>,
        additive: bool,
    },
    /// A primitive is being dragged; its placement already reflects the move.
    Moving { target: PrimitiveId },
    /// A primitive is being scaled through its controls.
    Scaling { target: PrimitiveId },
    /// A drag, scale or rotate gesture finished.
    Modified { target: PrimitiveId },
    /// Double click; `target` is `None` on empty canvas.
    DoubleClick {
        target: Option<PrimitiveId>,
        position: Point,
    },
    /// Inline text editing changed the content.
    TextChanged { target: PrimitiveId, text: String },
    /// Inline text editing ended.
    EditingExited { target: PrimitiveId },
}

/// Keyboard commands the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Delete or Backspace
    Delete,
    Escape,
}
