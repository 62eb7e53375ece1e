//! In-memory scene graph.
//!
//! Keeps primitives in z-order and answers hit tests. The gesture methods
//! (`translate`, `scale_by`, `rotate_by`, ...) change a primitive's placement
//! the way a user dragging its controls would, which makes the editing model
//! testable without a renderer.

use std::collections::HashMap;

use super::primitive::{Primitive, PrimitiveId, PrimitiveShape};
use super::SceneGraph;
use crate::geometry::Point;
use crate::transform::{Affine, Placement};

#[derive(Debug, Default)]
pub struct RetainedScene {
    primitives: HashMap<PrimitiveId, Primitive>,
    /// Bottom to top
    order: Vec<PrimitiveId>,
    active: Vec<PrimitiveId>,
    next_id: u64,
    render_requests: u64,
}

impl RetainedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of render requests received so far.
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    /// Stacking position, 0 being the bottom.
    pub fn z_index(&self, id: PrimitiveId) -> Option<usize> {
        self.order.iter().position(|p| *p == id)
    }

    /// Drag so that the placement origin lands on `to`.
    pub fn move_to(&mut self, id: PrimitiveId, to: Point) -> bool {
        self.with_placement(id, |placement| {
            placement.left = to.x;
            placement.top = to.y;
        })
    }

    /// Drag by `(dx, dy)`.
    pub fn translate(&mut self, id: PrimitiveId, dx: f64, dy: f64) -> bool {
        self.with_placement(id, |placement| {
            placement.left += dx;
            placement.top += dy;
        })
    }

    /// Scale around the placement origin, like pulling the far corner handle.
    pub fn scale_by(&mut self, id: PrimitiveId, sx: f64, sy: f64) -> bool {
        self.with_placement(id, |placement| {
            placement.scale_x *= sx;
            placement.scale_y *= sy;
        })
    }

    /// Rotate around the center of the primitive's world bounds.
    pub fn rotate_by(&mut self, id: PrimitiveId, degrees: f64) -> bool {
        let Some(center) = self
            .primitives
            .get(&id)
            .and_then(|p| p.world_bounds())
            .map(|b| b.center())
        else {
            return false;
        };
        self.apply_transform(id, &Affine::rotation_about(degrees, center))
    }

    /// Apply `transform` in world space on top of the current placement.
    pub fn apply_transform(&mut self, id: PrimitiveId, transform: &Affine) -> bool {
        self.with_placement(id, |placement| {
            let matrix = transform.multiply(&placement.matrix());
            *placement = Placement::from_matrix(&matrix);
        })
    }

    pub fn set_placement(&mut self, id: PrimitiveId, placement: Placement) -> bool {
        self.with_placement(id, |current| *current = placement)
    }

    fn with_placement(&mut self, id: PrimitiveId, f: impl FnOnce(&mut Placement)) -> bool {
        match self.primitives.get_mut(&id) {
            Some(primitive) => {
                f(&mut primitive.placement);
                tracing::trace!("Primitive {} placed at {:?}", id, primitive.placement);
                true
            }
            None => false,
        }
    }

    /// Top-level group holding `member` at any depth.
    fn group_of(&self, member: PrimitiveId) -> Option<PrimitiveId> {
        self.order.iter().copied().find(|id| {
            self.primitives
                .get(id)
                .is_some_and(|group| holds(group, member))
        })
    }

    fn allocate_id(&mut self) -> PrimitiveId {
        self.next_id += 1;
        PrimitiveId::from_raw(self.next_id)
    }
}

impl SceneGraph for RetainedScene {
    fn add_primitive(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = self.allocate_id();
        self.primitives.insert(id, primitive);
        self.order.push(id);
        id
    }

    fn remove_primitive(&mut self, id: PrimitiveId) -> Option<Primitive> {
        self.detach_from_group(id);
        let primitive = self.primitives.remove(&id)?;
        self.order.retain(|p| *p != id);
        self.active.retain(|p| *p != id);
        Some(primitive)
    }

    fn restore_primitive(&mut self, id: PrimitiveId, primitive: Primitive) {
        if self.primitives.insert(id, primitive).is_none() {
            self.order.push(id);
        }
        self.next_id = self.next_id.max(id.raw());
    }

    fn replace_primitive(&mut self, old: PrimitiveId, primitive: Primitive) -> PrimitiveId {
        self.detach_from_group(old);
        let id = self.allocate_id();
        self.primitives.insert(id, primitive);
        match self.order.iter().position(|p| *p == old) {
            Some(slot) => {
                self.primitives.remove(&old);
                self.order[slot] = id;
                for active in self.active.iter_mut() {
                    if *active == old {
                        *active = id;
                    }
                }
            }
            None => self.order.push(id),
        }
        id
    }

    fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.get_mut(&id)
    }

    fn world_primitive(&self, id: PrimitiveId) -> Option<Primitive> {
        if let Some(primitive) = self.primitives.get(&id) {
            return Some(primitive.clone());
        }
        let group = self.primitives.get(&self.group_of(id)?)?;
        resolve_member(group, &Affine::IDENTITY, id)
    }

    fn detach_from_group(&mut self, id: PrimitiveId) -> bool {
        let Some(group_id) = self.group_of(id) else {
            return false;
        };
        let Some(group) = self.primitives.get_mut(&group_id) else {
            return false;
        };
        let group_matrix = group.matrix();
        let PrimitiveShape::Group { members } = &mut group.shape else {
            return false;
        };
        let Some(position) = members.iter().position(|(m, _)| *m == id) else {
            // Nested deeper: lift the enclosing subgroup first, then retry
            let Some(subgroup) = members
                .iter()
                .find(|(_, member)| holds(member, id))
                .map(|(m, _)| *m)
            else {
                return false;
            };
            return self.detach_from_group(subgroup) && self.detach_from_group(id);
        };
        let (_, mut member) = members.remove(position);
        let emptied = members.is_empty();
        member.placement = Placement::from_matrix(&group_matrix.multiply(&member.matrix()));

        self.primitives.insert(id, member);
        self.next_id = self.next_id.max(id.raw());
        let slot = self.z_index(group_id).map_or(self.order.len(), |z| z + 1);
        self.order.insert(slot, id);
        if emptied {
            self.primitives.remove(&group_id);
            self.order.retain(|p| *p != group_id);
            self.active.retain(|p| *p != group_id);
        }
        tracing::debug!("Detached {} from group {}", id, group_id);
        true
    }

    fn primitive_ids(&self) -> Vec<PrimitiveId> {
        self.order.clone()
    }

    fn bring_to_front(&mut self, id: PrimitiveId) {
        if let Some(slot) = self.z_index(id) {
            self.order.remove(slot);
            self.order.push(id);
        }
    }

    fn send_to_back(&mut self, id: PrimitiveId) {
        if let Some(slot) = self.z_index(id) {
            self.order.remove(slot);
            self.order.insert(0, id);
        }
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn active_primitives(&self) -> Vec<PrimitiveId> {
        self.active.clone()
    }

    fn set_active(&mut self, ids: &[PrimitiveId]) {
        self.active = ids
            .iter()
            .copied()
            .filter(|id| {
                self.primitives
                    .get(id)
                    .is_some_and(|p| p.interactivity.selectable)
            })
            .collect();
    }

    fn clear_active(&mut self) {
        self.active.clear();
    }

    fn hit_test(&self, point: Point) -> Option<PrimitiveId> {
        self.order.iter().rev().copied().find(|id| {
            self.primitives
                .get(id)
                .is_some_and(|p| p.interactivity.evented && p.contains_point(point))
        })
    }
}

fn holds(primitive: &Primitive, member: PrimitiveId) -> bool {
    match &primitive.shape {
        PrimitiveShape::Group { members } => members
            .iter()
            .any(|(id, nested)| *id == member || holds(nested, member)),
        _ => false,
    }
}

/// `member` with every enclosing placement from `group` down folded in.
fn resolve_member(group: &Primitive, outer: &Affine, member: PrimitiveId) -> Option<Primitive> {
    let PrimitiveShape::Group { members } = &group.shape else {
        return None;
    };
    let matrix = outer.multiply(&group.matrix());
    members.iter().find_map(|(id, nested)| {
        if *id == member {
            let mut resolved = nested.clone();
            resolved.placement = Placement::from_matrix(&matrix.multiply(&nested.matrix()));
            Some(resolved)
        } else {
            resolve_member(nested, &matrix, member)
        }
    })
}
