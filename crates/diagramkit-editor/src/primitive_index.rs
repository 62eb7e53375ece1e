//! Reverse lookup from scene primitives to the elements that own them.
//!
//! Scene events only carry a primitive handle. The index maps that handle to
//! the owning element and the role the primitive plays, so the rendering
//! layer never has to carry references into the editing model.

use diagramkit_core::ElementId;
use std::collections::HashMap;

use crate::element::{OwnedPrimitive, PrimitiveRole};
use crate::scene::PrimitiveId;

/// Owner of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveOwner {
    pub element: ElementId,
    pub role: PrimitiveRole,
}

#[derive(Debug, Default)]
pub struct PrimitiveIndex {
    owners: HashMap<PrimitiveId, PrimitiveOwner>,
    by_element: HashMap<ElementId, Vec<PrimitiveId>>,
}

impl PrimitiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything recorded for `element` with `owned`.
    pub fn sync(&mut self, element: ElementId, owned: &[OwnedPrimitive]) {
        self.remove_element(element);
        if owned.is_empty() {
            return;
        }
        let mut ids = Vec::with_capacity(owned.len());
        for primitive in owned {
            self.owners.insert(
                primitive.id,
                PrimitiveOwner {
                    element,
                    role: primitive.role,
                },
            );
            ids.push(primitive.id);
        }
        self.by_element.insert(element, ids);
    }

    pub fn remove_element(&mut self, element: ElementId) {
        if let Some(ids) = self.by_element.remove(&element) {
            for id in ids {
                self.owners.remove(&id);
            }
        }
    }

    pub fn resolve(&self, primitive: PrimitiveId) -> Option<PrimitiveOwner> {
        self.owners.get(&primitive).copied()
    }

    pub fn primitives_of(&self, element: ElementId) -> &[PrimitiveId] {
        self.by_element
            .get(&element)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of indexed primitives.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn clear(&mut self) {
        self.owners.clear();
        self.by_element.clear();
    }
}
