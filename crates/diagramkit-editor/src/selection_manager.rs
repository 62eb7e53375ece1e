use diagramkit_core::ElementId;

/// Tracks which elements are selected and in what order.
///
/// `SelectionManager` is responsible for:
/// - Remembering the selected element ids in the order they were selected
/// - Deciding which element is the "primary" selection
/// - Single-select (replace) and multi-select (toggle) operations
///
/// # Selection Model
///
/// - **Primary Selection**: Only defined while exactly one element is selected.
///   Property panels and node editing act on the primary element.
/// - **Multiple Selection**: Any number of elements may be selected at once;
///   with more than one there is no primary element.
/// - **Multi-select**: Holding the modifier toggles an element without touching
///   the rest of the selection.
///
/// # Design
///
/// The manager only keeps ids. The session updates the elements' own
/// `selected` flags and the scene's active set alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    /// Selected ids, oldest first
    selected: Vec<ElementId>,
}

impl SelectionManager {
    /// Creates a new `SelectionManager` with no selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagramkit_editor::selection_manager::SelectionManager;
    ///
    /// let manager = SelectionManager::new();
    /// assert!(manager.is_empty());
    /// assert_eq!(manager.primary(), None);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the primary selected element.
    ///
    /// # Returns
    ///
    /// `Some(id)` if exactly one element is selected, `None` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagramkit_core::ElementId;
    /// use diagramkit_editor::selection_manager::SelectionManager;
    ///
    /// let (a, b) = (ElementId::new(), ElementId::new());
    /// let mut manager = SelectionManager::new();
    /// manager.select_only(a);
    /// assert_eq!(manager.primary(), Some(a));
    ///
    /// manager.toggle(b);
    /// assert_eq!(manager.primary(), None);
    /// ```
    pub fn primary(&self) -> Option<ElementId> {
        match self.selected.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Replaces the whole selection with `id`.
    ///
    /// # Returns
    ///
    /// The ids that were selected before and are no longer selected.
    pub fn select_only(&mut self, id: ElementId) -> Vec<ElementId> {
        let dropped = self
            .selected
            .iter()
            .copied()
            .filter(|selected| *selected != id)
            .collect();
        self.selected = vec![id];
        dropped
    }

    /// Adds `id` if it is not selected, removes it if it is.
    ///
    /// # Returns
    ///
    /// `true` if `id` is selected afterwards.
    pub fn toggle(&mut self, id: ElementId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.selected.push(id);
            true
        }
    }

    /// Replaces the selection with `ids`, dropping duplicates.
    ///
    /// # Returns
    ///
    /// The ids that were selected before and are not part of `ids`.
    pub fn set(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let dropped = self
            .selected
            .iter()
            .copied()
            .filter(|selected| !ids.contains(selected))
            .collect();
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(id) {
                self.selected.push(*id);
            }
        }
        dropped
    }

    /// Removes `id` from the selection.
    ///
    /// # Returns
    ///
    /// `true` if it was selected.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|selected| *selected != id);
        self.selected.len() != before
    }

    /// Clears the selection and returns what was selected.
    pub fn clear(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.selected)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids, oldest first.
    pub fn selected(&self) -> &[ElementId] {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
