//! Selection model for the outline.
//!
//! [`Selection`] is an ordered set of item ids: every id appears at most once
//! and the order in which items were selected is kept, because the first
//! selected item anchors shift-click range extension.
//!
//! # Click semantics
//!
//! | modifier | effect |
//! |---|---|
//! | [`ClickModifier::None`] | selection becomes exactly the clicked item (or empty for a click on empty space) |
//! | [`ClickModifier::Ctrl`] | toggles the clicked item, leaving the others in place |
//! | [`ClickModifier::Shift`] | selects the display-order range from the anchor to the clicked item |
//!
//! The store validates the clicked id before the selection sees it; this
//! module only works with ids and a display order.

use std::collections::HashSet;

use rig_outliner_core::logging::targets;

use crate::item::ItemId;

/// Keyboard modifier held during a click. Modifiers are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickModifier {
    /// Plain click: replace the selection.
    #[default]
    None,
    /// Ctrl+click: toggle membership.
    Ctrl,
    /// Shift+click: extend a range from the anchor.
    Shift,
}

/// Ordered set of selected item ids.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Set of selected ids for O(1) lookup.
    selected_ids: HashSet<ItemId>,

    /// Selected ids in selection order.
    ordered: Vec<ItemId>,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if an item is selected.
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selected_ids.contains(&id)
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Returns the number of selected items.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Selected ids in the order they were selected.
    pub fn ids(&self) -> &[ItemId] {
        &self.ordered
    }

    /// The first selected item, which anchors shift-click ranges.
    pub fn anchor(&self) -> Option<ItemId> {
        self.ordered.first().copied()
    }

    /// Clears the selection. Returns true if anything was deselected.
    pub fn clear(&mut self) -> bool {
        if self.ordered.is_empty() {
            return false;
        }
        self.ordered.clear();
        self.selected_ids.clear();
        true
    }

    /// Replaces the selection with `ids`, dropping repeats.
    ///
    /// Returns true if the selection changed.
    pub fn set<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = ItemId>,
    {
        let mut ordered = Vec::new();
        let mut selected_ids = HashSet::new();
        for id in ids {
            if selected_ids.insert(id) {
                ordered.push(id);
            }
        }

        if ordered == self.ordered {
            return false;
        }
        self.ordered = ordered;
        self.selected_ids = selected_ids;
        true
    }

    /// Toggles membership of `id`. Returns true if it is now selected.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if self.selected_ids.remove(&id) {
            self.ordered.retain(|&selected| selected != id);
            false
        } else {
            self.selected_ids.insert(id);
            self.ordered.push(id);
            true
        }
    }

    /// Removes every id for which `keep` returns false.
    ///
    /// Returns the number of ids removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(ItemId) -> bool,
    {
        let before = self.ordered.len();
        self.ordered.retain(|&id| keep(id));
        if self.ordered.len() != before {
            self.selected_ids = self.ordered.iter().copied().collect();
        }
        before - self.ordered.len()
    }

    /// Applies a click to the selection.
    ///
    /// `order` is the current display order and must contain `clicked`.
    /// When `multi_select` is false every click behaves like a plain click.
    /// Returns true if the selection changed.
    pub fn click(
        &mut self,
        clicked: Option<ItemId>,
        modifier: ClickModifier,
        order: &[ItemId],
        multi_select: bool,
    ) -> bool {
        let modifier = if multi_select {
            modifier
        } else {
            ClickModifier::None
        };

        let changed = match (modifier, clicked) {
            (ClickModifier::None, None) => self.clear(),
            (ClickModifier::None, Some(id)) => self.set([id]),
            // Ctrl or shift on empty space leaves the selection alone.
            (ClickModifier::Ctrl | ClickModifier::Shift, None) => false,
            (ClickModifier::Ctrl, Some(id)) => {
                self.toggle(id);
                true
            }
            (ClickModifier::Shift, Some(id)) => self.extend_to(id, order),
        };

        if changed {
            tracing::trace!(
                target: targets::SELECTION,
                ?modifier,
                selected = self.ordered.len(),
                "selection changed"
            );
        }
        changed
    }

    /// Selects the display-order range between the anchor and `id`.
    fn extend_to(&mut self, id: ItemId, order: &[ItemId]) -> bool {
        let anchor_pos = self
            .anchor()
            .and_then(|anchor| order.iter().position(|&candidate| candidate == anchor));
        let target_pos = order.iter().position(|&candidate| candidate == id);

        match (anchor_pos, target_pos) {
            (Some(anchor_pos), Some(target_pos)) => {
                let (first, last) = if anchor_pos <= target_pos {
                    (anchor_pos, target_pos)
                } else {
                    (target_pos, anchor_pos)
                };
                self.set(order[first..=last].iter().copied())
            }
            // Nothing to extend from.
            _ => self.set([id]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<ItemId> {
        let mut map = SlotMap::<ItemId, ()>::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_plain_click_replaces() {
        let order = ids(3);
        let mut selection = Selection::new();

        assert!(selection.click(Some(order[0]), ClickModifier::None, &order, true));
        assert!(selection.click(Some(order[2]), ClickModifier::None, &order, true));
        assert_eq!(selection.ids(), &[order[2]]);

        // Same click again is not a change.
        assert!(!selection.click(Some(order[2]), ClickModifier::None, &order, true));
    }

    #[test]
    fn test_click_on_empty_space_clears() {
        let order = ids(2);
        let mut selection = Selection::new();
        selection.set(order.clone());

        assert!(selection.click(None, ClickModifier::None, &order, true));
        assert!(selection.is_empty());
        assert!(!selection.click(None, ClickModifier::None, &order, true));
    }

    #[test]
    fn test_ctrl_toggle() {
        let order = ids(2);
        let (a, b) = (order[0], order[1]);
        let mut selection = Selection::new();

        selection.click(Some(a), ClickModifier::None, &order, true);
        selection.click(Some(b), ClickModifier::Ctrl, &order, true);
        assert_eq!(selection.ids(), &[a, b]);

        selection.click(Some(a), ClickModifier::Ctrl, &order, true);
        assert_eq!(selection.ids(), &[b]);
        assert!(!selection.is_selected(a));
    }

    #[test]
    fn test_shift_range_in_display_order() {
        let order = ids(5);
        let mut selection = Selection::new();

        selection.click(Some(order[3]), ClickModifier::None, &order, true);
        selection.click(Some(order[1]), ClickModifier::Shift, &order, true);
        assert_eq!(selection.ids(), &order[1..=3]);
    }

    #[test]
    fn test_shift_uses_first_selected_as_anchor() {
        let order = ids(5);
        let mut selection = Selection::new();

        selection.click(Some(order[2]), ClickModifier::None, &order, true);
        selection.click(Some(order[0]), ClickModifier::Ctrl, &order, true);
        selection.click(Some(order[4]), ClickModifier::Shift, &order, true);
        assert_eq!(selection.ids(), &order[2..=4]);
    }

    #[test]
    fn test_shift_without_selection_acts_as_plain() {
        let order = ids(3);
        let mut selection = Selection::new();

        selection.click(Some(order[1]), ClickModifier::Shift, &order, true);
        assert_eq!(selection.ids(), &[order[1]]);
    }

    #[test]
    fn test_modifiers_ignored_without_multi_select() {
        let order = ids(3);
        let mut selection = Selection::new();

        selection.click(Some(order[0]), ClickModifier::None, &order, false);
        selection.click(Some(order[2]), ClickModifier::Shift, &order, false);
        assert_eq!(selection.ids(), &[order[2]]);

        selection.click(Some(order[1]), ClickModifier::Ctrl, &order, false);
        assert_eq!(selection.ids(), &[order[1]]);
    }

    #[test]
    fn test_set_drops_repeats_and_retain_prunes() {
        let order = ids(3);
        let mut selection = Selection::new();

        selection.set([order[1], order[0], order[1]]);
        assert_eq!(selection.ids(), &[order[1], order[0]]);

        let removed = selection.retain(|id| id != order[1]);
        assert_eq!(removed, 1);
        assert_eq!(selection.ids(), &[order[0]]);
        assert!(!selection.is_selected(order[1]));
    }
}
