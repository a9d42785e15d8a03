//! The outline store: a forest kept as a flat, contiguously ordered sequence.
//!
//! The hierarchy lives in each item's `parent` link. Alongside it the store
//! keeps `order`, the display sequence, in which every item is immediately
//! followed by all of its descendants (pre-order). Every structural operation
//! updates the parent link and moves the affected block of `order` within the
//! same call, so the two never disagree once the call returns.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use rig_outliner_core::logging::targets;
use slotmap::SlotMap;

use crate::config::OutlinerConfig;
use crate::error::{InvariantViolation, OutlineError, Result};
use crate::item::{Item, ItemId, OutlineRow};
use crate::naming::unique_label;
use crate::selection::{ClickModifier, Selection};

/// Where a relocated block lands in the display order.
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// After the last item in the outline.
    End,
    /// Directly after the given item, ahead of its existing children.
    FirstChildOf(ItemId),
    /// Directly after the given item's whole subtree.
    AfterSubtreeOf(ItemId),
}

/// Ordered hierarchical item list with a selection.
///
/// `OutlineStore` is single-threaded and synchronous; wrap it in an
/// [`Outliner`](crate::Outliner) to share it and receive change signals.
///
/// # Example
///
/// ```
/// use rig_outliner::{ClickModifier, OutlineStore};
///
/// let mut store = OutlineStore::new();
/// let spine = store.add_item("spine", None, ());
/// let arm = store.add_item("arm", Some("arm_icon"), ());
/// let hand = store.add_item("hand", None, ());
///
/// store.reparent(hand, Some(arm)).unwrap();
/// store.reparent(arm, Some(spine)).unwrap();
/// assert_eq!(store.display_order(), &[spine, arm, hand]);
/// assert_eq!(store.depth(hand).unwrap(), 2);
///
/// store.click(Some(arm), ClickModifier::None).unwrap();
/// let removed = store.remove_selected();
/// assert_eq!(removed.len(), 2);
/// assert_eq!(store.display_order(), &[spine]);
/// ```
#[derive(Debug, Clone)]
pub struct OutlineStore<T> {
    items: SlotMap<ItemId, Item<T>>,
    order: Vec<ItemId>,
    selection: Selection,
    config: OutlinerConfig,
}

impl<T> Default for OutlineStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OutlineStore<T> {
    /// Creates an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(OutlinerConfig::default())
    }

    /// Creates an empty store with the given configuration.
    pub fn with_config(config: OutlinerConfig) -> Self {
        Self {
            items: SlotMap::with_key(),
            order: Vec::new(),
            selection: Selection::new(),
            config,
        }
    }

    /// The store's configuration.
    pub fn config(&self) -> &OutlinerConfig {
        &self.config
    }

    /// Mutable access to the configuration. Takes effect on the next call.
    pub fn config_mut(&mut self) -> &mut OutlinerConfig {
        &mut self.config
    }

    // =========================================================================
    // Basic queries
    // =========================================================================

    /// Number of items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the outline holds no items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns true if `id` names a current item.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Looks up an item.
    pub fn get(&self, id: ItemId) -> Option<&Item<T>> {
        self.items.get(id)
    }

    /// The payload of an item.
    pub fn payload(&self, id: ItemId) -> Option<&T> {
        self.items.get(id).map(Item::payload)
    }

    /// Mutable access to an item's payload.
    pub fn payload_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.items.get_mut(id).map(|item| &mut item.payload)
    }

    /// The label of an item.
    pub fn label(&self, id: ItemId) -> Option<&str> {
        self.items.get(id).map(Item::label)
    }

    /// All item ids in display order.
    ///
    /// This is the only order presentation layers should draw in.
    pub fn display_order(&self) -> &[ItemId] {
        &self.order
    }

    /// All payloads in display order.
    pub fn payloads(&self) -> Vec<&T> {
        self.order
            .iter()
            .filter_map(|&id| self.payload(id))
            .collect()
    }

    /// Position of an item in the display order.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|&candidate| candidate == id)
    }

    /// Parent of an item, `None` for a top-level item.
    pub fn parent(&self, id: ItemId) -> Result<Option<ItemId>> {
        Ok(self.item(id)?.parent)
    }

    /// Number of ancestors between an item and the world.
    pub fn depth(&self, id: ItemId) -> Result<usize> {
        let mut depth = 0;
        let mut current = self.item(id)?.parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.items.get(parent).and_then(|item| item.parent);
        }
        Ok(depth)
    }

    /// Direct children of an item, in display order.
    pub fn children(&self, id: ItemId) -> Result<Vec<ItemId>> {
        self.ensure_exists(id)?;
        Ok(self.children_of(Some(id)))
    }

    /// Items with no parent, in display order.
    pub fn top_level(&self) -> Vec<ItemId> {
        self.children_of(None)
    }

    /// Returns true if the item has at least one child.
    pub fn has_children(&self, id: ItemId) -> Result<bool> {
        self.ensure_exists(id)?;
        Ok(self
            .items
            .values()
            .any(|item| item.parent == Some(id)))
    }

    /// All transitive descendants of an item, in display order.
    ///
    /// Derived from parent links, not from positions in the display order.
    pub fn descendants(&self, id: ItemId) -> Result<Vec<ItemId>> {
        self.ensure_exists(id)?;
        let children = self.child_index();
        let mut out = Vec::new();
        collect_descendants(&children, id, &mut out);
        Ok(out)
    }

    /// Returns true if `candidate` is `root` or one of its descendants.
    pub fn is_in_subtree(&self, root: ItemId, candidate: ItemId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.items.get(id).and_then(|item| item.parent);
        }
        false
    }

    /// Rows for rendering, in display order.
    pub fn rows(&self) -> Vec<OutlineRow> {
        let mut depths: HashMap<ItemId, usize> = HashMap::with_capacity(self.order.len());
        let icon_size = self.config.icon_size.pixels();

        self.order
            .iter()
            .filter_map(|&id| {
                let item = self.items.get(id)?;
                let (depth, parent_label) = match item.parent {
                    Some(parent) => (
                        depths.get(&parent).map_or(0, |depth| depth + 1),
                        self.label(parent).unwrap_or_default().to_string(),
                    ),
                    None => (0, self.config.world_label.clone()),
                };
                depths.insert(id, depth);

                Some(OutlineRow {
                    id,
                    label: item.label.clone(),
                    icon_key: item.icon_key.clone(),
                    parent: item.parent,
                    parent_label,
                    depth,
                    indent: u32::try_from(depth)
                        .unwrap_or(u32::MAX)
                        .saturating_mul(self.config.indent_width),
                    icon_size,
                    selected: self.selection.is_selected(id),
                })
            })
            .collect()
    }

    // =========================================================================
    // Structural operations
    // =========================================================================

    /// Adds a top-level item at the end of the display order.
    ///
    /// Labels need not be unique unless the configuration asks for it.
    pub fn add_item(&mut self, label: &str, icon_key: Option<&str>, payload: T) -> ItemId {
        let label = self.resolve_label(None, label, self.config.unique_labels);
        assert_eq!(
            self.order.len(),
            self.items.len(),
            "outline display order out of sync with item table"
        );

        let id = self
            .items
            .insert(Item::new(label, icon_key.map(str::to_string), payload));
        self.order.push(id);

        tracing::debug!(target: targets::STORE, ?id, position = self.order.len() - 1, "item added");
        self.debug_validate();
        id
    }

    /// Moves an item, with its whole subtree, under a new parent.
    ///
    /// With `Some(parent)` the block lands directly after the parent, as its
    /// first child. With `None` the item becomes top-level and its block
    /// moves to the end of the display order. The descendants keep their
    /// relative order. The selection is not touched.
    ///
    /// # Errors
    ///
    /// - [`OutlineError::NotFound`] if either id is unknown.
    /// - [`OutlineError::Cycle`] if `new_parent` is the item or one of its
    ///   descendants.
    pub fn reparent(&mut self, id: ItemId, new_parent: Option<ItemId>) -> Result<()> {
        self.ensure_exists(id)?;
        let placement = match new_parent {
            Some(parent) => {
                self.ensure_exists(parent)?;
                if self.is_in_subtree(id, parent) {
                    return Err(OutlineError::cycle(id, parent));
                }
                Placement::FirstChildOf(parent)
            }
            None => Placement::End,
        };

        self.relocate_block(id, placement)?;
        if let Some(item) = self.items.get_mut(id) {
            item.parent = new_parent;
        }

        tracing::debug!(target: targets::STORE, ?id, ?new_parent, "item reparented");
        self.debug_validate();
        Ok(())
    }

    /// Moves an item's block to directly follow `target`'s subtree, keeping
    /// the item's parent.
    ///
    /// This makes the item the next sibling of `target`. For a childless
    /// target the block lands immediately after it.
    ///
    /// # Errors
    ///
    /// - [`OutlineError::NotFound`] if either id is unknown.
    /// - [`OutlineError::NotSibling`] if the two items have different parents.
    pub fn move_under(&mut self, id: ItemId, target: ItemId) -> Result<()> {
        let item_parent = self.item(id)?.parent;
        let target_parent = self.item(target)?.parent;
        if id == target {
            return Ok(());
        }
        if item_parent != target_parent {
            return Err(OutlineError::NotSibling { item: id, target });
        }

        self.relocate_block(id, Placement::AfterSubtreeOf(target))?;

        tracing::debug!(target: targets::STORE, ?id, ?target, "item moved");
        self.debug_validate();
        Ok(())
    }

    /// Sets an item's label and returns the label actually applied.
    ///
    /// With `enforce_unique`, a label that collides with another item's is
    /// given a numeric suffix (see [`crate::naming`]).
    pub fn rename(&mut self, id: ItemId, new_label: &str, enforce_unique: bool) -> Result<String> {
        self.ensure_exists(id)?;
        let label = self.resolve_label(Some(id), new_label, enforce_unique);
        if let Some(item) = self.items.get_mut(id) {
            item.label.clone_from(&label);
        }
        tracing::debug!(target: targets::STORE, ?id, %label, "item renamed");
        Ok(label)
    }

    /// Removes items and all their descendants.
    ///
    /// All ids are checked first; on error nothing is removed. Removed ids
    /// are pruned from the selection, the rest of it is kept. Returns the
    /// removed items in display order so the payload owner can release them.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> Result<Vec<(ItemId, Item<T>)>> {
        for &id in ids {
            self.ensure_exists(id)?;
        }
        Ok(self.remove_cascade(ids))
    }

    /// Removes every selected item and all its descendants, whether or not
    /// the descendants were selected, then clears the selection.
    ///
    /// Does nothing if the selection is empty.
    pub fn remove_selected(&mut self) -> Vec<(ItemId, Item<T>)> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        let selected = self.selection.ids().to_vec();
        let removed = self.remove_cascade(&selected);
        self.selection.clear();
        self.debug_validate();
        removed
    }

    /// Removes every item and clears the selection.
    pub fn remove_all(&mut self) -> Vec<(ItemId, Item<T>)> {
        let removed: Vec<_> = self
            .order
            .drain(..)
            .filter_map(|id| self.items.remove(id).map(|item| (id, item)))
            .collect();
        self.items.clear();
        self.selection.clear();

        tracing::debug!(target: targets::STORE, removed = removed.len(), "outline cleared");
        removed
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns true if the item is selected.
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.is_selected(id)
    }

    /// Applies a click. `None` is a click on empty space.
    ///
    /// Returns true if the selection changed.
    pub fn click(&mut self, id: Option<ItemId>, modifier: ClickModifier) -> Result<bool> {
        if let Some(id) = id {
            self.ensure_exists(id)?;
        }
        Ok(self
            .selection
            .click(id, modifier, &self.order, self.config.multi_select))
    }

    /// Replaces the selection. Every id must exist.
    ///
    /// Returns true if the selection changed.
    pub fn set_selection(&mut self, ids: &[ItemId]) -> Result<bool> {
        for &id in ids {
            self.ensure_exists(id)?;
        }
        Ok(self.selection.set(ids.iter().copied()))
    }

    /// Clears the selection. Returns true if anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        self.selection.clear()
    }

    /// Selected ids in display order.
    ///
    /// With `include_descendants`, every descendant of a selected item is
    /// included too, once.
    pub fn selected_ids(&self, include_descendants: bool) -> Vec<ItemId> {
        if !include_descendants {
            return self
                .order
                .iter()
                .copied()
                .filter(|&id| self.selection.is_selected(id))
                .collect();
        }

        let members = self.subtree_members(self.selection.ids());
        self.order
            .iter()
            .copied()
            .filter(|id| members.contains(id))
            .collect()
    }

    /// Payloads of the selected items in display order.
    pub fn selected_payloads(&self, include_descendants: bool) -> Vec<&T> {
        self.selected_ids(include_descendants)
            .into_iter()
            .filter_map(|id| self.payload(id))
            .collect()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Checks every structural invariant in one pass over the display order.
    ///
    /// - each id appears exactly once and names a stored item
    /// - each parent exists and precedes its children
    /// - each item sits inside its parent's contiguous block
    /// - each selected id exists
    pub fn validate(&self) -> std::result::Result<(), InvariantViolation> {
        if self.order.len() != self.items.len() {
            return Err(InvariantViolation::OrderMismatch {
                order: self.order.len(),
                items: self.items.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.order.len());
        // Ancestor chain of the previous item.
        let mut chain: Vec<ItemId> = Vec::new();

        for (position, &id) in self.order.iter().enumerate() {
            if !seen.insert(id) {
                return Err(InvariantViolation::DuplicateId(id));
            }
            let Some(item) = self.items.get(id) else {
                return Err(InvariantViolation::OrderMismatch {
                    order: self.order.len(),
                    items: self.items.len(),
                });
            };

            match item.parent {
                None => chain.clear(),
                Some(parent) => {
                    if !self.items.contains_key(parent) {
                        return Err(InvariantViolation::DanglingParent { item: id, parent });
                    }
                    while chain.last().is_some_and(|&top| top != parent) {
                        chain.pop();
                    }
                    if chain.is_empty() {
                        return Err(InvariantViolation::Discontiguous { item: id, position });
                    }
                }
            }
            chain.push(id);
        }

        if let Some(&stale) = self
            .selection
            .ids()
            .iter()
            .find(|&&id| !self.items.contains_key(id))
        {
            return Err(InvariantViolation::StaleSelection(stale));
        }
        Ok(())
    }

    fn debug_validate(&self) {
        if cfg!(debug_assertions)
            && let Err(violation) = self.validate()
        {
            panic!("outline invariant broken: {violation}");
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn item(&self, id: ItemId) -> Result<&Item<T>> {
        self.items.get(id).ok_or(OutlineError::not_found(id))
    }

    pub(crate) fn ensure_exists(&self, id: ItemId) -> Result<()> {
        self.item(id).map(|_| ())
    }

    pub(crate) fn set_label(&mut self, id: ItemId, label: String) {
        if let Some(item) = self.items.get_mut(id) {
            item.label = label;
        }
    }

    /// The label `wanted` becomes for item `id` (or a new item for `None`).
    pub(crate) fn resolve_label(&self, id: Option<ItemId>, wanted: &str, enforce_unique: bool) -> String {
        if !enforce_unique {
            return wanted.to_string();
        }
        let others = self
            .items
            .iter()
            .filter(|&(other, _)| Some(other) != id)
            .map(|(_, item)| item.label.as_str());
        unique_label(wanted, others)
    }

    /// Parent to children map, children in display order.
    fn child_index(&self) -> HashMap<Option<ItemId>, Vec<ItemId>> {
        let mut index: HashMap<Option<ItemId>, Vec<ItemId>> = HashMap::new();
        for &id in &self.order {
            if let Some(item) = self.items.get(id) {
                index.entry(item.parent).or_default().push(id);
            }
        }
        index
    }

    fn children_of(&self, parent: Option<ItemId>) -> Vec<ItemId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.items.get(id).is_some_and(|item| item.parent == parent))
            .collect()
    }

    /// The given roots plus all their descendants.
    fn subtree_members(&self, roots: &[ItemId]) -> HashSet<ItemId> {
        let children = self.child_index();
        let mut members = HashSet::new();
        for &root in roots {
            if !self.items.contains_key(root) || !members.insert(root) {
                continue;
            }
            let mut descendants = Vec::new();
            collect_descendants(&children, root, &mut descendants);
            members.extend(descendants);
        }
        members
    }

    /// Positions occupied by an item and its descendants.
    fn block_range(&self, id: ItemId) -> Result<Range<usize>> {
        let start = self.position(id).ok_or(OutlineError::not_found(id))?;
        let len = 1 + self.descendants(id)?.len();
        Ok(start..start + len)
    }

    /// Shifts an item's block, as a unit, to `placement`.
    ///
    /// Every lookup happens before the sequence is touched, so an error
    /// leaves the order unchanged.
    fn relocate_block(&mut self, id: ItemId, placement: Placement) -> Result<()> {
        let block = self.block_range(id)?;
        let mut insert_at = match placement {
            Placement::End => self.order.len(),
            Placement::FirstChildOf(parent) => {
                self.position(parent).ok_or(OutlineError::not_found(parent))? + 1
            }
            Placement::AfterSubtreeOf(target) => self.block_range(target)?.end,
        };
        // The target never lies inside the moving block, so anything past
        // its start is past its end too.
        if insert_at > block.start {
            insert_at -= block.len();
        }

        let delta = insert_at as isize - block.start as isize;
        tracing::trace!(target: targets::STORE, ?id, len = block.len(), delta, "shifting block");

        let moved: Vec<ItemId> = self.order.drain(block).collect();
        self.order.splice(insert_at..insert_at, moved);
        Ok(())
    }

    /// Removes roots and descendants, skipping unknown ids.
    fn remove_cascade(&mut self, roots: &[ItemId]) -> Vec<(ItemId, Item<T>)> {
        let doomed = self.subtree_members(roots);
        if doomed.is_empty() {
            return Vec::new();
        }

        let mut removed = Vec::with_capacity(doomed.len());
        let items = &mut self.items;
        self.order.retain(|&id| {
            if !doomed.contains(&id) {
                return true;
            }
            if let Some(item) = items.remove(id) {
                removed.push((id, item));
            }
            false
        });
        let pruned = self.selection.retain(|id| !doomed.contains(&id));

        tracing::debug!(
            target: targets::STORE,
            removed = removed.len(),
            deselected = pruned,
            "items removed"
        );
        self.debug_validate();
        removed
    }
}

fn collect_descendants(
    children: &HashMap<Option<ItemId>, Vec<ItemId>>,
    id: ItemId,
    out: &mut Vec<ItemId>,
) {
    if let Some(kids) = children.get(&Some(id)) {
        for &child in kids {
            out.push(child);
            collect_descendants(children, child, out);
        }
    }
}
