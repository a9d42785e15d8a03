//! Drag-and-drop resolution.
//!
//! A presentation layer detects the gesture and hands the store a
//! [`DropIntent`]: which items were dragged and where they were released.
//! [`OutlineStore::resolve_drop`] turns that into structural operations.
//!
//! | target | effect |
//! |---|---|
//! | world | each item becomes top-level, appended at the end |
//! | item, [`DropZone::Top`] | each item becomes a child of the target |
//! | item with children, [`DropZone::Bottom`] | same as `Top` |
//! | childless item, [`DropZone::Bottom`] | each item becomes the target's next sibling |
//!
//! When several items are dropped together they keep their relative display
//! order at the destination.

use std::collections::HashSet;

use rig_outliner_core::logging::{span_names, targets};

use crate::error::Result;
use crate::item::ItemId;
use crate::store::OutlineStore;

/// Fraction of an item's height, measured from the bottom, that counts as
/// the bottom zone.
pub const BOTTOM_ZONE_FRACTION: f32 = 0.3;

/// Where within a target item a drag was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    /// Upper part of the item: drop as a child.
    Top,
    /// Lower part of the item: drop as a sibling, if the item has no children.
    Bottom,
}

impl DropZone {
    /// Classifies a release point by its vertical offset into an item of
    /// the given height.
    ///
    /// ```
    /// use rig_outliner::DropZone;
    ///
    /// assert_eq!(DropZone::classify(5.0, 20.0), DropZone::Top);
    /// assert_eq!(DropZone::classify(15.0, 20.0), DropZone::Bottom);
    /// ```
    pub fn classify(offset_y: f32, height: f32) -> Self {
        if height > 0.0 && offset_y >= height * (1.0 - BOTTOM_ZONE_FRACTION) {
            Self::Bottom
        } else {
            Self::Top
        }
    }
}

/// What the dragged items were released onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// An item row, with the zone of that row.
    Item { id: ItemId, zone: DropZone },
    /// Empty space: the world.
    World,
}

/// A completed drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIntent {
    /// Items being dragged.
    pub dropped: Vec<ItemId>,
    /// Where they were released.
    pub target: DropTarget,
}

impl DropIntent {
    /// A drop onto an item.
    pub fn onto(dropped: Vec<ItemId>, target: ItemId, zone: DropZone) -> Self {
        Self {
            dropped,
            target: DropTarget::Item { id: target, zone },
        }
    }

    /// A drop onto empty space.
    pub fn world(dropped: Vec<ItemId>) -> Self {
        Self {
            dropped,
            target: DropTarget::World,
        }
    }
}

/// An item moved by a drop and the parent it ended up under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovedItem {
    pub id: ItemId,
    pub parent: Option<ItemId>,
}

/// Result of resolving a drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropOutcome {
    /// Items that moved, in their new display order.
    pub moved: Vec<MovedItem>,
    /// Items left in place because the target lies inside their subtree.
    pub rejected: Vec<ItemId>,
}

impl DropOutcome {
    /// Returns true if nothing moved.
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty()
    }
}

impl<T> OutlineStore<T> {
    /// Applies a drop.
    ///
    /// Every id in the intent is checked first; an unknown id fails the whole
    /// drop with nothing moved. Items are handled one at a time in display
    /// order. Items whose subtree contains the target are skipped and reported
    /// in [`DropOutcome::rejected`]; the rest still move. An item dropped
    /// together with one of its ancestors travels inside the ancestor's block
    /// when that ancestor moves, and is handled on its own when it does not.
    pub fn resolve_drop(&mut self, intent: &DropIntent) -> Result<DropOutcome> {
        let _span = tracing::debug_span!(target: targets::DROP, span_names::DROP).entered();

        for &id in &intent.dropped {
            self.ensure_exists(id)?;
        }
        if let DropTarget::Item { id, .. } = intent.target {
            self.ensure_exists(id)?;
        }

        let dropped = self.dropped_in_order(&intent.dropped);
        let mut moved: HashSet<ItemId> = HashSet::new();
        let mut outcome = DropOutcome::default();

        let (target, zone) = match intent.target {
            DropTarget::World => {
                for id in dropped {
                    if self.has_ancestor_in(id, &moved) {
                        continue;
                    }
                    self.reparent(id, None)?;
                    moved.insert(id);
                    outcome.moved.push(MovedItem { id, parent: None });
                }
                tracing::debug!(target: targets::DROP, moved = outcome.moved.len(), "dropped onto world");
                return Ok(outcome);
            }
            DropTarget::Item { id, zone } => (id, zone),
        };

        let as_child = zone == DropZone::Top || self.has_children(target)?;
        let new_parent = if as_child {
            Some(target)
        } else {
            self.parent(target)?
        };

        let mut previous: Option<ItemId> = None;
        for id in dropped {
            if self.has_ancestor_in(id, &moved) {
                continue;
            }
            if self.is_in_subtree(id, target) {
                tracing::warn!(
                    target: targets::DROP,
                    ?id,
                    ?target,
                    "drop rejected: target is inside the dragged item"
                );
                outcome.rejected.push(id);
                continue;
            }

            self.reparent(id, new_parent)?;
            match (as_child, previous) {
                (true, None) => {}
                (_, Some(prev)) => self.move_under(id, prev)?,
                (false, None) => self.move_under(id, target)?,
            }
            moved.insert(id);
            outcome.moved.push(MovedItem {
                id,
                parent: new_parent,
            });
            previous = Some(id);
        }

        tracing::debug!(
            target: targets::DROP,
            ?target,
            ?zone,
            as_child,
            moved = outcome.moved.len(),
            rejected = outcome.rejected.len(),
            "drop resolved"
        );
        Ok(outcome)
    }

    /// Dropped ids, deduplicated, in display order.
    fn dropped_in_order(&self, dropped: &[ItemId]) -> Vec<ItemId> {
        let dropped: HashSet<ItemId> = dropped.iter().copied().collect();
        self.display_order()
            .iter()
            .copied()
            .filter(|id| dropped.contains(id))
            .collect()
    }

    /// Returns true if any current ancestor of `id` is in `set`.
    fn has_ancestor_in(&self, id: ItemId, set: &HashSet<ItemId>) -> bool {
        let mut ancestor = self.get(id).and_then(|item| item.parent());
        while let Some(current) = ancestor {
            if set.contains(&current) {
                return true;
            }
            ancestor = self.get(current).and_then(|item| item.parent());
        }
        false
    }
}
