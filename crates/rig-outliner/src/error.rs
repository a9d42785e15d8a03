//! Error types for the outline model.

use crate::item::ItemId;

/// Result type alias for outline operations.
pub type Result<T> = std::result::Result<T, OutlineError>;

/// Recoverable errors returned by outline operations.
///
/// A failed call never leaves the outline half-modified: every id is checked
/// before anything is mutated. Presentation layers usually ignore these and
/// treat the request as a no-op.
#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    /// An id does not name an item currently in the outline.
    #[error("No item with id {id:?} in the outline")]
    NotFound { id: ItemId },

    /// The operation would make an item its own ancestor.
    #[error("Cannot parent {item:?} under {parent:?}: it is the item itself or one of its descendants")]
    Cycle { item: ItemId, parent: ItemId },

    /// `move_under` was asked to move an item next to a non-sibling.
    #[error("Cannot move {item:?} after {target:?}: the items do not share a parent")]
    NotSibling { item: ItemId, target: ItemId },

    /// Configuration text could not be parsed.
    #[error("Invalid outliner configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl OutlineError {
    /// Create a not-found error.
    pub fn not_found(id: ItemId) -> Self {
        Self::NotFound { id }
    }

    /// Create a cycle error.
    pub fn cycle(item: ItemId, parent: ItemId) -> Self {
        Self::Cycle { item, parent }
    }

    /// Returns `true` for errors a caller should silently ignore.
    pub fn is_rejected_request(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Cycle { .. } | Self::NotSibling { .. }
        )
    }
}

/// A broken structural invariant, reported by
/// [`OutlineStore::validate`](crate::OutlineStore::validate).
///
/// These indicate a defect in the store rather than a bad request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// The same id appears more than once in the display order.
    #[error("Item {0:?} appears more than once in the display order")]
    DuplicateId(ItemId),

    /// The display order and the item table disagree on the set of items.
    #[error("Display order holds {order} entries but the store holds {items} items")]
    OrderMismatch { order: usize, items: usize },

    /// An item's parent is not an existing item.
    #[error("Item {item:?} has a dangling parent {parent:?}")]
    DanglingParent { item: ItemId, parent: ItemId },

    /// An item is not inside its parent's contiguous block.
    #[error("Item {item:?} at position {position} is outside the block of its parent")]
    Discontiguous { item: ItemId, position: usize },

    /// The selection names an item that no longer exists.
    #[error("Selection holds removed item {0:?}")]
    StaleSelection(ItemId),
}
