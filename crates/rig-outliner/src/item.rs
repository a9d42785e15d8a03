//! Outline items and their render projection.

use slotmap::new_key_type;

new_key_type! {
    /// Identifier of an item in an [`OutlineStore`](crate::OutlineStore).
    ///
    /// Ids are generational: once an item is removed its id never compares
    /// equal to the id of a later item, even if the storage slot is reused.
    pub struct ItemId;
}

/// A node in the outline forest.
///
/// `parent` is `None` for top-level items (the world). The item's position in
/// the display order is not stored here; the store derives it from its
/// ordered sequence.
#[derive(Debug, Clone)]
pub struct Item<T> {
    pub(crate) label: String,
    pub(crate) icon_key: Option<String>,
    pub(crate) payload: T,
    pub(crate) parent: Option<ItemId>,
}

impl<T> Item<T> {
    pub(crate) fn new(label: String, icon_key: Option<String>, payload: T) -> Self {
        Self {
            label,
            icon_key,
            payload,
            parent: None,
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Key the presentation layer uses to look up the item's icon.
    pub fn icon_key(&self) -> Option<&str> {
        self.icon_key.as_deref()
    }

    /// Caller-supplied payload. The outline never inspects it.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Parent item, or `None` for a top-level item.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Consumes the item, returning its payload.
    pub fn into_payload(self) -> T {
        self.payload
    }
}

/// Everything a presentation layer needs to draw one row.
///
/// Produced in display order by [`OutlineStore::rows`](crate::OutlineStore::rows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    /// The item drawn on this row.
    pub id: ItemId,
    /// Display label.
    pub label: String,
    /// Icon lookup key.
    pub icon_key: Option<String>,
    /// Parent item, `None` at top level.
    pub parent: Option<ItemId>,
    /// Parent's label, or the configured world label at top level.
    pub parent_label: String,
    /// Number of ancestors.
    pub depth: usize,
    /// Horizontal indentation in pixels (`depth * indent_width`).
    pub indent: u32,
    /// Icon edge length in pixels.
    pub icon_size: u32,
    /// Whether the item is selected.
    pub selected: bool,
}
