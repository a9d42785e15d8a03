//! Text rendering of an outline for diagnostics.
//!
//! ```
//! use rig_outliner::debug::{OutlineDebug, TreeFormatOptions, TreeStyle};
//! use rig_outliner::OutlineStore;
//!
//! let mut store = OutlineStore::new();
//! let spine = store.add_item("spine", None, ());
//! let arm = store.add_item("arm", None, ());
//! store.reparent(arm, Some(spine)).unwrap();
//!
//! let text = OutlineDebug::with_options(TreeFormatOptions::minimal())
//!     .format(&store);
//! assert_eq!(text, "Outline (2 items):\nspine\n`-- arm\n");
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::item::ItemId;
use crate::store::OutlineStore;

/// Tree drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII connectors (`|--`, `` `-- ``).
    #[default]
    Ascii,
    /// Unicode box-drawing connectors.
    Unicode,
    /// Plain indentation with a dash per item.
    Compact,
}

/// Options for formatting an outline.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// Drawing style.
    pub style: TreeStyle,
    /// Whether to append item ids.
    pub show_ids: bool,
    /// Whether to mark selected items with `*`.
    pub show_selection: bool,
    /// Deepest level to print (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_selection: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Labels and structure only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_selection: false,
            ..Default::default()
        }
    }
}

/// Formats an [`OutlineStore`] as a tree.
#[derive(Debug, Clone, Default)]
pub struct OutlineDebug {
    options: TreeFormatOptions,
}

impl OutlineDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// A displayable view of the store.
    pub fn display<'a, T>(&'a self, store: &'a OutlineStore<T>) -> OutlineTree<'a, T> {
        OutlineTree {
            options: &self.options,
            store,
        }
    }

    /// Formats the whole outline.
    pub fn format<T>(&self, store: &OutlineStore<T>) -> String {
        self.display(store).to_string()
    }
}

/// [`fmt::Display`] adapter returned by [`OutlineDebug::display`].
pub struct OutlineTree<'a, T> {
    options: &'a TreeFormatOptions,
    store: &'a OutlineStore<T>,
}

impl<T> OutlineTree<'_, T> {
    fn write_item(
        &self,
        f: &mut fmt::Formatter<'_>,
        children: &HashMap<Option<ItemId>, Vec<ItemId>>,
        id: ItemId,
        depth: usize,
        // One flag per ancestor level: does that ancestor have later siblings?
        open: &mut Vec<bool>,
        is_last: bool,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        if depth > 0 {
            let (branch, tee, corner, blank) = match self.options.style {
                TreeStyle::Ascii => ("|   ", "|-- ", "`-- ", "    "),
                TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "    "),
                TreeStyle::Compact => ("  ", "- ", "- ", "  "),
            };
            for &more in open.iter().skip(1) {
                f.write_str(if more { branch } else { blank })?;
            }
            f.write_str(if is_last { corner } else { tee })?;
        }

        let label = self.store.label(id).unwrap_or_default();
        f.write_str(if label.is_empty() { "(unnamed)" } else { label })?;
        if self.options.show_ids {
            write!(f, " [{id:?}]")?;
        }
        if self.options.show_selection && self.store.is_selected(id) {
            f.write_str(" *")?;
        }
        f.write_str("\n")?;

        if let Some(kids) = children.get(&Some(id)) {
            open.push(!is_last);
            for (index, &child) in kids.iter().enumerate() {
                self.write_item(f, children, child, depth + 1, open, index + 1 == kids.len())?;
            }
            open.pop();
        }
        Ok(())
    }
}

impl<T> fmt::Display for OutlineTree<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Outline ({} items):", self.store.len())?;
        if self.store.is_empty() {
            return writeln!(f, "  (empty)");
        }

        let mut children: HashMap<Option<ItemId>, Vec<ItemId>> = HashMap::new();
        for row in self.store.rows() {
            children.entry(row.parent).or_default().push(row.id);
        }

        let roots = children.get(&None).cloned().unwrap_or_default();
        let mut open = Vec::new();
        for (index, &root) in roots.iter().enumerate() {
            self.write_item(f, &children, root, 0, &mut open, index + 1 == roots.len())?;
        }
        Ok(())
    }
}
