//! Shared outliner with change notification.
//!
//! [`Outliner`] owns an [`OutlineStore`] behind a single `RwLock`. Structural
//! operations take the write guard for their whole multi-step mutation;
//! queries take read guards and may run concurrently. Signals are emitted
//! after the guard is released, so slots may call back into the outliner.

use std::fmt;

use parking_lot::RwLock;
use rig_outliner_core::Signal;

use crate::config::{IconSize, OutlinerConfig};
use crate::debug::{OutlineDebug, TreeFormatOptions};
use crate::drop::{DropIntent, DropOutcome};
use crate::error::{OutlineError, Result};
use crate::item::{Item, ItemId, OutlineRow};
use crate::selection::ClickModifier;
use crate::store::OutlineStore;
use crate::sync::{SyncEntry, SyncReport};

/// Signals emitted by an [`Outliner`].
pub struct OutlineSignals {
    /// Emitted after any change to the hierarchy or display order.
    pub structure_changed: Signal<()>,

    /// Emitted after items were removed.
    /// Args: removed ids in their former display order
    pub items_removed: Signal<Vec<ItemId>>,

    /// Emitted after the selection changed.
    /// Args: selected ids in selection order
    pub selection_changed: Signal<Vec<ItemId>>,

    /// Emitted after an item's label or payload changed.
    pub data_changed: Signal<ItemId>,

    /// Emitted after a presentation setting changed (icon size, indent).
    pub layout_changed: Signal<()>,
}

impl OutlineSignals {
    /// Creates a new set of signals.
    pub fn new() -> Self {
        Self {
            structure_changed: Signal::new(),
            items_removed: Signal::new(),
            selection_changed: Signal::new(),
            data_changed: Signal::new(),
            layout_changed: Signal::new(),
        }
    }
}

impl Default for OutlineSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OutlineSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineSignals").finish_non_exhaustive()
    }
}

/// Thread-safe outliner: an [`OutlineStore`] plus change signals.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use rig_outliner::{ClickModifier, DropIntent, DropZone, Outliner};
///
/// let outliner = Outliner::new();
/// let changes = Arc::new(AtomicUsize::new(0));
/// let counter = changes.clone();
/// outliner.signals().structure_changed.connect(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// let root = outliner.add_item("root", None, "root_module");
/// let arm = outliner.add_item("arm", None, "arm_module");
/// outliner
///     .resolve_drop(&DropIntent::onto(vec![arm], root, DropZone::Top))
///     .unwrap();
///
/// assert_eq!(outliner.parent(arm).unwrap(), Some(root));
/// assert_eq!(changes.load(Ordering::SeqCst), 3);
///
/// outliner.click(Some(root), ClickModifier::None).unwrap();
/// assert_eq!(outliner.selected_payloads(true), vec!["root_module", "arm_module"]);
/// ```
pub struct Outliner<T> {
    store: RwLock<OutlineStore<T>>,
    signals: OutlineSignals,
}

impl<T> Default for Outliner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Outliner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.read();
        f.debug_struct("Outliner")
            .field("items", &store.len())
            .field("selected", &store.selection().len())
            .finish()
    }
}

impl<T> Outliner<T> {
    /// Creates an empty outliner with the default configuration.
    pub fn new() -> Self {
        Self::with_config(OutlinerConfig::default())
    }

    /// Creates an empty outliner with the given configuration.
    pub fn with_config(config: OutlinerConfig) -> Self {
        Self {
            store: RwLock::new(OutlineStore::with_config(config)),
            signals: OutlineSignals::new(),
        }
    }

    /// Wraps an existing store.
    pub fn from_store(store: OutlineStore<T>) -> Self {
        Self {
            store: RwLock::new(store),
            signals: OutlineSignals::new(),
        }
    }

    /// Consumes the outliner, returning its store.
    pub fn into_store(self) -> OutlineStore<T> {
        self.store.into_inner()
    }

    /// The outliner's signals.
    pub fn signals(&self) -> &OutlineSignals {
        &self.signals
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> OutlinerConfig {
        self.store.read().config().clone()
    }

    /// Sets the icon display state.
    ///
    /// Emits `layout_changed` if the state changed.
    pub fn set_icon_size(&self, size: IconSize) {
        let changed = {
            let mut store = self.store.write();
            let config = store.config_mut();
            let changed = config.icon_size != size;
            config.icon_size = size;
            changed
        };
        if changed {
            self.signals.layout_changed.emit(());
        }
    }

    /// Runs `f` with shared access to the store.
    ///
    /// Other readers may run at the same time; writers wait.
    pub fn with_store<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&OutlineStore<T>) -> R,
    {
        f(&*self.store.read())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of items.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    /// Returns true if the outline holds no items.
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Returns true if `id` names a current item.
    pub fn contains(&self, id: ItemId) -> bool {
        self.store.read().contains(id)
    }

    /// All item ids in display order.
    pub fn display_order(&self) -> Vec<ItemId> {
        self.store.read().display_order().to_vec()
    }

    /// Parent of an item.
    pub fn parent(&self, id: ItemId) -> Result<Option<ItemId>> {
        self.store.read().parent(id)
    }

    /// Direct children of an item, in display order.
    pub fn children(&self, id: ItemId) -> Result<Vec<ItemId>> {
        self.store.read().children(id)
    }

    /// All descendants of an item, in display order.
    pub fn descendants(&self, id: ItemId) -> Result<Vec<ItemId>> {
        self.store.read().descendants(id)
    }

    /// Number of ancestors of an item.
    pub fn depth(&self, id: ItemId) -> Result<usize> {
        self.store.read().depth(id)
    }

    /// The label of an item.
    pub fn label(&self, id: ItemId) -> Option<String> {
        self.store.read().label(id).map(str::to_string)
    }

    /// Rows for rendering, in display order.
    pub fn rows(&self) -> Vec<OutlineRow> {
        self.store.read().rows()
    }

    /// Selected ids in display order, optionally with descendants.
    pub fn selected_ids(&self, include_descendants: bool) -> Vec<ItemId> {
        self.store.read().selected_ids(include_descendants)
    }

    /// Selected ids in selection order.
    pub fn selection(&self) -> Vec<ItemId> {
        self.store.read().selection().ids().to_vec()
    }

    /// Provides read access to an item.
    pub fn with_item<F, R>(&self, id: ItemId, f: F) -> Option<R>
    where
        F: FnOnce(&Item<T>) -> R,
    {
        self.store.read().get(id).map(f)
    }

    /// Renders the outline as a tree for diagnostics.
    pub fn debug_tree(&self, options: TreeFormatOptions) -> String {
        OutlineDebug::with_options(options).format(&*self.store.read())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a top-level item at the end of the display order.
    ///
    /// Emits `structure_changed`.
    pub fn add_item(&self, label: &str, icon_key: Option<&str>, payload: T) -> ItemId {
        let id = self.store.write().add_item(label, icon_key, payload);
        self.signals.structure_changed.emit(());
        id
    }

    /// Moves an item and its subtree under a new parent.
    ///
    /// Emits `structure_changed` on success.
    pub fn reparent(&self, id: ItemId, new_parent: Option<ItemId>) -> Result<()> {
        self.store.write().reparent(id, new_parent)?;
        self.signals.structure_changed.emit(());
        Ok(())
    }

    /// Moves an item's block after a sibling's subtree.
    ///
    /// Emits `structure_changed` on success.
    pub fn move_under(&self, id: ItemId, target: ItemId) -> Result<()> {
        self.store.write().move_under(id, target)?;
        self.signals.structure_changed.emit(());
        Ok(())
    }

    /// Applies a drop.
    ///
    /// Emits `structure_changed` if anything moved.
    pub fn resolve_drop(&self, intent: &DropIntent) -> Result<DropOutcome> {
        let outcome = self.store.write().resolve_drop(intent)?;
        if !outcome.is_noop() {
            self.signals.structure_changed.emit(());
        }
        Ok(outcome)
    }

    /// Sets an item's label, returning the label applied.
    ///
    /// Emits `data_changed`.
    pub fn rename(&self, id: ItemId, new_label: &str, enforce_unique: bool) -> Result<String> {
        let label = self.store.write().rename(id, new_label, enforce_unique)?;
        self.signals.data_changed.emit(id);
        Ok(label)
    }

    /// Provides mutable access to an item's payload.
    ///
    /// Emits `data_changed` after modification.
    pub fn modify_payload<F, R>(&self, id: ItemId, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut store = self.store.write();
            let payload = store.payload_mut(id).ok_or(OutlineError::not_found(id))?;
            f(payload)
        };
        self.signals.data_changed.emit(id);
        Ok(result)
    }

    /// Applies a click. `None` is a click on empty space.
    ///
    /// Emits `selection_changed` if the selection changed.
    pub fn click(&self, id: Option<ItemId>, modifier: ClickModifier) -> Result<()> {
        let selection = {
            let mut store = self.store.write();
            if !store.click(id, modifier)? {
                return Ok(());
            }
            store.selection().ids().to_vec()
        };
        self.signals.selection_changed.emit(selection);
        Ok(())
    }

    /// Replaces the selection.
    ///
    /// Emits `selection_changed` if the selection changed.
    pub fn set_selection(&self, ids: &[ItemId]) -> Result<()> {
        let selection = {
            let mut store = self.store.write();
            if !store.set_selection(ids)? {
                return Ok(());
            }
            store.selection().ids().to_vec()
        };
        self.signals.selection_changed.emit(selection);
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&self) {
        if self.store.write().clear_selection() {
            self.signals.selection_changed.emit(Vec::new());
        }
    }

    /// Removes the selected items and their descendants.
    ///
    /// Returns the removed items so the payload owner can release them.
    pub fn remove_selected(&self) -> Vec<(ItemId, Item<T>)> {
        let removed = self.store.write().remove_selected();
        if !removed.is_empty() {
            self.emit_removed(&removed, Some(Vec::new()));
        }
        removed
    }

    /// Removes the given items and their descendants.
    pub fn remove_items(&self, ids: &[ItemId]) -> Result<Vec<(ItemId, Item<T>)>> {
        let (removed, selection) = {
            let mut store = self.store.write();
            let before = store.selection().len();
            let removed = store.remove_items(ids)?;
            let selection =
                (store.selection().len() != before).then(|| store.selection().ids().to_vec());
            (removed, selection)
        };
        if !removed.is_empty() {
            self.emit_removed(&removed, selection);
        }
        Ok(removed)
    }

    /// Removes every item.
    pub fn remove_all(&self) -> Vec<(ItemId, Item<T>)> {
        let (removed, had_selection) = {
            let mut store = self.store.write();
            let had_selection = !store.selection().is_empty();
            (store.remove_all(), had_selection)
        };
        if !removed.is_empty() {
            self.emit_removed(&removed, had_selection.then(Vec::new));
        }
        removed
    }

    /// Reconciles the outline with the payload owner's modules.
    ///
    /// Emits `structure_changed` and `items_removed` as appropriate, and
    /// `selection_changed` if removed items were selected.
    pub fn reconcile<K, I, F>(&self, entries: I, key_of: F) -> SyncReport
    where
        K: Eq + std::hash::Hash + Clone + fmt::Debug,
        I: IntoIterator<Item = SyncEntry<K, T>>,
        F: Fn(&T) -> K,
    {
        let (report, selection) = {
            let mut store = self.store.write();
            let before = store.selection().len();
            let report = store.reconcile(entries, key_of);
            let selection =
                (store.selection().len() != before).then(|| store.selection().ids().to_vec());
            (report, selection)
        };

        if report.changed_structure() {
            self.signals.structure_changed.emit(());
        }
        if !report.removed.is_empty() {
            self.signals.items_removed.emit(report.removed.clone());
        }
        if let Some(selection) = selection {
            self.signals.selection_changed.emit(selection);
        }
        for &id in &report.relabeled {
            self.signals.data_changed.emit(id);
        }
        report
    }

    fn emit_removed(&self, removed: &[(ItemId, Item<T>)], selection: Option<Vec<ItemId>>) {
        self.signals.structure_changed.emit(());
        self.signals
            .items_removed
            .emit(removed.iter().map(|(id, _)| *id).collect());
        if let Some(selection) = selection {
            self.signals.selection_changed.emit(selection);
        }
    }
}

impl<T: Clone> Outliner<T> {
    /// A copy of an item's payload.
    pub fn payload(&self, id: ItemId) -> Option<T> {
        self.store.read().payload(id).cloned()
    }

    /// Copies of all payloads in display order.
    pub fn payloads(&self) -> Vec<T> {
        self.store.read().payloads().into_iter().cloned().collect()
    }

    /// Copies of the selected payloads in display order.
    pub fn selected_payloads(&self, include_descendants: bool) -> Vec<T> {
        self.store
            .read()
            .selected_payloads(include_descendants)
            .into_iter()
            .cloned()
            .collect()
    }
}

static_assertions::assert_impl_all!(Outliner<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drop::DropZone;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter<A: 'static>(signal: &Signal<A>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = count.clone();
        signal.connect(move |_| {
            clone.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_structure_signals() {
        let outliner = Outliner::new();
        let structure = counter(&outliner.signals().structure_changed);

        let a = outliner.add_item("a", None, 1);
        let b = outliner.add_item("b", None, 2);
        outliner.reparent(b, Some(a)).unwrap();
        assert_eq!(structure.load(Ordering::SeqCst), 3);

        // Failed operations emit nothing.
        assert!(outliner.reparent(a, Some(b)).is_err());
        assert_eq!(structure.load(Ordering::SeqCst), 3);

        // A fully rejected drop emits nothing either.
        let outcome = outliner
            .resolve_drop(&DropIntent::onto(vec![a], b, DropZone::Top))
            .unwrap();
        assert_eq!(outcome.rejected, vec![a]);
        assert_eq!(structure.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_selection_signal_carries_ids() {
        let outliner = Outliner::new();
        let a = outliner.add_item("a", None, ());
        let b = outliner.add_item("b", None, ());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        outliner
            .signals()
            .selection_changed
            .connect(move |ids: &Vec<ItemId>| seen_clone.lock().push(ids.clone()));

        outliner.click(Some(a), ClickModifier::None).unwrap();
        outliner.click(Some(a), ClickModifier::None).unwrap();
        outliner.click(Some(b), ClickModifier::Ctrl).unwrap();
        outliner.clear_selection();

        assert_eq!(*seen.lock(), vec![vec![a], vec![a, b], vec![]]);
    }

    #[test]
    fn test_remove_selected_signals() {
        let outliner = Outliner::new();
        let a = outliner.add_item("a", None, ());
        let b = outliner.add_item("b", None, ());
        outliner.reparent(b, Some(a)).unwrap();
        outliner.click(Some(a), ClickModifier::None).unwrap();

        let removed_ids = Arc::new(Mutex::new(Vec::new()));
        let removed_clone = removed_ids.clone();
        outliner
            .signals()
            .items_removed
            .connect(move |ids: &Vec<ItemId>| removed_clone.lock().extend(ids.iter().copied()));
        let selection = counter(&outliner.signals().selection_changed);

        let removed = outliner.remove_selected();
        assert_eq!(removed.len(), 2);
        assert_eq!(*removed_ids.lock(), vec![a, b]);
        assert_eq!(selection.load(Ordering::SeqCst), 1);
        assert!(outliner.is_empty());

        // Nothing selected: nothing happens.
        assert!(outliner.remove_selected().is_empty());
        assert_eq!(selection.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slots_may_reenter() {
        let outliner = Arc::new(Outliner::new());
        let rows = Arc::new(Mutex::new(0));

        let weak = Arc::downgrade(&outliner);
        let rows_clone = rows.clone();
        outliner.signals().structure_changed.connect(move |_| {
            if let Some(outliner) = weak.upgrade() {
                *rows_clone.lock() = outliner.rows().len();
            }
        });

        outliner.add_item("a", None, ());
        outliner.add_item("b", None, ());
        assert_eq!(*rows.lock(), 2);
    }

    #[test]
    fn test_modify_payload_and_rename() {
        let outliner = Outliner::new();
        let a = outliner.add_item("a", None, 10);
        let data = counter(&outliner.signals().data_changed);

        let doubled = outliner.modify_payload(a, |value| {
            *value *= 2;
            *value
        });
        assert_eq!(doubled.unwrap(), 20);
        assert_eq!(outliner.payload(a), Some(20));

        assert_eq!(outliner.rename(a, "renamed", false).unwrap(), "renamed");
        assert_eq!(outliner.with_item(a, |item| item.label().len()), Some(7));
        assert_eq!(data.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_icon_size_signal() {
        let outliner = Outliner::<()>::new();
        let layout = counter(&outliner.signals().layout_changed);

        outliner.set_icon_size(IconSize::Large);
        outliner.set_icon_size(IconSize::Large);
        assert_eq!(layout.load(Ordering::SeqCst), 1);

        outliner.add_item("a", None, ());
        assert_eq!(outliner.rows()[0].icon_size, 64);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let outliner = Arc::new(Outliner::new());
        let root = outliner.add_item("root", None, 0usize);

        let writer = {
            let outliner = outliner.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    let id = outliner.add_item("child", None, i);
                    outliner.reparent(id, Some(root)).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let outliner = outliner.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        outliner.with_store(|store| assert_eq!(store.validate(), Ok(())));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(outliner.children(root).unwrap().len(), 50);
    }
}
