//! Reconciliation against the payload owner.
//!
//! The outline does not own the things it lists. When the owner's set of
//! modules changes (a module is built, renamed, reparented or deleted
//! elsewhere), [`OutlineStore::reconcile`] brings the outline back in line
//! without rebuilding it, so selection and manual ordering survive.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use rig_outliner_core::logging::{span_names, targets};

use crate::item::ItemId;
use crate::store::OutlineStore;

/// One module as the payload owner currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry<K, T> {
    /// Identity of the module in the owner's world.
    pub key: K,
    /// Key of the module's parent, `None` for a top-level module.
    pub parent: Option<K>,
    /// Label to show.
    pub label: String,
    /// Icon lookup key.
    pub icon_key: Option<String>,
    /// Payload for a newly added item. Ignored for items already present.
    pub payload: T,
}

impl<K, T> SyncEntry<K, T> {
    /// A top-level entry without an icon.
    pub fn new(key: K, label: impl Into<String>, payload: T) -> Self {
        Self {
            key,
            parent: None,
            label: label.into(),
            icon_key: None,
            payload,
        }
    }

    /// Sets the parent key.
    pub fn with_parent(mut self, parent: K) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the icon key.
    pub fn with_icon_key(mut self, icon_key: impl Into<String>) -> Self {
        self.icon_key = Some(icon_key.into());
        self
    }
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Items created for keys the outline did not know.
    pub added: Vec<ItemId>,
    /// Items whose label changed.
    pub relabeled: Vec<ItemId>,
    /// Items moved under a different parent.
    pub reparented: Vec<ItemId>,
    /// Items whose parent change was refused because it would form a cycle.
    pub skipped: Vec<ItemId>,
    /// Items removed because their key is gone, descendants included.
    pub removed: Vec<ItemId>,
}

impl SyncReport {
    /// Returns true if the outline structure changed.
    pub fn changed_structure(&self) -> bool {
        !(self.added.is_empty() && self.reparented.is_empty() && self.removed.is_empty())
    }

    /// Returns true if nothing changed at all.
    pub fn is_empty(&self) -> bool {
        !self.changed_structure() && self.relabeled.is_empty()
    }
}

impl<T> OutlineStore<T> {
    /// Reconciles the outline with the owner's current modules.
    ///
    /// `key_of` extracts an item's key from its payload. The pass runs in
    /// four steps:
    ///
    /// 1. entries with an unknown key are added as new items
    /// 2. labels that differ from the entry are updated
    /// 3. items whose parent key differs are reparented; a parent key that
    ///    is not among the entries means top-level
    /// 4. items whose key is not among the entries are removed, with their
    ///    descendants
    ///
    /// Items whose relationships did not change keep their position, and
    /// selected items that survive stay selected.
    pub fn reconcile<K, I, F>(&mut self, entries: I, key_of: F) -> SyncReport
    where
        K: Eq + Hash + Clone + Debug,
        I: IntoIterator<Item = SyncEntry<K, T>>,
        F: Fn(&T) -> K,
    {
        let _span = tracing::debug_span!(target: targets::SYNC, span_names::SYNC).entered();
        let mut report = SyncReport::default();
        let enforce_unique = self.config().unique_labels;

        let mut by_key: HashMap<K, ItemId> = self
            .display_order()
            .iter()
            .filter_map(|&id| self.payload(id).map(|payload| (key_of(payload), id)))
            .collect();

        let mut links: Vec<(ItemId, Option<K>)> = Vec::new();
        let mut wanted: HashSet<K> = HashSet::new();

        for entry in entries {
            wanted.insert(entry.key.clone());
            let id = match by_key.get(&entry.key) {
                Some(&id) => {
                    let label = self.resolve_label(Some(id), &entry.label, enforce_unique);
                    if self.label(id) != Some(label.as_str()) {
                        self.set_label(id, label);
                        report.relabeled.push(id);
                    }
                    id
                }
                None => {
                    let id = self.add_item(&entry.label, entry.icon_key.as_deref(), entry.payload);
                    by_key.insert(entry.key, id);
                    report.added.push(id);
                    id
                }
            };
            links.push((id, entry.parent));
        }

        // Reparenting makes an item its parent's first child, so walking the
        // entries backwards leaves siblings in entry order.
        for (id, parent_key) in links.into_iter().rev() {
            let desired = parent_key
                .filter(|key| wanted.contains(key))
                .and_then(|key| by_key.get(&key).copied());
            if self.get(id).map(|item| item.parent()) == Some(desired) {
                continue;
            }
            match self.reparent(id, desired) {
                Ok(()) => report.reparented.push(id),
                Err(error) => {
                    tracing::warn!(target: targets::SYNC, ?id, %error, "skipping parent change");
                    report.skipped.push(id);
                }
            }
        }

        let stale: Vec<ItemId> = self
            .display_order()
            .iter()
            .copied()
            .filter(|&id| {
                self.payload(id)
                    .is_some_and(|payload| !wanted.contains(&key_of(payload)))
            })
            .collect();
        if !stale.is_empty() {
            match self.remove_items(&stale) {
                Ok(removed) => report.removed = removed.into_iter().map(|(id, _)| id).collect(),
                Err(error) => tracing::warn!(target: targets::SYNC, %error, "skipping removal"),
            }
        }

        tracing::debug!(
            target: targets::SYNC,
            added = report.added.len(),
            relabeled = report.relabeled.len(),
            reparented = report.reparented.len(),
            skipped = report.skipped.len(),
            removed = report.removed.len(),
            "outline reconciled"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutlinerConfig;

    fn key(payload: &&'static str) -> &'static str {
        payload
    }

    fn entry(name: &'static str) -> SyncEntry<&'static str, &'static str> {
        SyncEntry::new(name, name, name)
    }

    fn labels(store: &OutlineStore<&'static str>) -> Vec<String> {
        store
            .rows()
            .into_iter()
            .map(|row| format!("{}{}", "  ".repeat(row.depth), row.label))
            .collect()
    }

    #[test]
    fn test_reconcile_from_empty() {
        let mut store = OutlineStore::new();
        let report = store.reconcile(
            [
                entry("spine"),
                entry("arm").with_parent("spine").with_icon_key("limb"),
                entry("leg").with_parent("spine"),
                entry("hand").with_parent("arm"),
            ],
            key,
        );

        assert_eq!(report.added.len(), 4);
        assert!(report.removed.is_empty());
        assert_eq!(labels(&store), vec!["spine", "  arm", "    hand", "  leg"]);
        let arm = report.added[1];
        assert_eq!(store.get(arm).unwrap().icon_key(), Some("limb"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut store = OutlineStore::new();
        let entries = || [entry("spine"), entry("arm").with_parent("spine")];
        store.reconcile(entries(), key);
        let before = store.display_order().to_vec();

        let report = store.reconcile(entries(), key);
        assert!(report.is_empty());
        assert_eq!(store.display_order(), before.as_slice());
    }

    #[test]
    fn test_reconcile_removes_and_keeps_selection() {
        let mut store = OutlineStore::new();
        store.reconcile(
            [entry("spine"), entry("arm").with_parent("spine"), entry("leg")],
            key,
        );
        let leg = store.display_order()[2];
        let spine = store.display_order()[0];
        store.set_selection(&[leg, spine]).unwrap();

        let report = store.reconcile([entry("leg")], key);
        assert_eq!(report.removed.len(), 2);
        assert_eq!(store.display_order(), &[leg]);
        assert_eq!(store.selection().ids(), &[leg]);
    }

    #[test]
    fn test_reconcile_relabels_and_reparents() {
        let mut store = OutlineStore::new();
        store.reconcile([entry("spine"), entry("arm")], key);
        let arm = store.display_order()[1];

        let mut renamed = entry("arm").with_parent("spine");
        renamed.label = "left_arm".to_string();
        let report = store.reconcile([entry("spine"), renamed], key);

        assert_eq!(report.relabeled, vec![arm]);
        assert_eq!(report.reparented, vec![arm]);
        assert_eq!(labels(&store), vec!["spine", "  left_arm"]);
    }

    #[test]
    fn test_reconcile_orphan_goes_to_world() {
        let mut store = OutlineStore::new();
        store.reconcile([entry("spine"), entry("arm").with_parent("spine")], key);

        let report = store.reconcile([entry("arm").with_parent("spine")], key);
        assert_eq!(report.reparented.len(), 1);
        assert_eq!(labels(&store), vec!["arm"]);
    }

    #[test]
    fn test_reconcile_skips_cycles() {
        let mut store = OutlineStore::new();
        store.reconcile([entry("a"), entry("b").with_parent("a")], key);
        let b = store.display_order()[1];

        // The owner claims a and b are each other's parent.
        let report = store.reconcile(
            [entry("a").with_parent("b"), entry("b").with_parent("a")],
            key,
        );
        assert_eq!(report.skipped, vec![store.display_order()[0]]);
        assert_eq!(store.parent(b).unwrap(), Some(store.display_order()[0]));
        assert_eq!(store.validate(), Ok(()));
    }

    #[test]
    fn test_reconcile_keeps_unique_labels() {
        let mut store =
            OutlineStore::with_config(OutlinerConfig::default().with_unique_labels(true));
        let entries = || {
            [
                SyncEntry::new("k1", "ctrl", "k1"),
                SyncEntry::new("k2", "ctrl", "k2"),
            ]
        };
        store.reconcile(entries(), key);
        assert_eq!(labels(&store), vec!["ctrl", "ctrl1"]);

        let report = store.reconcile(entries(), key);
        assert!(report.relabeled.is_empty());
    }
}
