//! Randomized operation sequences against the outline invariants.

use std::collections::HashSet;

use proptest::prelude::*;
use rig_outliner::{
    ClickModifier, DropIntent, DropZone, ItemId, OutlineError, OutlineStore, OutlinerConfig,
};

#[derive(Debug, Clone)]
enum Op {
    Add,
    Reparent(usize, Option<usize>),
    MoveUnder(usize, usize),
    Click(Option<usize>, u8),
    RemoveSelected,
    RemoveOne(usize),
    Drop(Vec<usize>, Option<(usize, bool)>),
    Rename(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        4 => (any::<usize>(), proptest::option::of(any::<usize>()))
            .prop_map(|(item, parent)| Op::Reparent(item, parent)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(item, target)| Op::MoveUnder(item, target)),
        2 => (proptest::option::of(any::<usize>()), 0u8..3)
            .prop_map(|(item, modifier)| Op::Click(item, modifier)),
        1 => Just(Op::RemoveSelected),
        1 => any::<usize>().prop_map(Op::RemoveOne),
        3 => (
            proptest::collection::vec(any::<usize>(), 1..4),
            proptest::option::of((any::<usize>(), any::<bool>())),
        )
            .prop_map(|(dropped, target)| Op::Drop(dropped, target)),
        1 => any::<usize>().prop_map(Op::Rename),
    ]
}

fn pick(store: &OutlineStore<u32>, index: usize) -> Option<ItemId> {
    let order = store.display_order();
    (!order.is_empty()).then(|| order[index % order.len()])
}

fn modifier(raw: u8) -> ClickModifier {
    match raw {
        0 => ClickModifier::None,
        1 => ClickModifier::Ctrl,
        _ => ClickModifier::Shift,
    }
}

fn apply(store: &mut OutlineStore<u32>, op: &Op, next: &mut u32) -> Result<(), TestCaseError> {
    match op {
        Op::Add => {
            *next += 1;
            store.add_item("item", None, *next);
        }
        Op::Reparent(item, parent) => {
            let Some(item) = pick(store, *item) else {
                return Ok(());
            };
            let parent = parent.and_then(|parent| pick(store, parent));
            let forbidden = parent.is_some_and(|parent| store.is_in_subtree(item, parent));
            match store.reparent(item, parent) {
                Ok(()) => prop_assert!(!forbidden),
                Err(OutlineError::Cycle { .. }) => prop_assert!(forbidden),
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
        Op::MoveUnder(item, target) => {
            if let (Some(item), Some(target)) = (pick(store, *item), pick(store, *target)) {
                let siblings = store.parent(item).unwrap() == store.parent(target).unwrap();
                prop_assert_eq!(store.move_under(item, target).is_ok(), siblings || item == target);
            }
        }
        Op::Click(item, raw) => {
            let item = item.and_then(|item| pick(store, item));
            store.click(item, modifier(*raw)).unwrap();
        }
        Op::RemoveSelected => {
            let doomed = store.selected_ids(true);
            let removed = store.remove_selected();
            prop_assert_eq!(removed.len(), doomed.len());
            prop_assert!(store.selection().is_empty());
            for id in doomed {
                prop_assert!(!store.contains(id));
            }
        }
        Op::RemoveOne(item) => {
            if let Some(item) = pick(store, *item) {
                store.remove_items(&[item]).unwrap();
            }
        }
        Op::Drop(dropped, target) => {
            let dropped: Vec<_> = dropped.iter().filter_map(|&i| pick(store, i)).collect();
            if dropped.is_empty() {
                return Ok(());
            }
            let intent = match target {
                Some((target, bottom)) => {
                    let Some(target) = pick(store, *target) else {
                        return Ok(());
                    };
                    let zone = if *bottom { DropZone::Bottom } else { DropZone::Top };
                    DropIntent::onto(dropped, target, zone)
                }
                None => DropIntent::world(dropped),
            };
            store.resolve_drop(&intent).unwrap();
        }
        Op::Rename(item) => {
            if let Some(item) = pick(store, *item) {
                store.rename(item, "ctrl", true).unwrap();
            }
        }
    }
    Ok(())
}

fn assert_contiguous(store: &OutlineStore<u32>) -> Result<(), TestCaseError> {
    let order = store.display_order();
    for (position, &id) in order.iter().enumerate() {
        let descendants = store.descendants(id).unwrap();
        prop_assert_eq!(
            &order[position + 1..position + 1 + descendants.len()],
            descendants.as_slice()
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn operations_keep_invariants(ops in proptest::collection::vec(op(), 1..60)) {
        let mut store = OutlineStore::new();
        let mut next = 0;
        for op in &ops {
            apply(&mut store, op, &mut next)?;
            prop_assert_eq!(store.validate(), Ok(()));
            assert_contiguous(&store)?;
        }
    }

    #[test]
    fn renamed_labels_stay_unique(ops in proptest::collection::vec(op(), 1..60)) {
        let mut store = OutlineStore::with_config(OutlinerConfig::default().with_unique_labels(true));
        let mut next = 0;
        for op in &ops {
            apply(&mut store, op, &mut next)?;
        }
        let labels: Vec<_> = store
            .display_order()
            .iter()
            .map(|&id| store.label(id).unwrap().to_string())
            .collect();
        let distinct: HashSet<_> = labels.iter().collect();
        prop_assert_eq!(distinct.len(), labels.len());
    }

    #[test]
    fn payloads_survive_moves(count in 1usize..20, moves in proptest::collection::vec((any::<usize>(), any::<usize>()), 0..30)) {
        let mut store = OutlineStore::new();
        for i in 0..count {
            store.add_item("item", None, i as u32);
        }
        for (item, parent) in moves {
            let item = pick(&store, item).unwrap();
            let parent = pick(&store, parent).unwrap();
            let _ = store.reparent(item, Some(parent));
        }
        let mut payloads: Vec<u32> = store.payloads().into_iter().copied().collect();
        payloads.sort_unstable();
        prop_assert_eq!(payloads, (0..count as u32).collect::<Vec<_>>());
    }
}
