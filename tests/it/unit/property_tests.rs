//! Randomized operation sequences against the store invariants.

use gridboard::persistence::{decode_collection, encode_collection};
use gridboard::types::{Item, ItemId, Position, ResourceRef};
use gridboard::{ItemStore, TransferOutcome};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddFile(bool, (i16, i16)),
    CreateFolder((i16, i16)),
    MoveToCanvas(usize, (i16, i16)),
    MoveIntoFolder(usize, usize),
    TakeChildOut(usize, usize, (i16, i16)),
    Reparent(usize, usize, usize),
    Remove(usize),
}

fn point() -> impl Strategy<Value = (i16, i16)> {
    (-2000i16..2000, -2000i16..2000)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), point()).prop_map(|(image, at)| Op::AddFile(image, at)),
        point().prop_map(Op::CreateFolder),
        (any::<usize>(), point()).prop_map(|(i, at)| Op::MoveToCanvas(i, at)),
        (any::<usize>(), any::<usize>()).prop_map(|(i, f)| Op::MoveIntoFolder(i, f)),
        (any::<usize>(), any::<usize>(), point()).prop_map(|(f, c, at)| Op::TakeChildOut(f, c, at)),
        (any::<usize>(), any::<usize>(), any::<usize>()).prop_map(|(f, c, t)| Op::Reparent(f, c, t)),
        (any::<usize>()).prop_map(Op::Remove),
    ]
}

fn pos((x, y): (i16, i16)) -> Position {
    Position::new(x as f64, y as f64)
}

/// Every id currently in the store, plus one that never exists.
fn known_ids(store: &ItemStore) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = store.get_all().iter_all().map(|item| item.id).collect();
    ids.push(ItemId::from(uuid::Uuid::nil()));
    ids
}

fn pick(ids: &[ItemId], i: usize) -> ItemId {
    ids[i % ids.len()]
}

fn apply(store: &mut ItemStore, op: &Op) -> Option<TransferOutcome> {
    let ids = known_ids(store);
    match op {
        Op::AddFile(image, at) => {
            let mime = if *image { "image/png" } else { "text/plain" };
            let id = ItemId::new();
            store.upsert_top_level(Item::uploaded(
                id,
                format!("{id}"),
                ResourceRef::new(format!("/uploads/{id}"), mime),
                pos(*at),
            ));
            None
        }
        Op::CreateFolder(at) => {
            store.create_folder("F", pos(*at));
            None
        }
        Op::MoveToCanvas(i, at) => Some(store.move_to_canvas(pick(&ids, *i), pos(*at))),
        Op::MoveIntoFolder(i, f) => Some(store.move_into_folder(pick(&ids, *i), pick(&ids, *f))),
        Op::TakeChildOut(f, c, at) => {
            Some(store.take_child_out(pick(&ids, *f), pick(&ids, *c), pos(*at)))
        }
        Op::Reparent(f, c, t) => {
            Some(store.reparent_child(pick(&ids, *f), pick(&ids, *c), pick(&ids, *t)))
        }
        Op::Remove(i) => {
            store.remove_by_id(pick(&ids, *i));
            None
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut store = ItemStore::new();
        for op in &ops {
            let before = store.get_all();
            let outcome = apply(&mut store, op);

            prop_assert!(store.validate().is_ok(), "{:?} broke the store: {:?}", op, store.validate());

            // Every id is in exactly one container
            let snapshot = store.get_all();
            prop_assert_eq!(snapshot.total_count(), store.len());

            // Transfers that did not move anything leave the collection as it was
            if let Some(outcome) = outcome {
                if !outcome.changed() {
                    prop_assert_eq!(&snapshot, &before);
                }
            }
        }
    }

    #[test]
    fn prop_saved_collections_round_trip(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut store = ItemStore::new();
        for op in &ops {
            apply(&mut store, op);
        }

        let collection = store.get_all();
        let json = encode_collection(&collection).unwrap();
        prop_assert_eq!(decode_collection(&json).unwrap(), collection);
    }
}
