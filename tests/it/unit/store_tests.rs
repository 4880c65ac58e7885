//! ItemStore tests through the public API.

use crate::helpers::{file_item, fixed_id, image_item};
use gridboard::types::{Container, Item, ItemKind, Position};
use gridboard::ItemStore;

fn child_of(folder: &Item, item: Item) -> Item {
    Item {
        position: None,
        parent_folder_id: Some(folder.id),
        ..item
    }
}

#[test]
fn test_empty_store() {
    let store = ItemStore::new();
    assert!(store.is_empty());
    assert!(store.get_all().is_empty());
    assert_eq!(store.find_container_of(fixed_id(1)), None);
    assert!(store.validate().is_ok());
}

#[test]
fn test_snapshot_is_detached_from_store() {
    let mut store = ItemStore::new();
    store.upsert_top_level(image_item(fixed_id(1), "a.png", (0.0, 0.0)));

    let mut snapshot = store.get_all();
    snapshot.items[0].name = "tampered".to_string();
    snapshot.items.clear();

    assert_eq!(store.get(fixed_id(1)).map(|i| i.name), Some("a.png".to_string()));
    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn test_upsert_folder_with_children() {
    let mut folder = Item::folder(fixed_id(10), "F", Position::new(200.0, 0.0));
    folder.children.push(child_of(&folder, file_item(fixed_id(11), "a.txt", (0.0, 0.0))));
    folder.children.push(child_of(&folder, image_item(fixed_id(12), "b.png", (0.0, 0.0))));

    let mut store = ItemStore::new();
    assert!(store.upsert_top_level(folder));

    assert_eq!(store.len(), 3);
    assert_eq!(store.children_of(fixed_id(10)), Some(&[fixed_id(11), fixed_id(12)][..]));
    assert_eq!(store.find_container_of(fixed_id(12)), Some(Container::Folder(fixed_id(10))));
    assert_eq!(store.position_of(fixed_id(11)), None);
    assert!(store.validate().is_ok());
}

#[test]
fn test_upsert_refuses_nested_folder() {
    let mut folder = Item::folder(fixed_id(10), "F", Position::ORIGIN);
    let inner = Item::folder(fixed_id(11), "G", Position::ORIGIN);
    folder.children.push(child_of(&folder, inner));

    let mut store = ItemStore::new();
    assert!(!store.upsert_top_level(folder));
    assert!(store.is_empty());
}

#[test]
fn test_replacing_folder_drops_missing_children() {
    let mut folder = Item::folder(fixed_id(10), "F", Position::ORIGIN);
    folder.children.push(child_of(&folder, file_item(fixed_id(11), "a.txt", (0.0, 0.0))));
    folder.children.push(child_of(&folder, file_item(fixed_id(12), "b.txt", (0.0, 0.0))));

    let mut store = ItemStore::new();
    store.upsert_top_level(folder.clone());

    folder.children.remove(0);
    folder.name = "Renamed".to_string();
    assert!(store.upsert_top_level(folder));

    assert!(!store.contains(fixed_id(11)));
    assert_eq!(store.children_of(fixed_id(10)), Some(&[fixed_id(12)][..]));
    assert!(store.validate().is_ok());
}

#[test]
fn test_remove_folder_cascades() {
    let mut folder = Item::folder(fixed_id(10), "F", Position::ORIGIN);
    folder.children.push(child_of(&folder, file_item(fixed_id(11), "a.txt", (0.0, 0.0))));

    let mut store = ItemStore::new();
    store.upsert_top_level(folder);
    store.upsert_top_level(image_item(fixed_id(1), "keep.png", (5.0, 5.0)));

    assert!(store.remove_by_id(fixed_id(10)));
    assert!(!store.contains(fixed_id(11)));
    assert_eq!(store.top_level_ids(), &[fixed_id(1)]);
    assert!(store.validate().is_ok());
}

#[test]
fn test_remove_child_only_touches_folder() {
    let mut folder = Item::folder(fixed_id(10), "F", Position::ORIGIN);
    folder.children.push(child_of(&folder, file_item(fixed_id(11), "a.txt", (0.0, 0.0))));
    folder.children.push(child_of(&folder, file_item(fixed_id(12), "b.txt", (0.0, 0.0))));

    let mut store = ItemStore::new();
    store.upsert_top_level(folder);

    assert!(store.remove_by_id(fixed_id(11)));
    assert_eq!(store.children_of(fixed_id(10)), Some(&[fixed_id(12)][..]));
    assert_eq!(store.top_level_ids(), &[fixed_id(10)]);
}

#[test]
fn test_children_of_non_folder_is_none() {
    let mut store = ItemStore::new();
    store.upsert_top_level(image_item(fixed_id(1), "a.png", (0.0, 0.0)));
    assert_eq!(store.children_of(fixed_id(1)), None);
    assert_eq!(store.kind_of(fixed_id(1)), Some(ItemKind::Image));
}

#[test]
fn test_create_folder_is_empty_and_top_level() {
    let mut store = ItemStore::new();
    let id = store.create_folder("F", Position::new(1.0, 2.0));

    let folder = store.get(id).unwrap();
    assert!(folder.is_folder());
    assert!(folder.children.is_empty());
    assert_eq!(folder.position, Some(Position::new(1.0, 2.0)));
    assert_eq!(store.find_container_of(id), Some(Container::TopLevel));
}
