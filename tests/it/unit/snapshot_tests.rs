//! Snapshot tests using the insta crate.
//!
//! The saved JSON is the one format that has to stay stable across versions,
//! so it is pinned here. To update after an intentional change:
//! ```sh
//! cargo insta test --accept
//! ```

use crate::helpers::{file_item, fixed_id, image_item};
use gridboard::persistence::StoredItem;
use gridboard::types::{DragPayload, Item, Position};
use gridboard::ItemStore;

#[test]
fn snapshot_saved_collection() {
    let mut store = ItemStore::new();
    store.upsert_top_level(Item::folder(fixed_id(1), "F", Position::new(300.0, 300.0)));
    store.upsert_top_level(file_item(fixed_id(2), "b.txt", (64.0, 64.0)));
    store.upsert_top_level(image_item(fixed_id(3), "a.png", (40.0, 40.0)));
    store.move_into_folder(fixed_id(2), fixed_id(1));

    let stored: Vec<StoredItem> = store.get_all().items.iter().map(StoredItem::from_item).collect();
    let json = serde_json::to_string_pretty(&stored).unwrap();

    insta::assert_snapshot!(json, @r#"
    [
      {
        "id": "00000000-0000-0000-0000-000000000001",
        "name": "F",
        "type": "folder",
        "url": null,
        "x": 300.0,
        "y": 300.0,
        "parentFolderId": null,
        "children": [
          {
            "id": "00000000-0000-0000-0000-000000000002",
            "name": "b.txt",
            "type": "file",
            "url": "/uploads/b.txt",
            "mime": "text/plain",
            "x": 0.0,
            "y": 0.0,
            "parentFolderId": "00000000-0000-0000-0000-000000000001"
          }
        ]
      },
      {
        "id": "00000000-0000-0000-0000-000000000003",
        "name": "a.png",
        "type": "image",
        "url": "/uploads/a.png",
        "mime": "image/png",
        "x": 40.0,
        "y": 40.0,
        "parentFolderId": null
      }
    ]
    "#);
}

#[test]
fn snapshot_drag_payloads() {
    let top = DragPayload::TopLevelItem { id: fixed_id(1) };
    let child = DragPayload::FolderChild {
        folder_id: fixed_id(2),
        child_id: fixed_id(3),
    };

    insta::assert_snapshot!(top.encode(), @r#"{"kind":"topLevelItem","id":"00000000-0000-0000-0000-000000000001"}"#);
    insta::assert_snapshot!(child.encode(), @r#"{"kind":"folderChild","folderId":"00000000-0000-0000-0000-000000000002","childId":"00000000-0000-0000-0000-000000000003"}"#);
}
