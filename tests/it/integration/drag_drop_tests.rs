//! Drag-and-drop flows: payload in, drop target resolved, transfer applied.

use crate::helpers::{FakeUploader, TestBoardBuilder, fixed_id, image_item, position, raw};
use gridboard::input::CanvasBounds;
use gridboard::types::{Container, DragPayload, DropTarget};
use gridboard::TransferOutcome;

fn bounds() -> CanvasBounds {
    CanvasBounds::new(0.0, 0.0, 1200.0, 900.0)
}

#[test]
fn test_drag_item_onto_folder_tile() {
    let (mut board, _) = TestBoardBuilder::new()
        .with_item(image_item(fixed_id(1), "a.png", (0.0, 0.0)))
        .with_folder(fixed_id(10), "F", (400.0, 400.0))
        .build();

    let payload = DragPayload::TopLevelItem { id: fixed_id(1) }.encode();
    let target = board.drop_target_at(&bounds(), 450.0, 450.0, Some(fixed_id(1)));
    assert_eq!(target, DropTarget::Folder(fixed_id(10)));

    assert_eq!(board.handle_drop(&payload, target), Some(TransferOutcome::Moved));
    assert_eq!(
        board.store().find_container_of(fixed_id(1)),
        Some(Container::Folder(fixed_id(10)))
    );
}

#[test]
fn test_drag_child_out_to_empty_canvas() {
    let (mut board, _) = TestBoardBuilder::new()
        .with_item(image_item(fixed_id(1), "a.png", (0.0, 0.0)))
        .with_folder(fixed_id(10), "F", (400.0, 400.0))
        .build();
    board.move_into_folder(fixed_id(1), fixed_id(10));

    let payload = DragPayload::FolderChild {
        folder_id: fixed_id(10),
        child_id: fixed_id(1),
    }
    .encode();
    let target = board.drop_target_at(&bounds(), 100.0, 100.0, None);
    assert_eq!(target, DropTarget::Canvas(position(100.0, 100.0)));

    assert_eq!(board.handle_drop(&payload, target), Some(TransferOutcome::Moved));
    assert_eq!(board.store().position_of(fixed_id(1)), Some(position(100.0, 100.0)));
}

#[test]
fn test_drag_child_between_folders() {
    let (mut board, _) = TestBoardBuilder::new()
        .with_item(image_item(fixed_id(1), "a.png", (0.0, 0.0)))
        .with_folder(fixed_id(10), "F", (400.0, 0.0))
        .with_folder(fixed_id(11), "G", (800.0, 0.0))
        .build();
    board.move_into_folder(fixed_id(1), fixed_id(10));

    let payload = DragPayload::FolderChild {
        folder_id: fixed_id(10),
        child_id: fixed_id(1),
    }
    .encode();
    let target = board.drop_target_at(&bounds(), 850.0, 50.0, None);

    assert_eq!(board.handle_drop(&payload, target), Some(TransferOutcome::Moved));
    assert_eq!(board.store().children_of(fixed_id(11)), Some(&[fixed_id(1)][..]));
    assert_eq!(board.store().children_of(fixed_id(10)), Some(&[][..]));
}

#[test]
fn test_foreign_payload_is_ignored() {
    let (mut board, _) = TestBoardBuilder::new()
        .with_folder(fixed_id(10), "F", (0.0, 0.0))
        .build();
    let before = board.collection();

    assert_eq!(board.handle_drop("text/uri-list", DropTarget::Folder(fixed_id(10))), None);
    assert_eq!(board.handle_drop(r#"{"kind":"somethingElse"}"#, DropTarget::Canvas(position(1.0, 1.0))), None);
    assert_eq!(board.collection(), before);
}

#[tokio::test]
async fn test_external_files_land_at_drop_point() {
    let (mut board, _) = TestBoardBuilder::new().build();
    let uploader = FakeUploader::new();
    let b = CanvasBounds::new(20.0, 10.0, 800.0, 600.0);

    let report = board
        .drop_files(
            &uploader,
            vec![raw("a.png", "image/png"), raw("b.png", "image/png")],
            &b,
            220.0,
            110.0,
        )
        .await;

    assert_eq!(report.added.len(), 2);
    assert_eq!(board.store().position_of(report.added[0]), Some(position(200.0, 100.0)));
    assert_eq!(board.store().position_of(report.added[1]), Some(position(224.0, 124.0)));
}
