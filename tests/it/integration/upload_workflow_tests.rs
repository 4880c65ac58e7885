//! Upload batches against the board: partial failure, cancellation, ordering.

use crate::helpers::{FakeUploader, empty_board, position, raw, saved_collection};
use gridboard::types::ItemKind;
use gridboard::upload::UploadCoordinator;

#[tokio::test]
async fn test_partial_failure_keeps_successes() {
    let (mut board, store) = empty_board();
    let uploader = FakeUploader::new().failing("broken.pdf");

    let report = board
        .add_files_at_default(
            &uploader,
            vec![
                raw("a.png", "image/png"),
                raw("broken.pdf", "application/pdf"),
                raw("c.txt", "text/plain"),
            ],
        )
        .await;

    assert_eq!(report.added.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "broken.pdf");
    assert!(!report.is_complete_success());

    // Slots keep their file index, so the gap stays where the failure was
    let collection = board.collection();
    assert_eq!(collection.items[0].position, Some(position(40.0, 40.0)));
    assert_eq!(collection.items[1].position, Some(position(88.0, 88.0)));
    assert_eq!(collection.items[1].kind, ItemKind::File);

    // One batch, one save
    assert_eq!(board.revision(), 1);
    assert_eq!(saved_collection(&store).unwrap().len(), 2);
}

#[tokio::test]
async fn test_results_appended_in_file_order() {
    let (mut board, _) = empty_board();
    let uploader = FakeUploader::new().delayed("slow.png", 40).delayed("fast.png", 1);

    let report = board
        .add_files(
            &uploader,
            vec![raw("slow.png", "image/png"), raw("fast.png", "image/png")],
            position(0.0, 0.0),
        )
        .await;

    let names: Vec<String> = board.collection().items.into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["slow.png", "fast.png"]);
    assert_eq!(report.added.len(), 2);
}

#[tokio::test]
async fn test_all_failures_change_nothing() {
    let (mut board, store) = empty_board();
    let uploader = FakeUploader::new().failing("a.png");

    let report = board
        .add_files(&uploader, vec![raw("a.png", "image/png")], position(0.0, 0.0))
        .await;

    assert!(report.added.is_empty());
    assert_eq!(board.revision(), 0);
    assert!(store.get(crate::helpers::TEST_KEY).is_none());
}

#[tokio::test]
async fn test_empty_batch_is_noop() {
    let (mut board, _) = empty_board();
    let uploader = FakeUploader::new();

    let report = board.add_files(&uploader, Vec::new(), position(0.0, 0.0)).await;

    assert!(report.added.is_empty() && report.failed.is_empty());
    assert!(uploader.calls().is_empty());
    assert_eq!(board.revision(), 0);
}

#[tokio::test]
async fn test_removed_pending_item_is_not_added() {
    let (mut board, _) = empty_board();
    let uploader = FakeUploader::new();
    let files = vec![raw("a.png", "image/png"), raw("b.png", "image/png")];

    let pending = board.begin_upload(&files, position(40.0, 40.0));
    let doomed = pending.entries()[1].id;
    assert_eq!(board.pending_uploads().count(), 2);

    // User removes the placeholder while the upload is in flight
    assert!(board.remove_item(doomed));

    let results = UploadCoordinator::upload_all(&uploader, &files).await;
    let report = board.finish_upload(pending, results);

    assert_eq!(report.cancelled, vec![doomed]);
    assert_eq!(report.added.len(), 1);
    assert!(board.get(doomed).is_none());
    assert_eq!(board.pending_uploads().count(), 0);
    assert_eq!(board.collection().len(), 1);
}
