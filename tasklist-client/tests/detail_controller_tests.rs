mod common;

use common::{insert_all, make_task, next_value, sample_tasks, setup_repository, wait_for};
use std::time::Duration;
use tasklist_client::{ClientConfig, DetailController, TaskDraft};
use tasklist_core::{Action, Priority, Task, NEW_TASK_ID};

const MAX_TITLE_LENGTH: usize = 20;

#[tokio::test]
async fn test_load_task_fills_draft() {
    let (_db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);

    detail.load_task(3);
    assert!(detail.selected_task().is_loading());

    let state = wait_for(&mut detail.watch_selected_task(), |s| s.is_success()).await;
    assert_eq!(state.success().unwrap().as_ref(), Some(&sample_tasks()[2]));
    assert_eq!(detail.id(), 3);
    assert_eq!(detail.title(), "Task 3");
    assert_eq!(detail.description(), "Task 3 Description");
    assert_eq!(detail.priority(), Priority::High);
}

#[tokio::test]
async fn test_load_new_task_id_does_nothing() {
    let (db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);

    detail.load_task(NEW_TASK_ID);

    assert!(detail.selected_task().is_idle());
    assert_eq!(detail.draft(), TaskDraft::default());
    assert_eq!(db.change_subscriber_count(), 0);
}

#[tokio::test]
async fn test_load_missing_task_resets_draft() {
    let (_db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    detail.set_title("Half typed");
    detail.set_priority(Priority::High);

    detail.load_task(99);

    let state = wait_for(&mut detail.watch_selected_task(), |s| s.is_success()).await;
    assert_eq!(state.success(), Some(&None));
    assert_eq!(detail.draft(), TaskDraft::default());
}

#[tokio::test]
async fn test_store_changes_overwrite_draft() {
    let (_db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository.clone(), MAX_TITLE_LENGTH);
    detail.load_task(1);
    let mut draft = detail.watch_draft();
    wait_for(&mut draft, |d| d.id == 1).await;

    detail.set_title("Local edit");
    repository
        .update_task(&make_task(1, "Remote edit", "Changed elsewhere", Priority::None))
        .await
        .unwrap();

    let current = wait_for(&mut draft, |d| d.title == "Remote edit").await;
    assert_eq!(current.description, "Changed elsewhere");
    assert_eq!(current.priority, Priority::None);
}

#[tokio::test]
async fn test_update_task_fields() {
    let (_db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    let task = make_task(8, "Pay rent", "Before the 5th", Priority::High);

    detail.update_task_fields(Some(&task));
    assert_eq!(detail.draft().to_task(), task);

    detail.update_task_fields(None);
    assert_eq!(detail.draft(), TaskDraft::default());
}

#[tokio::test]
async fn test_set_title_respects_max_length() {
    let (_db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);

    assert!(detail.set_title("a".repeat(MAX_TITLE_LENGTH - 1)));
    assert_eq!(detail.title().len(), MAX_TITLE_LENGTH - 1);

    assert!(!detail.set_title("b".repeat(MAX_TITLE_LENGTH)));
    assert_eq!(detail.title(), "a".repeat(MAX_TITLE_LENGTH - 1));
}

#[tokio::test]
async fn test_set_title_counts_characters() {
    let (_db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, 5);

    // four characters, more than five bytes
    assert!(detail.set_title("éééé"));
    assert!(!detail.set_title("ééééé"));
    assert_eq!(detail.title(), "éééé");
}

#[tokio::test]
async fn test_with_config_uses_title_limit() {
    let (_db, repository, _) = setup_repository().await;
    let config = ClientConfig {
        max_title_length: 3,
        ..ClientConfig::default()
    };
    let detail = DetailController::with_config(repository, &config);

    assert_eq!(detail.max_title_length(), 3);
    assert!(detail.set_title("ab"));
    assert!(!detail.set_title("abc"));
}

#[tokio::test]
async fn test_set_description_and_priority() {
    let (_db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);

    detail.set_description("A rather long description with no limit at all");
    detail.set_priority(Priority::Medium);

    assert_eq!(
        detail.description(),
        "A rather long description with no limit at all"
    );
    assert_eq!(detail.priority(), Priority::Medium);
}

#[tokio::test]
async fn test_validate_requires_title_and_description() {
    let (_db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    assert!(!detail.validate());

    detail.set_title("Title");
    assert!(!detail.validate());

    detail.set_description("Description");
    assert!(detail.validate());

    detail.set_title("");
    assert!(!detail.validate());
}

#[tokio::test]
async fn test_commit_add_inserts_new_task() {
    let (db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository.clone(), MAX_TITLE_LENGTH);

    // a loaded draft still inserts as a new task
    detail.load_task(1);
    wait_for(&mut detail.watch_draft(), |d| d.id == 1).await;
    detail.set_title("Copy of Task 1");

    detail.commit(Action::Add).unwrap().await.unwrap().unwrap();

    assert_eq!(db.count_tasks().await.unwrap(), 4);
    let added = db.fetch_task(4).await.unwrap().unwrap();
    assert_eq!(added.title, "Copy of Task 1");
    assert_eq!(added.description, "Task 1 Description");
    assert_eq!(added.priority, Priority::Medium);
}

#[tokio::test]
async fn test_commit_update() {
    let (db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    detail.load_task(2);
    wait_for(&mut detail.watch_draft(), |d| d.id == 2).await;

    detail.set_title("Task 2 edited");
    detail.set_priority(Priority::High);
    detail.commit(Action::Update).unwrap().await.unwrap().unwrap();

    let stored = db.fetch_task(2).await.unwrap().unwrap();
    assert_eq!(stored.title, "Task 2 edited");
    assert_eq!(stored.priority, Priority::High);
    assert_eq!(db.count_tasks().await.unwrap(), 3);
}

#[tokio::test]
async fn test_commit_delete_then_undo() {
    let (db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository.clone(), MAX_TITLE_LENGTH);
    detail.load_task(1);
    wait_for(&mut detail.watch_draft(), |d| d.id == 1).await;

    detail.commit(Action::Delete).unwrap().await.unwrap().unwrap();
    assert_eq!(db.fetch_task(1).await.unwrap(), None);

    // the list re-inserts the deleted snapshot
    detail.update_task_fields(Some(&sample_tasks()[0]));
    detail.commit(Action::Undo).unwrap().await.unwrap().unwrap();

    let tasks = next_value(&mut repository.get_all_tasks()).await;
    assert_eq!(tasks.len(), 3);
    let restored = tasks.iter().find(|t| t.title == "Task 1").unwrap();
    assert_eq!(restored.description, "Task 1 Description");
    assert_eq!(restored.priority, Priority::Medium);
}

#[tokio::test]
async fn test_commit_delete_all() {
    let (db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);

    detail.commit(Action::DeleteAll).unwrap().await.unwrap().unwrap();

    assert_eq!(db.count_tasks().await.unwrap(), 0);
}

#[tokio::test]
async fn test_commit_no_action_touches_nothing() {
    let (db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    detail.set_title("Ignored");
    detail.set_description("Ignored");
    let emitted = db.notifier().emit_count();

    assert!(detail.commit(Action::NoAction).is_none());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(db.notifier().emit_count(), emitted);
    assert_eq!(db.count_tasks().await.unwrap(), 3);
}

#[tokio::test]
async fn test_commit_does_not_validate() {
    let (db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    assert!(!detail.validate());

    detail.commit(Action::Add).unwrap().await.unwrap().unwrap();

    let stored: Vec<Task> = db.fetch_all_tasks().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].title.is_empty());
    assert_eq!(stored[0].priority, Priority::Low);
}

#[tokio::test]
async fn test_commit_failure_is_returned() {
    let (db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    detail.set_title("Title");
    detail.set_description("Description");
    db.close().await;

    let err = detail
        .commit(Action::Add)
        .unwrap()
        .await
        .unwrap()
        .unwrap_err();
    assert!(err.is_store_failure());
}

#[tokio::test]
async fn test_load_task_after_close_is_an_error() {
    let (db, repository, _) = setup_repository().await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);
    db.close().await;

    detail.load_task(1);

    let state = wait_for(&mut detail.watch_selected_task(), |s| s.is_error()).await;
    assert!(state.error().unwrap().is_store_failure());
    assert_eq!(detail.draft(), TaskDraft::default());
}

#[tokio::test]
async fn test_reloading_follows_only_latest_task() {
    let (db, repository, _) = setup_repository().await;
    insert_all(&repository, &sample_tasks()).await;
    let detail = DetailController::new(repository, MAX_TITLE_LENGTH);

    detail.load_task(1);
    detail.load_task(2);

    let draft = wait_for(&mut detail.watch_draft(), |d| d.id != 0).await;
    assert_eq!(draft.id, 2);
    common::wait_for_subscribers(&db, 1).await;

    detail.cancel_all();
    common::wait_for_subscribers(&db, 0).await;
}
