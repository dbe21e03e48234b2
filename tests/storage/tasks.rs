use chrono::NaiveDate;
use tasklist::models::{ListDraft, Task, TaskDraft, TaskPatch};
use tasklist::repositories::{ListRepository, TaskRepository};
use tasklist::storage::LocalStorage;
use tasklist::SyncState;

async fn storage_with_list(name: &str) -> (LocalStorage, i64) {
    let storage = LocalStorage::in_memory().await.unwrap();
    let list = ListRepository::create(&storage.conn, &ListDraft::new(name), None, SyncState::Synced)
        .await
        .unwrap();
    (storage, list.id)
}

#[tokio::test]
async fn test_create_task_defaults() {
    let (storage, list_id) = storage_with_list("Groceries").await;

    let model = TaskRepository::create(&storage.conn, list_id, &TaskDraft::new("Milk"), None, SyncState::Pending)
        .await
        .unwrap();
    let task = Task::try_from(model).unwrap();

    assert_eq!(task.title, "Milk");
    assert_eq!(task.list_id, list_id);
    assert!(!task.starred);
    assert!(!task.completed);
    assert_eq!(task.completion_rate, 0);
    assert_eq!(task.deadline, None);
    assert_eq!(task.sync_state, SyncState::Pending);
}

#[tokio::test]
async fn test_check_sets_completion_rate() {
    let (storage, list_id) = storage_with_list("Groceries").await;
    let task = TaskRepository::create(&storage.conn, list_id, &TaskDraft::new("Milk"), None, SyncState::Synced)
        .await
        .unwrap();

    let done = TaskRepository::check(&storage.conn, task.id, true, SyncState::Pending)
        .await
        .unwrap();
    assert!(done.completed);
    assert_eq!(done.completion_rate, 100);

    let reopened = TaskRepository::check(&storage.conn, task.id, false, SyncState::Pending)
        .await
        .unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completion_rate, 0);
}

#[tokio::test]
async fn test_star_twice_restores_value() {
    let (storage, list_id) = storage_with_list("Work").await;
    let task = TaskRepository::create(&storage.conn, list_id, &TaskDraft::new("Report"), None, SyncState::Synced)
        .await
        .unwrap();

    let starred = TaskRepository::star(&storage.conn, task.id, !task.starred, SyncState::Synced)
        .await
        .unwrap();
    let restored = TaskRepository::star(&storage.conn, task.id, !starred.starred, SyncState::Synced)
        .await
        .unwrap();
    assert_eq!(restored.starred, task.starred);
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields() {
    let (storage, list_id) = storage_with_list("Work").await;
    let draft = TaskDraft {
        description: Some("Quarterly numbers".to_string()),
        ..TaskDraft::new("Report")
    };
    let task = TaskRepository::create(&storage.conn, list_id, &draft, None, SyncState::Synced)
        .await
        .unwrap();

    let deadline = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
    let patch = TaskPatch {
        deadline: Some(Some(deadline)),
        completion_rate: Some(40),
        ..Default::default()
    };
    let updated = Task::try_from(
        TaskRepository::update(&storage.conn, task.id, &patch, SyncState::Pending)
            .await
            .unwrap(),
    )
    .unwrap();

    assert_eq!(updated.title, "Report");
    assert_eq!(updated.description.as_deref(), Some("Quarterly numbers"));
    assert_eq!(updated.deadline, Some(deadline));
    assert_eq!(updated.completion_rate, 40);
    assert_eq!(updated.sync_state, SyncState::Pending);
}

#[tokio::test]
async fn test_views() {
    let (storage, list_id) = storage_with_list("Home").await;
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    let starred = TaskDraft {
        starred: true,
        ..TaskDraft::new("Water plants")
    };
    let due = TaskDraft {
        deadline: Some(today),
        ..TaskDraft::new("Pay rent")
    };
    let a = TaskRepository::create(&storage.conn, list_id, &starred, None, SyncState::Synced)
        .await
        .unwrap();
    let b = TaskRepository::create(&storage.conn, list_id, &due, None, SyncState::Synced)
        .await
        .unwrap();
    TaskRepository::check(&storage.conn, b.id, true, SyncState::Synced)
        .await
        .unwrap();

    let starred_ids: Vec<i64> = TaskRepository::get_starred(&storage.conn)
        .await
        .unwrap()
        .iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(starred_ids, vec![a.id]);

    let completed = TaskRepository::get_completed(&storage.conn).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, b.id);

    let due_today = TaskRepository::get_due_on(&storage.conn, today).await.unwrap();
    assert_eq!(due_today.len(), 1);
    assert_eq!(due_today[0].title, "Pay rent");

    // Completing a starred task drops it from the starred view
    TaskRepository::check(&storage.conn, a.id, true, SyncState::Synced)
        .await
        .unwrap();
    assert!(TaskRepository::get_starred(&storage.conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_open_tasks_listed_first() {
    let (storage, list_id) = storage_with_list("Errands").await;
    let first = TaskRepository::create(&storage.conn, list_id, &TaskDraft::new("Bank"), None, SyncState::Synced)
        .await
        .unwrap();
    let second = TaskRepository::create(&storage.conn, list_id, &TaskDraft::new("Post"), None, SyncState::Synced)
        .await
        .unwrap();
    TaskRepository::check(&storage.conn, first.id, true, SyncState::Synced)
        .await
        .unwrap();

    let ids: Vec<i64> = TaskRepository::get_for_list(&storage.conn, list_id)
        .await
        .unwrap()
        .iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_deleting_list_cascades_to_tasks() {
    let (storage, list_id) = storage_with_list("Groceries").await;
    let task = TaskRepository::create(&storage.conn, list_id, &TaskDraft::new("Milk"), None, SyncState::Synced)
        .await
        .unwrap();

    ListRepository::delete(&storage.conn, list_id).await.unwrap();

    assert!(TaskRepository::get_by_id(&storage.conn, task.id).await.unwrap().is_none());
    assert!(TaskRepository::get_for_list(&storage.conn, list_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_task_requires_existing_list() {
    let storage = LocalStorage::in_memory().await.unwrap();
    let result = TaskRepository::create(&storage.conn, 999, &TaskDraft::new("Orphan"), None, SyncState::Pending).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_prune_only_touches_one_list() {
    let (storage, groceries) = storage_with_list("Groceries").await;
    let work = ListRepository::create(&storage.conn, &ListDraft::new("Work"), None, SyncState::Synced)
        .await
        .unwrap();
    TaskRepository::create(&storage.conn, groceries, &TaskDraft::new("Milk"), Some(10), SyncState::Synced)
        .await
        .unwrap();
    TaskRepository::create(&storage.conn, work.id, &TaskDraft::new("Report"), Some(20), SyncState::Synced)
        .await
        .unwrap();

    let pruned = TaskRepository::prune_synced_except(&storage.conn, groceries, &[])
        .await
        .unwrap();
    assert_eq!(pruned, 1);
    assert_eq!(TaskRepository::get_for_list(&storage.conn, work.id).await.unwrap().len(), 1);
}
