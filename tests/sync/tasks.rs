use chrono::{Duration, Local};
use tasklist::models::{ListDraft, TaskDraft, TaskPatch};
use tasklist::repositories::TaskRepository;
use tasklist::SyncState;

use super::fake::{harness, FakeBackend, Harness};

async fn groceries(h: &Harness) -> i64 {
    h.sync.create_list(&ListDraft::new("Groceries")).await.unwrap().value.id
}

#[tokio::test]
async fn test_groceries_milk_check_scenario() {
    let backend = FakeBackend::new();
    let h = harness(Some(backend.clone())).await;
    let list_id = groceries(&h).await;

    let milk = h.sync.create_task(list_id, &TaskDraft::new("Milk")).await.unwrap().value;
    assert!(!milk.starred);
    assert!(!milk.completed);

    let checked = h.sync.check_task(&milk).await.unwrap();
    assert!(checked.is_remote());
    assert!(checked.value.completed);
    assert_eq!(checked.value.completion_rate, 100);

    let remote = backend.task(milk.remote_id.unwrap()).unwrap();
    assert!(remote.completed);
    assert_eq!(remote.completion_rate, 100);

    let reopened = h.sync.check_task(&checked.value).await.unwrap().value;
    assert!(!reopened.completed);
    assert_eq!(reopened.completion_rate, 0);
}

#[tokio::test]
async fn test_star_twice_restores_value() {
    let backend = FakeBackend::new();
    let h = harness(Some(backend)).await;
    let list_id = groceries(&h).await;
    let task = h.sync.create_task(list_id, &TaskDraft::new("Bread")).await.unwrap().value;

    let once = h.sync.star_task(&task).await.unwrap().value;
    assert!(once.starred);
    let twice = h.sync.star_task(&once).await.unwrap().value;
    assert_eq!(twice.starred, task.starred);
}

#[tokio::test]
async fn test_setters_are_idempotent() {
    let h = harness(None).await;
    let list_id = groceries(&h).await;
    let task = h.sync.create_task(list_id, &TaskDraft::new("Eggs")).await.unwrap().value;

    h.sync.set_starred(task.id, true).await.unwrap();
    let again = h.sync.set_starred(task.id, true).await.unwrap().value;
    assert!(again.starred);

    h.sync.set_completed(task.id, true).await.unwrap();
    let again = h.sync.set_completed(task.id, true).await.unwrap().value;
    assert!(again.completed);
    assert_eq!(again.completion_rate, 100);
}

#[tokio::test]
async fn test_offline_check_is_pending() {
    let backend = FakeBackend::new();
    let h = harness(Some(backend.clone())).await;
    let list_id = groceries(&h).await;
    let milk = h.sync.create_task(list_id, &TaskDraft::new("Milk")).await.unwrap().value;

    backend.go_offline();
    let checked = h.sync.check_task(&milk).await.unwrap();

    assert_eq!(checked.fallback_reason(), Some("connection refused"));
    assert!(checked.value.completed);
    assert_eq!(checked.value.completion_rate, 100);
    assert_eq!(checked.value.sync_state, SyncState::Pending);
    assert!(!backend.task(milk.remote_id.unwrap()).unwrap().completed);
}

#[tokio::test]
async fn test_online_edit_carries_earlier_offline_edits() {
    let backend = FakeBackend::new();
    let h = harness(Some(backend.clone())).await;
    let list_id = groceries(&h).await;
    let milk = h.sync.create_task(list_id, &TaskDraft::new("Milk")).await.unwrap().value;

    backend.go_offline();
    h.sync.set_starred(milk.id, true).await.unwrap();

    backend.go_online();
    let renamed = TaskPatch {
        title: Some("Oat milk".to_string()),
        ..Default::default()
    };
    let updated = h.sync.update_task(milk.id, &renamed).await.unwrap();

    assert!(updated.is_remote());
    assert_eq!(updated.value.sync_state, SyncState::Synced);
    let remote = backend.task(milk.remote_id.unwrap()).unwrap();
    assert_eq!(remote.title, "Oat milk");
    assert!(remote.starred);
}

#[tokio::test]
async fn test_edit_clears_description_and_deadline() {
    let backend = FakeBackend::new();
    let h = harness(Some(backend.clone())).await;
    let list_id = groceries(&h).await;
    let draft = TaskDraft {
        description: Some("Two litres".to_string()),
        deadline: Some(Local::now().date_naive()),
        ..TaskDraft::new("Milk")
    };
    let milk = h.sync.create_task(list_id, &draft).await.unwrap().value;
    let bread = h.sync.create_task(list_id, &draft).await.unwrap().value;
    let clear = TaskPatch {
        description: Some(None),
        deadline: Some(None),
        ..Default::default()
    };

    let cleared = h.sync.update_task(milk.id, &clear).await.unwrap();
    assert!(cleared.is_remote());
    assert_eq!(cleared.value.description, None);
    assert_eq!(cleared.value.deadline, None);
    assert_eq!(backend.task(milk.remote_id.unwrap()).unwrap().deadline, None);

    backend.go_offline();
    let cleared = h.sync.update_task(bread.id, &clear).await.unwrap();
    assert_eq!(cleared.value.sync_state, SyncState::Pending);
    assert_eq!(cleared.value.description, None);
    assert_eq!(cleared.value.deadline, None);

    backend.go_online();
    assert_eq!(h.sync.reconcile().await.unwrap().pushed, 1);
    let remote = backend.task(bread.remote_id.unwrap()).unwrap();
    assert_eq!(remote.description, None);
    assert_eq!(remote.deadline, None);
}

#[tokio::test]
async fn test_empty_patch_is_rejected() {
    let h = harness(None).await;
    let list_id = groceries(&h).await;
    let task = h.sync.create_task(list_id, &TaskDraft::new("Milk")).await.unwrap().value;

    assert!(h.sync.update_task(task.id, &TaskPatch::default()).await.is_err());
}

#[tokio::test]
async fn test_invalid_rate_is_rejected() {
    let h = harness(None).await;
    let list_id = groceries(&h).await;
    let draft = TaskDraft {
        completion_rate: 101,
        ..TaskDraft::new("Milk")
    };

    assert!(h.sync.create_task(list_id, &draft).await.is_err());
    assert!(h.sync.get_tasks(list_id).await.unwrap().value.is_empty());
}

#[tokio::test]
async fn test_get_tasks_refreshes_from_backend() {
    let backend = FakeBackend::new();
    let remote_list = backend.seed_list("Groceries");
    backend.seed_task(remote_list, "Milk", None);
    backend.seed_task(remote_list, "Bread", None);
    let h = harness(Some(backend.clone())).await;
    let list_id = h.sync.get_lists().await.unwrap().value[0].id;

    let tasks = h.sync.get_tasks(list_id).await.unwrap();
    assert!(tasks.is_remote());
    assert_eq!(tasks.value.len(), 2);

    backend.go_offline();
    let cached = h.sync.get_tasks(list_id).await.unwrap();
    assert_eq!(cached.fallback_reason(), Some("connection refused"));
    assert_eq!(cached.value.len(), 2);
}

#[tokio::test]
async fn test_tasks_of_unsynced_list_stay_local() {
    let backend = FakeBackend::new();
    backend.go_offline();
    let h = harness(Some(backend.clone())).await;
    let list_id = groceries(&h).await;

    backend.go_online();
    let created = h.sync.create_task(list_id, &TaskDraft::new("Milk")).await.unwrap();
    assert_eq!(created.fallback_reason(), Some("List not yet synced"));
    assert_eq!(created.value.sync_state, SyncState::Pending);
    assert!(backend.tasks().is_empty());
}

#[tokio::test]
async fn test_delete_task_offline_then_hidden() {
    let backend = FakeBackend::new();
    let h = harness(Some(backend.clone())).await;
    let list_id = groceries(&h).await;
    let milk = h.sync.create_task(list_id, &TaskDraft::new("Milk")).await.unwrap().value;

    backend.go_offline();
    h.sync.delete_task(milk.id).await.unwrap();

    assert!(h.sync.get_tasks(list_id).await.unwrap().value.is_empty());
    let storage = h.storage.lock().await;
    let tombstone = TaskRepository::require(&storage.conn, milk.id).await.unwrap();
    assert_eq!(tombstone.sync_state, SyncState::Deleted);
}

#[tokio::test]
async fn test_deleted_task_cannot_be_revived() {
    let backend = FakeBackend::new();
    let h = harness(Some(backend.clone())).await;
    let list_id = groceries(&h).await;
    let milk = h.sync.create_task(list_id, &TaskDraft::new("Milk")).await.unwrap().value;

    backend.go_offline();
    h.sync.delete_task(milk.id).await.unwrap();

    backend.go_online();
    assert!(h.sync.star_task(&milk).await.is_err());
    assert!(h.sync.check_task(&milk).await.is_err());
    let renamed = TaskPatch {
        title: Some("Oat milk".to_string()),
        ..Default::default()
    };
    assert!(h.sync.update_task(milk.id, &renamed).await.is_err());
    assert!(h.sync.get_task(milk.id).await.is_err());

    backend.go_offline();
    assert!(h.sync.set_starred(milk.id, true).await.is_err());

    let remote = backend.task(milk.remote_id.unwrap()).unwrap();
    assert!(!remote.starred);
    assert!(!remote.completed);
    assert_eq!(remote.title, "Milk");
    {
        let storage = h.storage.lock().await;
        let tombstone = TaskRepository::require(&storage.conn, milk.id).await.unwrap();
        assert_eq!(tombstone.sync_state, SyncState::Deleted);
    }

    backend.go_online();
    assert!(h.sync.get_tasks(list_id).await.unwrap().value.is_empty());
    assert_eq!(h.sync.reconcile().await.unwrap().pushed, 1);
    assert!(backend.tasks().is_empty());
}

#[tokio::test]
async fn test_views_starred_completed_and_due_today() {
    let backend = FakeBackend::new();
    let remote_list = backend.seed_list("Home");
    let today = Local::now().date_naive();
    backend.seed_task(remote_list, "Pay rent", Some(today));
    backend.seed_task(remote_list, "Plan trip", Some(today + Duration::days(3)));
    let h = harness(Some(backend.clone())).await;
    let list_id = h.sync.get_lists().await.unwrap().value[0].id;

    let due = h.sync.get_tasks_due_today().await.unwrap();
    assert!(due.is_remote());
    let titles: Vec<&str> = due.value.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Pay rent"]);

    let tasks = h.sync.get_tasks(list_id).await.unwrap().value;
    let trip = tasks.iter().find(|task| task.title == "Plan trip").unwrap();
    let rent = tasks.iter().find(|task| task.title == "Pay rent").unwrap();
    h.sync.star_task(trip).await.unwrap();
    h.sync.check_task(rent).await.unwrap();

    let starred = h.sync.get_starred_tasks().await.unwrap();
    assert_eq!(starred.len(), 1);
    assert_eq!(starred[0].title, "Plan trip");

    let completed = h.sync.get_completed_tasks().await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "Pay rent");
}

#[tokio::test]
async fn test_get_task_refreshes_single_row() {
    let backend = FakeBackend::new();
    let remote_list = backend.seed_list("Home");
    let remote_task = backend.seed_task(remote_list, "Vacuum", None);
    let h = harness(Some(backend.clone())).await;
    let list_id = h.sync.get_lists().await.unwrap().value[0].id;
    let local = h.sync.get_tasks(list_id).await.unwrap().value[0].clone();
    assert_eq!(local.remote_id, Some(remote_task));

    backend.remove_list(remote_list);
    let fetched = h.sync.get_task(local.id).await.unwrap();
    assert_eq!(fetched.fallback_reason(), Some("Not Found"));
    assert_eq!(fetched.value.title, "Vacuum");
}
