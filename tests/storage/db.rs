use tasklist::config::StorageConfig;
use tasklist::models::ListDraft;
use tasklist::repositories::ListRepository;
use tasklist::storage::LocalStorage;
use tasklist::SyncState;

#[tokio::test]
async fn test_local_storage_creation() {
    let result = LocalStorage::in_memory().await;
    assert!(result.is_ok(), "LocalStorage should be created successfully");
    assert!(!result.unwrap().has_data().await.unwrap());
}

#[tokio::test]
async fn test_schema_init_is_idempotent() {
    let storage = LocalStorage::in_memory().await.unwrap();
    ListRepository::create(&storage.conn, &ListDraft::new("Inbox"), None, SyncState::Synced)
        .await
        .unwrap();

    storage.init_schema().await.unwrap();
    assert!(storage.has_data().await.unwrap());
}

#[tokio::test]
async fn test_file_database_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: Some(dir.path().join("data").join("tasks.db")),
        ..Default::default()
    };

    {
        let storage = LocalStorage::new(&config).await.unwrap();
        ListRepository::create(&storage.conn, &ListDraft::new("Work"), None, SyncState::Pending)
            .await
            .unwrap();
    }

    let reopened = LocalStorage::new(&config).await.unwrap();
    let lists = ListRepository::get_all(&reopened.conn).await.unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Work");
    assert_eq!(lists[0].sync_state, SyncState::Pending);
}

#[tokio::test]
async fn test_clear_all_data() {
    let storage = LocalStorage::in_memory().await.unwrap();
    ListRepository::create(&storage.conn, &ListDraft::new("Inbox"), None, SyncState::Synced)
        .await
        .unwrap();

    storage.clear_all_data().await.unwrap();
    assert!(!storage.has_data().await.unwrap());
}
