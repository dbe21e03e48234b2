use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use tasklist::backend::{
    Backend, BackendError, BackendList, BackendTask, ChangePasswordArgs, CreateTaskArgs, Credentials, ListArgs,
    Profile, RegisterArgs, UpdateTaskArgs,
};
use tasklist::session::{AuthSession, ReloadCoordinator};
use tasklist::storage::LocalStorage;
use tasklist::sync::SyncService;
use tasklist::utils::datetime;

pub const TOKEN: &str = "secret";

#[derive(Default)]
struct FakeState {
    lists: BTreeMap<i64, BackendList>,
    tasks: BTreeMap<i64, BackendTask>,
    next_id: i64,
    failure: Option<BackendError>,
    calls: usize,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process stand-in for the REST service.
///
/// Accepts only [`TOKEN`]; while a failure is set every call returns it.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_with(&self, failure: Option<BackendError>) {
        self.state.lock().unwrap().failure = failure;
    }

    pub fn go_offline(&self) {
        self.fail_with(Some(BackendError::Network("connection refused".to_string())));
    }

    pub fn go_online(&self) {
        self.fail_with(None);
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn seed_list(&self, name: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.lists.insert(
            id,
            BackendList {
                remote_id: id,
                name: name.to_string(),
                description: None,
                created_at: None,
                updated_at: None,
            },
        );
        id
    }

    pub fn seed_task(&self, list_remote_id: i64, title: &str, deadline: Option<chrono::NaiveDate>) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.tasks.insert(
            id,
            BackendTask {
                remote_id: id,
                title: title.to_string(),
                description: None,
                starred: false,
                completed: false,
                deadline,
                completion_rate: 0,
                list_remote_id,
                created_at: None,
                updated_at: None,
            },
        );
        id
    }

    pub fn remove_list(&self, remote_id: i64) {
        let mut state = self.state.lock().unwrap();
        state.lists.remove(&remote_id);
        state.tasks.retain(|_, task| task.list_remote_id != remote_id);
    }

    pub fn lists(&self) -> Vec<BackendList> {
        self.state.lock().unwrap().lists.values().cloned().collect()
    }

    pub fn tasks(&self) -> Vec<BackendTask> {
        self.state.lock().unwrap().tasks.values().cloned().collect()
    }

    pub fn task(&self, remote_id: i64) -> Option<BackendTask> {
        self.state.lock().unwrap().tasks.get(&remote_id).cloned()
    }

    /// Count the call and return the scripted failure or the auth check.
    fn enter(&self, token: Option<&str>) -> Result<std::sync::MutexGuard<'_, FakeState>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if let Some(failure) = state.failure.clone() {
            return Err(failure);
        }
        if let Some(token) = token {
            if token != TOKEN {
                return Err(BackendError::from_status(401));
            }
        }
        Ok(state)
    }
}

fn parse_deadline(deadline: &Option<String>) -> Option<chrono::NaiveDate> {
    deadline.as_deref().and_then(|text| datetime::parse_date(text).ok())
}

#[async_trait]
impl Backend for FakeBackend {
    fn backend_type(&self) -> &str {
        "fake"
    }

    async fn register(&self, args: &RegisterArgs) -> Result<Profile, BackendError> {
        let mut state = self.enter(None)?;
        Ok(Profile {
            id: state.next_id(),
            username: args.username.clone(),
            email: args.email.clone(),
        })
    }

    async fn log_in(&self, credentials: &Credentials) -> Result<String, BackendError> {
        self.enter(None)?;
        if credentials.password == "hunter2" {
            Ok(TOKEN.to_string())
        } else {
            Err(BackendError::from_status(400))
        }
    }

    async fn log_out(&self, token: &str) -> Result<(), BackendError> {
        self.enter(Some(token))?;
        Ok(())
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile, BackendError> {
        self.enter(Some(token))?;
        Ok(Profile {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        })
    }

    async fn change_password(&self, token: &str, args: &ChangePasswordArgs) -> Result<(), BackendError> {
        self.enter(Some(token))?;
        if args.current_password == "hunter2" {
            Ok(())
        } else {
            Err(BackendError::from_status(400))
        }
    }

    async fn fetch_lists(&self, token: &str) -> Result<Vec<BackendList>, BackendError> {
        let state = self.enter(Some(token))?;
        Ok(state.lists.values().cloned().collect())
    }

    async fn create_list(&self, token: &str, args: &ListArgs) -> Result<BackendList, BackendError> {
        let mut state = self.enter(Some(token))?;
        let id = state.next_id();
        let list = BackendList {
            remote_id: id,
            name: args.name.clone(),
            description: Some(args.description.clone()).filter(|d| !d.is_empty()),
            created_at: None,
            updated_at: None,
        };
        state.lists.insert(id, list.clone());
        Ok(list)
    }

    async fn update_list(&self, token: &str, remote_id: i64, args: &ListArgs) -> Result<BackendList, BackendError> {
        let mut state = self.enter(Some(token))?;
        let list = state
            .lists
            .get_mut(&remote_id)
            .ok_or_else(|| BackendError::from_status(404))?;
        list.name = args.name.clone();
        list.description = Some(args.description.clone()).filter(|d| !d.is_empty());
        Ok(list.clone())
    }

    async fn delete_list(&self, token: &str, remote_id: i64) -> Result<(), BackendError> {
        let mut state = self.enter(Some(token))?;
        state
            .lists
            .remove(&remote_id)
            .ok_or_else(|| BackendError::from_status(404))?;
        state.tasks.retain(|_, task| task.list_remote_id != remote_id);
        Ok(())
    }

    async fn fetch_tasks(&self, token: &str, list_remote_id: i64) -> Result<Vec<BackendTask>, BackendError> {
        let state = self.enter(Some(token))?;
        if !state.lists.contains_key(&list_remote_id) {
            return Err(BackendError::from_status(404));
        }
        Ok(state
            .tasks
            .values()
            .filter(|task| task.list_remote_id == list_remote_id)
            .cloned()
            .collect())
    }

    async fn fetch_task(&self, token: &str, remote_id: i64) -> Result<BackendTask, BackendError> {
        let state = self.enter(Some(token))?;
        state
            .tasks
            .get(&remote_id)
            .cloned()
            .ok_or_else(|| BackendError::from_status(404))
    }

    async fn search_tasks(&self, token: &str, query: &str) -> Result<Vec<BackendTask>, BackendError> {
        let state = self.enter(Some(token))?;
        Ok(state
            .tasks
            .values()
            .filter(|task| {
                task.title.contains(query) || task.deadline.map(datetime::format_ymd).as_deref() == Some(query)
            })
            .cloned()
            .collect())
    }

    async fn create_task(
        &self,
        token: &str,
        list_remote_id: i64,
        args: &CreateTaskArgs,
    ) -> Result<BackendTask, BackendError> {
        let mut state = self.enter(Some(token))?;
        if !state.lists.contains_key(&list_remote_id) {
            return Err(BackendError::from_status(404));
        }
        let id = state.next_id();
        let task = BackendTask {
            remote_id: id,
            title: args.title.clone(),
            description: Some(args.description.clone()).filter(|d| !d.is_empty()),
            starred: args.starred,
            completed: args.completed,
            deadline: parse_deadline(&args.deadline),
            completion_rate: args.completion_rate,
            list_remote_id,
            created_at: None,
            updated_at: None,
        };
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, token: &str, remote_id: i64, args: &UpdateTaskArgs) -> Result<BackendTask, BackendError> {
        let mut state = self.enter(Some(token))?;
        let task = state
            .tasks
            .get_mut(&remote_id)
            .ok_or_else(|| BackendError::from_status(404))?;
        if let Some(title) = &args.title {
            task.title = title.clone();
        }
        if let Some(description) = &args.description {
            task.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(starred) = args.starred {
            task.starred = starred;
        }
        if let Some(completed) = args.completed {
            task.completed = completed;
        }
        if let Some(deadline) = &args.deadline {
            task.deadline = parse_deadline(deadline);
        }
        if let Some(rate) = args.completion_rate {
            task.completion_rate = rate;
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, token: &str, remote_id: i64) -> Result<(), BackendError> {
        let mut state = self.enter(Some(token))?;
        state
            .tasks
            .remove(&remote_id)
            .map(|_| ())
            .ok_or_else(|| BackendError::from_status(404))
    }
}

/// Everything a sync test needs to poke at.
pub struct Harness {
    pub sync: SyncService,
    pub auth: AuthSession,
    pub reload: Arc<ReloadCoordinator>,
    pub storage: Arc<AsyncMutex<LocalStorage>>,
}

/// Build a signed-in sync service over a fresh in-memory database.
pub async fn harness(backend: Option<Arc<FakeBackend>>) -> Harness {
    let storage = Arc::new(AsyncMutex::new(LocalStorage::in_memory().await.unwrap()));
    let auth = AuthSession::new(TOKEN);
    let reload = Arc::new(ReloadCoordinator::new());
    let backend = backend.map(|backend| backend as Arc<dyn Backend>);
    let sync = SyncService::new(backend, storage.clone(), auth.clone(), reload.clone());

    Harness {
        sync,
        auth,
        reload,
        storage,
    }
}
