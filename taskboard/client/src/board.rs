//! Headless state behind the task list view.
//!
//! [`TaskBoard`] owns the visible page of tasks together with the filter,
//! pagination and form state around it. List loads run on spawned tasks so a
//! newer load can abort an older one that is still in flight; only the most
//! recent load ever writes to the state.

use futures::future::AbortHandle;
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::{
    NewTask, Task, TaskChanges, TaskId, TaskListQuery, TaskPage, TaskPriority, TaskSort,
    TaskStatus,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{ClientError, TaskApi, with_cancellation};
use crate::debounce::Debouncer;

pub const PAGE_SIZE: u64 = 10;
/// Shortest time a list load keeps its loading flag raised.
pub const MIN_LOADING: Duration = Duration::from_millis(500);

pub const LOAD_FAILED: &str = "Failed to load tasks";
pub const CREATE_FAILED: &str = "Failed to create task";
pub const UPDATE_FAILED: &str = "Failed to update task";
pub const DELETE_FAILED: &str = "Failed to delete task";
pub const TOGGLE_FAILED: &str = "Failed to update task status";

/// Which loading flag a list load raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    List,
    Search,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: String,
    pub sort: Option<TaskSort>,
}

impl TaskFilters {
    fn query(&self, page: u64) -> TaskListQuery {
        TaskListQuery {
            page: Some(page),
            limit: Some(PAGE_SIZE),
            status: self.status,
            priority: self.priority,
            search: Some(self.search.clone()).filter(|search| !search.is_empty()),
            sort: self.sort,
        }
    }
}

/// Snapshot of everything the list view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    pub filters: TaskFilters,
    pub page: u64,
    pub total_pages: u64,
    pub loading: bool,
    pub search_loading: bool,
    pub form_open: bool,
    /// Task being edited; `None` while the form creates a new task.
    pub editing: Option<Task>,
    /// Raised while a create, update or delete awaits the server.
    pub form_busy: bool,
    pub pending_delete: Option<TaskId>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            filters: TaskFilters::default(),
            page: 1,
            total_pages: 0,
            loading: false,
            search_loading: false,
            form_open: false,
            editing: None,
            form_busy: false,
            pending_delete: None,
            error: None,
            message: None,
        }
    }
}

impl BoardState {
    fn show_page(&mut self, page: TaskPage) {
        self.total_pages = page.meta.total.div_ceil(PAGE_SIZE);
        self.tasks = page.data;
        self.message = page.message;
    }

    fn listed_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    fn close_form(&mut self) {
        self.form_open = false;
        self.editing = None;
    }
}

#[derive(Default)]
struct Inner {
    state: BoardState,
    in_flight: Option<AbortHandle>,
    generation: u64,
}

/// Drives a [`BoardState`] against a [`TaskApi`]. Clones share the same state.
pub struct TaskBoard<A> {
    api: Arc<A>,
    inner: Arc<Mutex<Inner>>,
    search: Arc<Debouncer>,
}

impl<A> Clone for TaskBoard<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            inner: Arc::clone(&self.inner),
            search: Arc::clone(&self.search),
        }
    }
}

impl<A: TaskApi + 'static> TaskBoard<A> {
    pub fn new(api: A) -> Self {
        Self::with_shared_api(Arc::new(api))
    }

    pub fn with_shared_api(api: Arc<A>) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(Inner::default())),
            search: Arc::new(Debouncer::default()),
        }
    }

    pub async fn state(&self) -> BoardState {
        self.inner.lock().await.state.clone()
    }

    /// Reloads the current page with the current filters.
    pub async fn refresh(&self) -> JoinHandle<()> {
        let mut inner = self.inner.lock().await;
        self.start_load(&mut inner, LoadKind::List)
    }

    pub async fn set_page(&self, page: u64) -> JoinHandle<()> {
        let mut inner = self.inner.lock().await;
        inner.state.page = page.max(1);
        self.start_load(&mut inner, LoadKind::List)
    }

    /// Replaces the filters and jumps back to the first page. The load counts
    /// as a search when the search text changed.
    pub async fn set_filters(&self, filters: TaskFilters) -> JoinHandle<()> {
        let mut inner = self.inner.lock().await;
        let kind = if filters.search != inner.state.filters.search {
            LoadKind::Search
        } else {
            LoadKind::List
        };
        inner.state.filters = filters;
        inner.state.page = 1;
        self.start_load(&mut inner, kind)
    }

    /// Feeds a keystroke's worth of search text. Only the last input within
    /// the debounce window reaches the server.
    pub fn search_input(&self, text: impl Into<String>) {
        let board = self.clone();
        let text = text.into();
        self.search.call(async move {
            let mut filters = board.inner.lock().await.state.filters.clone();
            if filters.search != text {
                filters.search = text;
                let _ = board.set_filters(filters).await;
            }
        });
    }

    pub async fn open_create_form(&self) {
        let mut inner = self.inner.lock().await;
        inner.state.form_open = true;
        inner.state.editing = None;
    }

    pub async fn open_edit_form(&self, task: Task) {
        let mut inner = self.inner.lock().await;
        inner.state.form_open = true;
        inner.state.editing = Some(task);
    }

    pub async fn close_form(&self) {
        self.inner.lock().await.state.close_form();
    }

    pub async fn request_delete(&self, id: TaskId) {
        self.inner.lock().await.state.pending_delete = Some(id);
    }

    pub async fn cancel_delete(&self) {
        self.inner.lock().await.state.pending_delete = None;
    }

    /// Creates a task, closes the form and reloads the list.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, ClientError> {
        self.set_form_busy(true).await;
        let result = self.api.create_task(new_task).await;

        let mut inner = self.inner.lock().await;
        inner.state.form_busy = false;
        match result {
            Ok(task) => {
                inner.state.close_form();
                let load = self.start_load(&mut inner, LoadKind::List);
                drop(inner);
                let _ = load.await;
                Ok(task)
            }
            Err(err) => {
                tracing::warn!(error = %err, "{}", CREATE_FAILED);
                inner.state.error = Some(CREATE_FAILED.to_string());
                Err(err)
            }
        }
    }

    /// Updates a task and swaps the server's copy into the visible list.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(&self, id: TaskId, changes: TaskChanges) -> Result<Task, ClientError> {
        self.set_form_busy(true).await;
        let result = self.api.update_task(id, changes).await;

        let mut inner = self.inner.lock().await;
        inner.state.form_busy = false;
        match result {
            Ok(task) => {
                if let Some(listed) = inner.state.listed_mut(id) {
                    *listed = task.clone();
                }
                inner.state.close_form();
                Ok(task)
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "{}", UPDATE_FAILED);
                inner.state.error = Some(UPDATE_FAILED.to_string());
                Err(err)
            }
        }
    }

    /// Deletes the task awaiting confirmation, if any.
    pub async fn confirm_delete(&self) -> Result<(), ClientError> {
        let pending = self.inner.lock().await.state.pending_delete;
        match pending {
            Some(id) => self.delete_task(id).await,
            None => Ok(()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        self.set_form_busy(true).await;
        let result = self.api.delete_task(id).await;

        let mut inner = self.inner.lock().await;
        inner.state.form_busy = false;
        inner.state.pending_delete = None;
        match result {
            Ok(()) => {
                let load = self.start_load(&mut inner, LoadKind::List);
                drop(inner);
                let _ = load.await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "{}", DELETE_FAILED);
                inner.state.error = Some(DELETE_FAILED.to_string());
                Err(err)
            }
        }
    }

    /// Flips a task between completed and pending. The list shows the new
    /// status immediately and reverts it if the server refuses.
    #[tracing::instrument(skip(self, task), fields(id = task.id))]
    pub async fn toggle_status(&self, task: &Task) -> Result<Task, ClientError> {
        let previous = task.status;
        let next = previous.toggled();
        if let Some(listed) = self.inner.lock().await.state.listed_mut(task.id) {
            listed.status = next;
        }

        let result = self.api.update_task(task.id, TaskChanges::status(next)).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(updated) => {
                if let Some(listed) = inner.state.listed_mut(task.id) {
                    *listed = updated.clone();
                }
                Ok(updated)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Reverting status of task {}", task.id);
                if let Some(listed) = inner.state.listed_mut(task.id) {
                    listed.status = previous;
                }
                inner.state.error = Some(TOGGLE_FAILED.to_string());
                Err(err)
            }
        }
    }

    async fn set_form_busy(&self, busy: bool) {
        self.inner.lock().await.state.form_busy = busy;
    }

    /// Aborts the running list load, if any, and starts a new one.
    fn start_load(&self, inner: &mut Inner, kind: LoadKind) -> JoinHandle<()> {
        let (handle, registration) = AbortHandle::new_pair();
        if let Some(previous) = inner.in_flight.replace(handle) {
            previous.abort();
            tracing::debug!("Superseded in-flight task list request");
        }
        inner.generation += 1;
        let generation = inner.generation;

        let state = &mut inner.state;
        state.error = None;
        match kind {
            LoadKind::List => state.loading = true,
            LoadKind::Search => state.search_loading = true,
        }
        let query = state.filters.query(state.page);

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let started = Instant::now();
            let result = with_cancellation(api.list_tasks(query), registration).await;
            if matches!(result, Err(ClientError::Cancelled)) {
                return;
            }

            {
                let mut inner = shared.lock().await;
                // A newer load may have aborted this one after it finished but before this lock.
                if inner.generation != generation {
                    return;
                }
                match result {
                    Ok(page) => inner.state.show_page(page),
                    Err(err) => {
                        tracing::warn!(error = %err, "{}", LOAD_FAILED);
                        inner.state.error = Some(LOAD_FAILED.to_string());
                    }
                }
            }

            tokio::time::sleep_until(started + MIN_LOADING).await;

            let mut inner = shared.lock().await;
            if inner.generation == generation {
                inner.in_flight = None;
                inner.state.loading = false;
                inner.state.search_loading = false;
            }
        })
    }
}
