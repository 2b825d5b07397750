use crate::task::api::TaskState;
use crate::task::{TaskFilter, TaskService};
use crate::web::error::ApiError;
use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use taskboard_core::{
    ErrorResponse, NewTask, PageRequest, Task, TaskId, TaskPage, TaskSort, validate_new_task,
    validate_task_changes,
};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing tasks. Values are taken as raw strings and
/// coerced leniently: bad paging values fall back to defaults and an unknown
/// sort falls back to newest first.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksParams {
    /// Page number, starting at 1
    page: Option<String>,
    /// Page size, at most 100
    limit: Option<String>,
    /// Only tasks with this status
    status: Option<String>,
    /// Only tasks with this priority
    priority: Option<String>,
    /// Case-insensitive text matched against title or description
    search: Option<String>,
    /// One of `created_at`, `due_date`, `priority` followed by `:asc` or `:desc`
    sort: Option<String>,
}

/// Query parameters for the search endpoint: the listing parameters with the
/// search text in `q`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchTasksParams {
    /// Case-insensitive text matched against title or description
    q: Option<String>,
    page: Option<String>,
    limit: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    sort: Option<String>,
}

impl From<SearchTasksParams> for ListTasksParams {
    fn from(params: SearchTasksParams) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            status: params.status,
            priority: params.priority,
            search: params.q,
            sort: params.sort,
        }
    }
}

impl ListTasksParams {
    fn into_listing(self) -> (TaskFilter, TaskSort, PageRequest) {
        let page = PageRequest::from_params(self.page.as_deref(), self.limit.as_deref());
        let sort = TaskSort::parse_or_default(self.sort.as_deref());
        let filter = TaskFilter::new(self.status, self.priority, self.search);
        (filter, sort, page)
    }
}

/// Response body for a successful delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteTaskResponse {
    message: String,
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn json_object(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    match body {
        Ok(Json(Value::Object(object))) => Ok(object),
        Ok(_) => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection);
            Err(ApiError::BadRequest(rejection.body_text()))
        }
    }
}

/// Path IDs that are not integers cannot name a task.
fn parse_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn list(state: &TaskState, params: ListTasksParams) -> Result<Json<TaskPage>, ApiError> {
    let (filter, sort, page) = params.into_listing();
    let result = TaskService::new(&state.db)
        .list_tasks(&filter, sort, page)
        .await?;
    Ok(Json(result))
}

/// Handler for GET /api/tasks - Returns one page of tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(ListTasksParams),
    responses(
        (status = 200, description = "One page of matching tasks", body = TaskPage),
        (status = 400, description = "Unreadable query string", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
    params: Result<Query<ListTasksParams>, QueryRejection>,
) -> Result<Json<TaskPage>, ApiError> {
    list(&state, query_params(params)?).await
}

/// Handler for GET /api/tasks/search - Same as the listing with the search
/// text taken from `q`.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks/search",
    params(SearchTasksParams),
    responses(
        (status = 200, description = "One page of matching tasks", body = TaskPage),
        (status = 400, description = "Unreadable query string", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn search_tasks_handler(
    State(state): State<Arc<TaskState>>,
    params: Result<Query<SearchTasksParams>, QueryRejection>,
) -> Result<Json<TaskPage>, ApiError> {
    list(&state, query_params(params)?.into()).await
}

/// Handler for GET /api/tasks/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    let task = TaskService::new(&state.db).get_task(id).await?;
    Ok(Json(task))
}

/// Handler for POST /api/tasks
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let body = json_object(body)?;
    let new_task = validate_new_task(&body).inspect_err(|errors| {
        tracing::debug!("Rejected new task: {}", errors);
    })?;
    let task = TaskService::new(&state.db).create_task(new_task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update(
    state: &TaskState,
    id: &str,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(id)?;
    let body = json_object(body)?;
    let changes = validate_task_changes(&body).inspect_err(|errors| {
        tracing::debug!("Rejected changes to task {}: {}", id, errors);
    })?;
    let task = TaskService::new(&state.db).update_task(id, changes).await?;
    Ok(Json(task))
}

/// Handler for PUT /api/tasks/{id} - Fields missing from the body keep their
/// stored values.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body(
        content = serde_json::Value,
        description = "Any subset of the task fields. `due_date: null` clears the date."
    ),
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    update(&state, &id, body).await
}

/// Handler for PATCH /api/tasks/{id}
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body(
        content = serde_json::Value,
        description = "Any subset of the task fields. `due_date: null` clears the date."
    ),
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn patch_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    update(&state, &id, body).await
}

/// Handler for DELETE /api/tasks/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = DeleteTaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTaskResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !TaskService::new(&state.db).delete_task(id).await? {
        tracing::warn!("Task {} not found for deletion", id);
        return Err(ApiError::NotFound);
    }
    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route("/tasks/search", get(search_tasks_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .patch(patch_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
