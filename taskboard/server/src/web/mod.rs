use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::any::Any;
use std::sync::Arc;
use taskboard_core::{
    ErrorBody, ErrorCode, ErrorResponse, FieldError, NewTask, PageMeta, Task, TaskPage,
    TaskPriority, TaskStatus,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config;
use crate::task::api::{TaskState, v1};

pub mod error;

/// OpenAPI document for the task API.
#[derive(OpenApi)]
#[openapi(
    paths(
        v1::list_tasks_handler,
        v1::search_tasks_handler,
        v1::get_task_handler,
        v1::create_task_handler,
        v1::update_task_handler,
        v1::patch_task_handler,
        v1::delete_task_handler,
    ),
    components(schemas(
        Task,
        TaskStatus,
        TaskPriority,
        NewTask,
        TaskPage,
        PageMeta,
        ErrorResponse,
        ErrorBody,
        ErrorCode,
        FieldError,
        v1::DeleteTaskResponse,
    )),
    tags((name = "Tasks", description = "Task management endpoints"))
)]
pub struct ApiDoc;

/// Builds the CORS layer. With no configured origin any origin is allowed.
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);
    Ok(match origin {
        Some(origin) => layer.allow_origin(HeaderValue::from_str(origin)?),
        None => layer.allow_origin(AnyOrigin),
    })
}

/// Renders a handler panic as the standard internal error body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal()),
    )
        .into_response()
}

/// Assembles the full application: health check, task API under `/api`,
/// OpenAPI document and Swagger UI.
pub fn create_app_router(db: DatabaseConnection, cors: CorsLayer) -> Router {
    let task_state = Arc::new(TaskState { db: Arc::new(db) });

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .nest("/api", v1::create_api_router(task_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app_router(db, cors_layer(config.cors_origin.as_deref())?);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
