use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{TaskRow, date, setup_sqlite};
use insta::assert_json_snapshot;
use rstest::rstest;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use taskboard_core::{ErrorResponse, Task, TaskPage, TaskPriority, TaskStatus};
use taskboard_server::web::create_app_router;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

mod common;

/// Test context for endpoint tests.
struct TestContext {
    app: Router,
    db: DatabaseConnection,
}

async fn setup() -> TestContext {
    let db = setup_sqlite().await.expect("Failed to setup test database");
    let app = create_app_router(db.clone(), CorsLayer::new());
    TestContext { app, db }
}

/// Sends a request through the router and returns the status and raw body.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|body| body.to_string());
    let (status, bytes) = send(app, method, uri, body.as_deref()).await;
    (status, serde_json::from_slice(&bytes).expect("response was not JSON"))
}

fn error_body(body: Value) -> ErrorResponse {
    serde_json::from_value(body).expect("response was not an error body")
}

#[tokio::test]
async fn health_check_returns_ok() {
    let ctx = setup().await;

    let (status, body) = send(&ctx.app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn create_without_title_is_rejected() {
    let ctx = setup().await;

    let (status, body) =
        send_json(&ctx.app, Method::POST, "/api/tasks", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_snapshot!(error_body(body), @r#"
    {
      "error": {
        "code": "BAD_REQUEST",
        "message": "Validation failed",
        "fields": [
          {
            "field": "title",
            "message": "Required"
          }
        ]
      }
    }
    "#);
}

#[tokio::test]
async fn create_reports_every_invalid_field() {
    let ctx = setup().await;
    let payload = json!({
        "title": "t".repeat(101),
        "status": "done",
        "priority": "urgent",
    });

    let (status, body) = send_json(&ctx.app, Method::POST, "/api/tasks", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_snapshot!(error_body(body), @r#"
    {
      "error": {
        "code": "BAD_REQUEST",
        "message": "Validation failed",
        "fields": [
          {
            "field": "title",
            "message": "Must be 100 characters or less"
          },
          {
            "field": "status",
            "message": "Must be one of: pending, in-progress, completed"
          },
          {
            "field": "priority",
            "message": "Must be one of: low, medium, high"
          }
        ]
      }
    }
    "#);
}

#[tokio::test]
async fn create_returns_created_task() {
    let ctx = setup().await;
    let payload = json!({
        "title": "Plan sprint",
        "description": "Pick stories for next week",
        "priority": "high",
        "due_date": "2025-04-01",
        "ignored": true
    });

    let (status, body) = send_json(&ctx.app, Method::POST, "/api/tasks", Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    let task: Task = serde_json::from_value(body).unwrap();
    assert_eq!(task.title, "Plan sprint");
    assert_eq!(task.description.as_deref(), Some("Pick stories for next week"));
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(task.due_date, Some(date(2025, 4, 1)));
    assert_eq!(task.created_at, task.updated_at);

    let (status, fetched) =
        send_json(&ctx.app, Method::GET, &format!("/api/tasks/{}", task.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<Task>(fetched).unwrap(), task);
}

#[tokio::test]
async fn created_task_serializes_missing_optionals_as_null() {
    let ctx = setup().await;

    let (_, body) = send_json(
        &ctx.app,
        Method::POST,
        "/api/tasks",
        Some(json!({"title": "Bare"})),
    )
    .await;

    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["due_date"], Value::Null);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["priority"], "medium");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let ctx = setup().await;

    let (status, bytes) =
        send(&ctx.app, Method::POST, "/api/tasks", Some("{\"title\":")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.error.code, taskboard_core::ErrorCode::BadRequest);
    assert!(body.error.fields.is_none());
}

#[tokio::test]
async fn non_object_body_is_a_bad_request() {
    let ctx = setup().await;

    let (status, body) =
        send_json(&ctx.app, Method::POST, "/api/tasks", Some(json!(["title"]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_snapshot!(error_body(body), @r#"
    {
      "error": {
        "code": "BAD_REQUEST",
        "message": "Request body must be a JSON object"
      }
    }
    "#);
}

#[tokio::test]
async fn missing_task_is_not_found() {
    let ctx = setup().await;

    let (status, body) = send_json(&ctx.app, Method::GET, "/api/tasks/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_snapshot!(error_body(body), @r#"
    {
      "error": {
        "code": "NOT_FOUND",
        "message": "Task not found"
      }
    }
    "#);
}

#[rstest]
#[case::get(Method::GET, "/api/tasks/abc", None)]
#[case::put(Method::PUT, "/api/tasks/abc", Some(json!({"title": "x"})))]
#[case::patch(Method::PATCH, "/api/tasks/1.5", Some(json!({"title": "x"})))]
#[case::delete(Method::DELETE, "/api/tasks/12abc", None)]
#[tokio::test]
async fn non_numeric_id_is_not_found(
    #[case] method: Method,
    #[case] uri: &str,
    #[case] body: Option<Value>,
) {
    let ctx = setup().await;
    TaskRow::new("Existing").insert(&ctx.db).await;

    let (status, body) = send_json(&ctx.app, method, uri, body).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn put_merges_supplied_fields() {
    let ctx = setup().await;
    let row = TaskRow::new("Write tests")
        .description("Cover the API")
        .priority("low")
        .due(date(2025, 5, 5))
        .insert(&ctx.db)
        .await;

    let (status, body) = send_json(
        &ctx.app,
        Method::PUT,
        &format!("/api/tasks/{}", row.id),
        Some(json!({"title": "Write more tests", "status": "completed"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let task: Task = serde_json::from_value(body).unwrap();
    assert_eq!(task.title, "Write more tests");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.description.as_deref(), Some("Cover the API"));
    assert_eq!(task.priority, TaskPriority::Low);
    assert_eq!(task.due_date, Some(date(2025, 5, 5)));
    assert_ne!(task.updated_at, task.created_at);
}

#[tokio::test]
async fn patch_can_clear_due_date() {
    let ctx = setup().await;
    let row = TaskRow::new("Book flights")
        .due(date(2025, 7, 1))
        .insert(&ctx.db)
        .await;

    let (status, body) = send_json(
        &ctx.app,
        Method::PATCH,
        &format!("/api/tasks/{}", row.id),
        Some(json!({"due_date": null, "priority": "high"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["due_date"], Value::Null);
    assert_eq!(body["priority"], "high");
    assert_eq!(body["title"], "Book flights");
}

#[tokio::test]
async fn update_validates_before_looking_up_the_task() {
    let ctx = setup().await;

    let (status, body) = send_json(
        &ctx.app,
        Method::PUT,
        "/api/tasks/12345",
        Some(json!({"title": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_snapshot!(error_body(body), @r#"
    {
      "error": {
        "code": "BAD_REQUEST",
        "message": "Validation failed",
        "fields": [
          {
            "field": "title",
            "message": "Must not be empty"
          }
        ]
      }
    }
    "#);
}

#[tokio::test]
async fn update_of_missing_task_is_not_found() {
    let ctx = setup().await;

    let (status, body) = send_json(
        &ctx.app,
        Method::PATCH,
        "/api/tasks/12345",
        Some(json!({"status": "completed"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn delete_removes_task_once() {
    let ctx = setup().await;
    let row = TaskRow::new("Throwaway").insert(&ctx.db).await;
    let uri = format!("/api/tasks/{}", row.id);

    let (first, body) = send_json(&ctx.app, Method::DELETE, &uri, None).await;
    let (second, _) = send_json(&ctx.app, Method::DELETE, &uri, None).await;
    let (lookup, _) = send_json(&ctx.app, Method::GET, &uri, None).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(body, json!({"message": "Task deleted successfully"}));
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert_eq!(lookup, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_list_includes_no_results_message() {
    let ctx = setup().await;

    let (status, body) = send_json(&ctx.app, Method::GET, "/api/tasks", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "data": [],
            "meta": {"page": 1, "limit": 10, "total": 0},
            "message": "No results found."
        })
    );
}

#[tokio::test]
async fn list_applies_filters_paging_and_sort() {
    let ctx = setup().await;
    for (minute, (title, status, priority)) in [
        ("a", "completed", "low"),
        ("b", "completed", "high"),
        ("c", "completed", "medium"),
        ("d", "pending", "high"),
    ]
    .into_iter()
    .enumerate()
    {
        TaskRow::new(title)
            .status(status)
            .priority(priority)
            .created_minutes_after_base(minute as i64 + 1)
            .insert(&ctx.db)
            .await;
    }

    let (status, body) = send_json(
        &ctx.app,
        Method::GET,
        "/api/tasks?status=completed&sort=priority:desc&limit=2&page=1",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let page: TaskPage = serde_json::from_value(body).unwrap();
    let titles: Vec<_> = page.data.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "c"]);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.limit, 2);
    assert_eq!(page.message, None);
}

#[rstest]
#[case::non_numeric_page("page=abc", 1, 10, "newer")]
#[case::zero_values("page=0&limit=0", 1, 10, "newer")]
#[case::negative_values("page=-2&limit=-5", 1, 10, "newer")]
#[case::limit_above_max("limit=5000", 1, 100, "newer")]
#[case::unknown_sort_and_empty_status("sort=title:asc&status=&page=2&limit=1", 2, 1, "older")]
#[tokio::test]
async fn list_coerces_bad_paging_and_sort_values(
    #[case] query: &str,
    #[case] page: u64,
    #[case] limit: u64,
    #[case] first_title: &str,
) {
    let ctx = setup().await;
    TaskRow::new("older").created_minutes_after_base(1).insert(&ctx.db).await;
    TaskRow::new("newer").created_minutes_after_base(2).insert(&ctx.db).await;

    let uri = format!("/api/tasks?{query}");
    let (status, body) = send_json(&ctx.app, Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    let result: TaskPage = serde_json::from_value(body).unwrap();
    assert_eq!(result.meta.page, page);
    assert_eq!(result.meta.limit, limit);
    assert_eq!(result.meta.total, 2);
    assert_eq!(result.data[0].title, first_title);
}

#[tokio::test]
async fn search_endpoint_reads_q() {
    let ctx = setup().await;
    TaskRow::new("Water plants").insert(&ctx.db).await;
    TaskRow::new("Pay rent")
        .description("Transfer before the WATER bill")
        .insert(&ctx.db)
        .await;
    TaskRow::new("Call mom").insert(&ctx.db).await;

    let (status, body) =
        send_json(&ctx.app, Method::GET, "/api/tasks/search?q=water", None).await;
    let (_, unfiltered) = send_json(&ctx.app, Method::GET, "/api/tasks/search", None).await;

    assert_eq!(status, StatusCode::OK);
    let page: TaskPage = serde_json::from_value(body).unwrap();
    assert_eq!(page.meta.total, 2);
    assert_eq!(unfiltered["meta"]["total"], 3);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let ctx = setup().await;

    let (status, body) =
        send_json(&ctx.app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/tasks/{id}").is_some());
    assert!(body["components"]["schemas"].get("Task").is_some());
}
