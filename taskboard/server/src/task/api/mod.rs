use std::sync::Arc;

pub mod v1;

/// Shared state for the task API handlers.
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}
