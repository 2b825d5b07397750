//! Core domain models shared by the Taskboard server and client.
pub mod error;
pub mod query;
pub mod task;
pub mod validation;

pub use error::{ErrorBody, ErrorCode, ErrorResponse, FieldError};
pub use query::{
    DEFAULT_LIMIT, MAX_LIMIT, NO_RESULTS_MESSAGE, PageMeta, PageRequest, ParseSortError,
    SortDirection, SortField, TaskListQuery, TaskPage, TaskSort,
};
pub use task::{
    NewTask, ParseTaskFieldError, Patch, Task, TaskChanges, TaskId, TaskPriority, TaskStatus,
};
pub use validation::{ValidationErrors, validate_new_task, validate_task_changes};
