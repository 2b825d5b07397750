use crate::entities::*;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sea_orm::*;
use taskboard_core::{
    NewTask, PageRequest, ParseTaskFieldError, Patch, Task, TaskChanges, TaskId, TaskPage,
    TaskPriority, TaskSort, TaskStatus,
};

pub mod api;
mod query;

pub use query::TaskFilter;

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// No task exists with the given ID.
    #[error("Task with ID {0} not found")]
    NotFound(TaskId),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// A stored row holds a status or priority outside the known set.
    #[error("Task {id} holds an unreadable value: {source}")]
    CorruptRecord {
        id: TaskId,
        #[source]
        source: ParseTaskFieldError,
    },
}

impl TryFrom<task::Model> for Task {
    type Error = TaskServiceError;

    fn try_from(model: task::Model) -> Result<Self, Self::Error> {
        let corrupt = |source| TaskServiceError::CorruptRecord {
            id: model.id,
            source,
        };
        let status: TaskStatus = model.status.parse().map_err(corrupt)?;
        let priority: TaskPriority = model.priority.parse().map_err(corrupt)?;
        Ok(Task {
            id: model.id,
            title: model.title,
            description: model.description,
            status,
            priority,
            due_date: model.due_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Current time at the precision every supported backend stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Lists one page of tasks matching `filter`, ordered by `sort`.
    ///
    /// # Arguments
    ///
    /// * `filter` - Status, priority and search predicates, combined with AND.
    /// * `sort` - Resolved ordering. Ties are always broken by ascending ID.
    /// * `page` - Page window to fetch.
    ///
    /// # Returns
    ///
    /// A `Result` containing the page of tasks and the total match count.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        page: PageRequest,
    ) -> Result<TaskPage, TaskServiceError> {
        let condition = filter.condition();

        let total = task::Entity::find()
            .filter(condition.clone())
            .count(self.db)
            .await?;

        let models = query::apply_sort(task::Entity::find().filter(condition), sort)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db)
            .await?;

        let data = models
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(total, returned = data.len(), "Listed tasks");
        Ok(TaskPage::new(data, page, total))
    }

    /// Retrieves a single task by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        let model = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;
        Task::try_from(model)
    }

    /// Creates a new task. `created_at` and `updated_at` are stamped with the
    /// same instant.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Task` with its newly assigned ID.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, TaskServiceError> {
        let stamp = now();
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(new_task.title),
            description: ActiveValue::Set(new_task.description),
            status: ActiveValue::Set(new_task.status.as_str().to_owned()),
            priority: ActiveValue::Set(new_task.priority.as_str().to_owned()),
            due_date: ActiveValue::Set(new_task.due_date),
            created_at: ActiveValue::Set(stamp),
            updated_at: ActiveValue::Set(stamp),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!(id = created_model.id, "Created task");
        Task::try_from(created_model)
    }

    /// Applies a partial update to a task. Fields left as `Patch::Unchanged`
    /// keep their stored values; `updated_at` always moves forward.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `changes` - The fields to overwrite.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`, or `NotFound` if no task has
    /// that ID.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        id: TaskId,
        changes: TaskChanges,
    ) -> Result<Task, TaskServiceError> {
        let existing = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;

        let stamp = now();
        let updated_at = if stamp > existing.updated_at {
            stamp
        } else {
            existing.updated_at + TimeDelta::microseconds(1)
        };

        let mut active_model: task::ActiveModel = existing.into();
        if let Patch::Set(title) = changes.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Patch::Set(description) = changes.description {
            active_model.description = ActiveValue::Set(Some(description));
        }
        if let Patch::Set(status) = changes.status {
            active_model.status = ActiveValue::Set(status.as_str().to_owned());
        }
        if let Patch::Set(priority) = changes.priority {
            active_model.priority = ActiveValue::Set(priority.as_str().to_owned());
        }
        if let Patch::Set(due_date) = changes.due_date {
            active_model.due_date = ActiveValue::Set(due_date);
        }
        active_model.updated_at = ActiveValue::Set(updated_at);

        let updated_model = active_model.update(self.db).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => TaskServiceError::NotFound(id),
            other => TaskServiceError::Database(other),
        })?;
        Task::try_from(updated_model)
    }

    /// Deletes a task by ID.
    ///
    /// # Returns
    ///
    /// `true` if a task was removed, `false` if none had that ID.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: TaskId) -> Result<bool, TaskServiceError> {
        let result = task::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
