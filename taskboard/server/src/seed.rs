//! Sample data for local development.
use crate::entities::task;
use crate::task::{TaskService, TaskServiceError};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait};
use taskboard_core::{NewTask, TaskPriority, TaskStatus};

/// One sample row. Due dates are `(year, month, day)`.
pub struct SampleTask {
    pub title: &'static str,
    pub description: &'static str,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<(i32, u32, u32)>,
}

impl SampleTask {
    fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.to_string(),
            description: Some(self.description.to_string()),
            status: self.status,
            priority: self.priority,
            due_date: self
                .due_date
                .and_then(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day)),
        }
    }
}

/// Work items, household chores and personal errands with a spread of
/// statuses, priorities and due dates.
pub const SAMPLE_TASKS: &[SampleTask] = &[
    SampleTask {
        title: "Complete project setup",
        description: "Set up the monorepo structure",
        status: TaskStatus::Completed,
        priority: TaskPriority::High,
        due_date: Some((2024, 10, 1)),
    },
    SampleTask {
        title: "Design database schema",
        description: "Create SQLite schema for tasks",
        status: TaskStatus::Completed,
        priority: TaskPriority::High,
        due_date: Some((2024, 10, 5)),
    },
    SampleTask {
        title: "Implement seed script",
        description: "Write script to populate database",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        due_date: Some((2025, 11, 30)),
    },
    SampleTask {
        title: "Set up server endpoints",
        description: "Create API routes for tasks",
        status: TaskStatus::Pending,
        priority: TaskPriority::High,
        due_date: Some((2025, 12, 1)),
    },
    SampleTask {
        title: "Build client UI",
        description: "Develop React components",
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: Some((2025, 12, 5)),
    },
    SampleTask {
        title: "Add authentication",
        description: "Implement user login",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: None,
    },
    SampleTask {
        title: "Write tests",
        description: "Create unit and integration tests",
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: Some((2025, 12, 10)),
    },
    SampleTask {
        title: "Deploy application",
        description: "Set up production deployment",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: None,
    },
    SampleTask {
        title: "Optimize performance",
        description: "Improve app speed",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: Some((2025, 12, 15)),
    },
    SampleTask {
        title: "Document API",
        description: "Write API documentation",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: Some((2025, 12, 20)),
    },
    SampleTask {
        title: "Review code",
        description: "Conduct code review for pull requests",
        status: TaskStatus::Completed,
        priority: TaskPriority::Medium,
        due_date: Some((2024, 11, 15)),
    },
    SampleTask {
        title: "Update dependencies",
        description: "Upgrade npm packages to latest versions",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        due_date: Some((2025, 12, 25)),
    },
    SampleTask {
        title: "Fix bugs",
        description: "Resolve reported issues in the application",
        status: TaskStatus::Pending,
        priority: TaskPriority::High,
        due_date: Some((2026, 1, 1)),
    },
    SampleTask {
        title: "Plan sprint",
        description: "Organize tasks for the next development sprint",
        status: TaskStatus::Completed,
        priority: TaskPriority::Medium,
        due_date: Some((2024, 12, 1)),
    },
    SampleTask {
        title: "Attend meeting",
        description: "Join team standup meeting",
        status: TaskStatus::Completed,
        priority: TaskPriority::Low,
        due_date: Some((2024, 12, 5)),
    },
    SampleTask {
        title: "Grocery shopping",
        description: "Buy weekly groceries for the house",
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: Some((2025, 11, 28)),
    },
    SampleTask {
        title: "Clean kitchen",
        description: "Wash dishes and wipe counters",
        status: TaskStatus::Completed,
        priority: TaskPriority::Low,
        due_date: Some((2024, 11, 20)),
    },
    SampleTask {
        title: "Laundry",
        description: "Wash and fold clothes",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Low,
        due_date: Some((2025, 11, 29)),
    },
    SampleTask {
        title: "Vacuum house",
        description: "Clean floors throughout the house",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: Some((2025, 12, 2)),
    },
    SampleTask {
        title: "Take out trash",
        description: "Empty bins and take to curb",
        status: TaskStatus::Completed,
        priority: TaskPriority::Low,
        due_date: Some((2024, 11, 25)),
    },
    SampleTask {
        title: "Mow lawn",
        description: "Cut grass in the backyard",
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: Some((2025, 12, 3)),
    },
    SampleTask {
        title: "Wash car",
        description: "Clean exterior and interior of vehicle",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: None,
    },
    SampleTask {
        title: "Pay bills",
        description: "Settle monthly utility and credit card payments",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        due_date: Some((2025, 12, 1)),
    },
    SampleTask {
        title: "Organize closet",
        description: "Sort and arrange clothes and items",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: Some((2025, 12, 10)),
    },
    SampleTask {
        title: "Cook dinner",
        description: "Prepare meal for the family",
        status: TaskStatus::Completed,
        priority: TaskPriority::Medium,
        due_date: Some((2024, 11, 26)),
    },
    SampleTask {
        title: "Exercise",
        description: "Go for a 30-minute run",
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: Some((2025, 11, 30)),
    },
    SampleTask {
        title: "Read book",
        description: "Finish reading current novel",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Low,
        due_date: None,
    },
    SampleTask {
        title: "Call family",
        description: "Check in with parents and siblings",
        status: TaskStatus::Completed,
        priority: TaskPriority::High,
        due_date: Some((2024, 11, 22)),
    },
    SampleTask {
        title: "Learn guitar",
        description: "Practice chords for 20 minutes",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: Some((2025, 12, 5)),
    },
    SampleTask {
        title: "Plan vacation",
        description: "Research and book trip destinations",
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: Some((2026, 1, 15)),
    },
    SampleTask {
        title: "Dentist appointment",
        description: "Schedule and attend dental checkup",
        status: TaskStatus::Pending,
        priority: TaskPriority::High,
        due_date: Some((2025, 12, 20)),
    },
    SampleTask {
        title: "Update resume",
        description: "Revise CV with recent achievements",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        due_date: Some((2025, 12, 15)),
    },
    SampleTask {
        title: "Volunteer",
        description: "Help at local community center",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: None,
    },
    SampleTask {
        title: "Meditate",
        description: "Daily mindfulness practice",
        status: TaskStatus::Completed,
        priority: TaskPriority::Low,
        due_date: Some((2024, 11, 27)),
    },
    SampleTask {
        title: "Bake cookies",
        description: "Make chocolate chip cookies from scratch",
        status: TaskStatus::Pending,
        priority: TaskPriority::Low,
        due_date: Some((2025, 12, 25)),
    },
];

/// Deletes every task and inserts [`SAMPLE_TASKS`].
///
/// # Returns
///
/// The number of tasks inserted.
#[tracing::instrument(skip(db))]
pub async fn reseed(db: &DatabaseConnection) -> Result<usize, TaskServiceError> {
    let removed = task::Entity::delete_many().exec(db).await?.rows_affected;
    tracing::info!("Removed {} existing tasks", removed);

    let service = TaskService::new(db);
    for sample in SAMPLE_TASKS {
        service.create_task(sample.to_new_task()).await?;
    }
    Ok(SAMPLE_TASKS.len())
}
