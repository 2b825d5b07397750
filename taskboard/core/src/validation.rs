//! Payload validation for create and update requests.
//!
//! Validators work on the raw JSON object so that every problem can be
//! reported at once, field by field, instead of stopping at the first serde
//! error.
use crate::error::FieldError;
use crate::task::{NewTask, Patch, TaskChanges, TaskPriority, TaskStatus};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: &str = "Required";
const NOT_EMPTY: &str = "Must not be empty";
const NOT_A_STRING: &str = "Must be a string";
const TITLE_TOO_LONG: &str = "Must be 100 characters or less";
const DESCRIPTION_TOO_LONG: &str = "Must be 500 characters or less";
const INVALID_STATUS: &str = "Must be one of: pending, in-progress, completed";
const INVALID_PRIORITY: &str = "Must be one of: low, medium, high";
const INVALID_DATE: &str = "Must be a date in YYYY-MM-DD format";

/// Every field that failed validation, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_fields(self) -> Vec<FieldError> {
        self.0
    }
}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError::new(field, message));
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

/// Validates a create payload.
///
/// `title` is required. `description` and `due_date` treat `null` and the
/// empty string as absent; `status` and `priority` fall back to their
/// defaults when absent, `null` or empty.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every invalid field.
pub fn validate_new_task(body: &Map<String, Value>) -> Result<NewTask, ValidationErrors> {
    let mut errors = Collector::default();

    let title = match body.get("title") {
        Some(Value::String(title)) if !title.is_empty() => {
            if exceeds(title, TITLE_MAX_CHARS) {
                errors.push("title", TITLE_TOO_LONG);
            }
            title.clone()
        }
        _ => {
            errors.push("title", REQUIRED);
            String::new()
        }
    };

    let description = match body.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        Some(Value::String(text)) => {
            if exceeds(text, DESCRIPTION_MAX_CHARS) {
                errors.push("description", DESCRIPTION_TOO_LONG);
            }
            Some(text.clone())
        }
        Some(_) => {
            errors.push("description", NOT_A_STRING);
            None
        }
    };

    let status = match body.get("status").filter(|value| is_present(value)) {
        None => TaskStatus::default(),
        Some(value) => parse_enum(value).unwrap_or_else(|| {
            errors.push("status", INVALID_STATUS);
            TaskStatus::default()
        }),
    };

    let priority = match body.get("priority").filter(|value| is_present(value)) {
        None => TaskPriority::default(),
        Some(value) => parse_enum(value).unwrap_or_else(|| {
            errors.push("priority", INVALID_PRIORITY);
            TaskPriority::default()
        }),
    };

    let due_date = match body.get("due_date") {
        None => None,
        Some(value) => parse_date(value).unwrap_or_else(|| {
            errors.push("due_date", INVALID_DATE);
            None
        }),
    };

    errors.finish(NewTask {
        title,
        description,
        status,
        priority,
        due_date,
    })
}

/// Validates an update payload. Every field is optional; a key that is
/// present is validated and becomes `Patch::Set`, a missing key stays
/// `Patch::Unchanged`. `due_date: null` clears the date.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every invalid field.
pub fn validate_task_changes(body: &Map<String, Value>) -> Result<TaskChanges, ValidationErrors> {
    let mut errors = Collector::default();
    let mut changes = TaskChanges::default();

    match body.get("title") {
        None => {}
        Some(Value::String(title)) if title.is_empty() => errors.push("title", NOT_EMPTY),
        Some(Value::String(title)) if exceeds(title, TITLE_MAX_CHARS) => {
            errors.push("title", TITLE_TOO_LONG);
        }
        Some(Value::String(title)) => changes.title = Patch::Set(title.clone()),
        Some(_) => errors.push("title", NOT_A_STRING),
    }

    match body.get("description") {
        None => {}
        Some(Value::String(text)) if exceeds(text, DESCRIPTION_MAX_CHARS) => {
            errors.push("description", DESCRIPTION_TOO_LONG);
        }
        Some(Value::String(text)) => changes.description = Patch::Set(text.clone()),
        Some(_) => errors.push("description", NOT_A_STRING),
    }

    if let Some(value) = body.get("status") {
        match parse_enum(value) {
            Some(status) => changes.status = Patch::Set(status),
            None => errors.push("status", INVALID_STATUS),
        }
    }

    if let Some(value) = body.get("priority") {
        match parse_enum(value) {
            Some(priority) => changes.priority = Patch::Set(priority),
            None => errors.push("priority", INVALID_PRIORITY),
        }
    }

    if let Some(value) = body.get("due_date") {
        match parse_date(value) {
            Some(due_date) => changes.due_date = Patch::Set(due_date),
            None => errors.push("due_date", INVALID_DATE),
        }
    }

    errors.finish(changes)
}

fn exceeds(text: &str, max_chars: usize) -> bool {
    text.chars().count() > max_chars
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

fn parse_enum<T: std::str::FromStr>(value: &Value) -> Option<T> {
    value.as_str().and_then(|text| text.parse().ok())
}

/// `Some(None)` for an explicit "no date", `None` when the value is invalid.
fn parse_date(value: &Value) -> Option<Option<NaiveDate>> {
    match value {
        Value::Null => Some(None),
        Value::String(text) if text.is_empty() => Some(None),
        Value::String(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()
            .map(Some),
        _ => None,
    }
}
