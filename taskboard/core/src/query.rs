//! Listing parameters and the paginated response envelope.
use crate::task::{Task, TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Message attached to a listing when nothing matched.
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    CreatedAt,
    DueDate,
    Priority,
}

impl SortField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::DueDate => "due_date",
            Self::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort '{0}', expected <created_at|due_date|priority>:<asc|desc>")]
pub struct ParseSortError(pub String);

/// Ordering for a listing, written on the wire as `field:direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl TaskSort {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parses a raw `sort` parameter, falling back to newest-first when the
    /// value is absent or not recognised.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }
}

impl Default for TaskSort {
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }
}

impl FromStr for TaskSort {
    type Err = ParseSortError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSortError(value.to_owned());
        let (field, direction) = value.split_once(':').ok_or_else(invalid)?;
        let field = match field {
            "created_at" => SortField::CreatedAt,
            "due_date" => SortField::DueDate,
            "priority" => SortField::Priority,
            _ => return Err(invalid()),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        Ok(Self::new(field, direction))
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.as_str(), self.direction.as_str())
    }
}

impl Serialize for TaskSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved page window. Construction clamps out-of-range input so every
/// value is usable directly for offset arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Pages below 1 become 1; limits below 1 become the default and limits
    /// above the maximum are capped.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(page) if page >= 1 => page.unsigned_abs(),
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(limit) if limit >= 1 => limit.unsigned_abs().min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Same as [`PageRequest::new`] for raw query-string values. Anything that
    /// is not an integer is treated as absent.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|value| value.trim().parse::<i64>().ok());
        Self::new(parse(page), parse(limit))
    }

    pub const fn page(&self) -> u64 {
        self.page
    }

    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Rows to skip, capped to what a signed 64-bit OFFSET can hold.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX.unsigned_abs())
    }
}

/// Filters and paging a client sends to the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<TaskSort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl PageMeta {
    /// Number of pages needed to show `total` rows at this page size.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}

/// One page of tasks plus the metadata needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TaskPage {
    pub data: Vec<Task>,
    pub meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskPage {
    /// Builds a page, attaching the no-results message when `data` is empty
    /// (including a page past the last one).
    pub fn new(data: Vec<Task>, request: PageRequest, total: u64) -> Self {
        let message = data.is_empty().then(|| NO_RESULTS_MESSAGE.to_owned());
        Self {
            data,
            meta: PageMeta {
                page: request.page(),
                limit: request.limit(),
                total,
            },
            message,
        }
    }
}
