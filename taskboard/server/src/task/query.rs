//! Translates listing filters and sort keys into sea-orm query fragments.
use crate::entities::task;
use sea_orm::sea_query::{CaseStatement, Expr, Func, NullOrdering, SimpleExpr};
use sea_orm::{Condition, Order, QueryOrder, Select};
use taskboard_core::{SortDirection, SortField, TaskPriority, TaskSort};

const LIKE_ESCAPE: char = '!';

/// Conjunctive listing filter. Empty strings count as absent. Status and
/// priority are compared literally, so an unknown value matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    status: Option<String>,
    priority: Option<String>,
    search: Option<String>,
}

impl TaskFilter {
    pub fn new(status: Option<String>, priority: Option<String>, search: Option<String>) -> Self {
        Self {
            status: non_empty(status),
            priority: non_empty(priority),
            search: non_empty(search),
        }
    }

    pub(crate) fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = &self.status {
            condition = condition.add(Expr::col(task::Column::Status).eq(status.as_str()));
        }
        if let Some(priority) = &self.priority {
            condition = condition.add(Expr::col(task::Column::Priority).eq(priority.as_str()));
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            condition = condition.add(
                Condition::any()
                    .add(lower_like(task::Column::Title, &pattern))
                    .add(lower_like(task::Column::Description, &pattern)),
            );
        }
        condition
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// `LOWER(column) LIKE LOWER(pattern)`. Both sides go through the database's
/// `LOWER` so they are folded by the same rules.
fn lower_like(column: task::Column, pattern: &str) -> SimpleExpr {
    Expr::cust_with_exprs(
        format!("$1 LIKE $2 ESCAPE '{LIKE_ESCAPE}'"),
        [
            SimpleExpr::from(Func::lower(Expr::col(column))),
            SimpleExpr::from(Func::lower(Expr::val(pattern))),
        ],
    )
}

/// Escapes LIKE wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// `CASE priority WHEN 'low' THEN 0 ...` so priority sorts by importance
/// instead of alphabetically.
fn priority_rank() -> SimpleExpr {
    TaskPriority::ALL
        .into_iter()
        .fold(CaseStatement::new(), |case, priority| {
            case.case(
                Expr::col(task::Column::Priority).eq(priority.as_str()),
                priority.rank(),
            )
        })
        .finally(-1)
        .into()
}

/// Orders `select` by `sort`, then by ascending ID. Tasks without a due date
/// come last in either direction.
pub(crate) fn apply_sort(select: Select<task::Entity>, sort: TaskSort) -> Select<task::Entity> {
    let order = match sort.direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    let select = match sort.field {
        SortField::CreatedAt => select.order_by(task::Column::CreatedAt, order),
        SortField::DueDate => {
            select.order_by_with_nulls(task::Column::DueDate, order, NullOrdering::Last)
        }
        SortField::Priority => select.order_by(priority_rank(), order),
    };
    select.order_by_asc(task::Column::Id)
}
