use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;
use crate::todos::repo::Todo;

pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Patch body: only the fields present are applied. The owner is never a
/// mutable field through this path.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub completed: Option<bool>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_order")]
    pub order: String,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_sort_by() -> String {
    "created_at".into()
}
fn default_order() -> String {
    "desc".into()
}
fn default_limit() -> i64 {
    20
}

impl ListQuery {
    /// Pagination bounds are a boundary concern; the service never sees
    /// out-of-range values.
    pub fn validate_page(&self) -> Result<(), AppError> {
        if self.skip < 0 {
            return Err(AppError::InvalidArgument("skip must be >= 0".into()));
        }
        if self.limit < 1 || self.limit > MAX_PAGE_LIMIT {
            return Err(AppError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub owner_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            completed: todo.completed,
            owner_id: todo.owner_id,
            created_at: todo.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(skip: i64, limit: i64) -> ListQuery {
        ListQuery {
            completed: None,
            sort_by: default_sort_by(),
            order: default_order(),
            skip,
            limit,
        }
    }

    #[test]
    fn default_page_is_valid() {
        assert!(query(0, default_limit()).validate_page().is_ok());
    }

    #[test]
    fn negative_skip_is_rejected() {
        assert!(matches!(
            query(-1, 10).validate_page(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn limit_bounds_are_enforced() {
        assert!(matches!(
            query(0, 0).validate_page(),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            query(0, MAX_PAGE_LIMIT + 1).validate_page(),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(query(0, MAX_PAGE_LIMIT).validate_page().is_ok());
        assert!(query(0, 1).validate_page().is_ok());
    }
}
