use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

const TODO_COLUMNS: &str = "id, title, completed, owner_id, created_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub owner_id: i64,
    pub created_at: OffsetDateTime,
}

/// Columns a list call may sort by. The service parses client input into this
/// enum, so arbitrary field names never reach the SQL below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Title,
    Completed,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
            SortField::Completed => "completed",
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "title" => Ok(SortField::Title),
            "completed" => Ok(SortField::Completed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(()),
        }
    }
}

pub async fn insert(
    db: &PgPool,
    owner_id: i64,
    title: &str,
    completed: bool,
) -> Result<Todo, sqlx::Error> {
    let sql = format!(
        "INSERT INTO todos (title, completed, owner_id) \
         VALUES ($1, $2, $3) \
         RETURNING {TODO_COLUMNS}"
    );
    sqlx::query_as::<_, Todo>(&sql)
        .bind(title)
        .bind(completed)
        .bind(owner_id)
        .fetch_one(db)
        .await
}

pub async fn get_by_id(db: &PgPool, id: i64) -> Result<Option<Todo>, sqlx::Error> {
    let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1");
    sqlx::query_as::<_, Todo>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// List with optional owner scope and completion filter, allow-listed sort
/// and offset/limit pagination. `owner_id = None` means all owners and is
/// only reachable through the admin path of the service.
pub async fn list(
    db: &PgPool,
    owner_id: Option<i64>,
    completed: Option<bool>,
    sort: SortField,
    order: SortOrder,
    skip: i64,
    limit: i64,
) -> Result<Vec<Todo>, sqlx::Error> {
    // sort/order come from enums above, never raw client strings.
    let sql = format!(
        "SELECT {TODO_COLUMNS} FROM todos \
         WHERE ($1::bigint IS NULL OR owner_id = $1) \
           AND ($2::boolean IS NULL OR completed = $2) \
         ORDER BY {} {} \
         LIMIT $3 OFFSET $4",
        sort.column(),
        order.sql()
    );
    sqlx::query_as::<_, Todo>(&sql)
        .bind(owner_id)
        .bind(completed)
        .bind(limit)
        .bind(skip)
        .fetch_all(db)
        .await
}

/// Persist the mutable fields of an already-merged row.
pub async fn update(db: &PgPool, todo: &Todo) -> Result<Todo, sqlx::Error> {
    let sql = format!(
        "UPDATE todos SET title = $1, completed = $2 \
         WHERE id = $3 \
         RETURNING {TODO_COLUMNS}"
    );
    sqlx::query_as::<_, Todo>(&sql)
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.id)
        .fetch_one(db)
        .await
}

pub async fn delete(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM todos WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_field_parses_allow_list_only() {
        assert_eq!("created_at".parse(), Ok(SortField::CreatedAt));
        assert_eq!("title".parse(), Ok(SortField::Title));
        assert_eq!("completed".parse(), Ok(SortField::Completed));
        assert!("password".parse::<SortField>().is_err());
        assert!("owner_id".parse::<SortField>().is_err());
        assert!("".parse::<SortField>().is_err());
    }

    #[test]
    fn sort_order_parses_asc_desc_only() {
        assert_eq!("asc".parse(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse(), Ok(SortOrder::Desc));
        assert!("ASC".parse::<SortOrder>().is_err());
        assert!("random".parse::<SortOrder>().is_err());
    }
}
