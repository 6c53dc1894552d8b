//! Authorization-aware todo service. Ownership and role rules live here and
//! nowhere else; the repo functions below this layer are authorization-free
//! and must only be reached through it.

use sqlx::PgPool;
use tracing::{debug, warn};

use crate::auth::Principal;
use crate::error::AppError;
use crate::todos::dto::{CreateTodoRequest, UpdateTodoRequest};
use crate::todos::repo::{self, SortField, SortOrder, Todo};

/// The single access policy: admins bypass every ownership check, everyone
/// else must own the row.
pub fn can_access(principal: &Principal, todo: &Todo) -> bool {
    principal.is_admin() || todo.owner_id == principal.id
}

fn parse_sort(sort_by: &str, order: &str) -> Result<(SortField, SortOrder), AppError> {
    let field = sort_by
        .parse::<SortField>()
        .map_err(|_| AppError::InvalidArgument(format!("Invalid sort field: {sort_by}")))?;
    let order = order
        .parse::<SortOrder>()
        .map_err(|_| AppError::InvalidArgument(format!("Invalid sort order: {order}")))?;
    Ok((field, order))
}

fn apply_patch(todo: &mut Todo, patch: UpdateTodoRequest) {
    if let Some(title) = patch.title {
        todo.title = title;
    }
    if let Some(completed) = patch.completed {
        todo.completed = completed;
    }
}

/// The owner is always the caller; any owner value in the payload would be
/// spoofable, so none is accepted.
pub async fn create_todo(
    db: &PgPool,
    principal: Principal,
    input: CreateTodoRequest,
) -> Result<Todo, AppError> {
    let todo = repo::insert(db, principal.id, &input.title, input.completed).await?;
    debug!(todo_id = todo.id, owner_id = todo.owner_id, "todo created");
    Ok(todo)
}

/// Admins list across all owners; everyone else is scoped to their own rows
/// no matter what filter/sort/page they ask for.
pub async fn list_todos(
    db: &PgPool,
    principal: Principal,
    completed: Option<bool>,
    sort_by: &str,
    order: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<Todo>, AppError> {
    let (sort, order) = parse_sort(sort_by, order)?;
    let owner_scope = if principal.is_admin() {
        None
    } else {
        Some(principal.id)
    };
    let todos = repo::list(db, owner_scope, completed, sort, order, skip, limit).await?;
    Ok(todos)
}

/// NotFound before Forbidden: a missing row is 404 even for its would-be
/// owner, and an existing row the caller may not touch is 403.
pub async fn get_todo(db: &PgPool, todo_id: i64, principal: Principal) -> Result<Todo, AppError> {
    let todo = repo::get_by_id(db, todo_id)
        .await?
        .ok_or(AppError::NotFound("Todo not found"))?;

    if !can_access(&principal, &todo) {
        warn!(
            todo_id,
            caller_id = principal.id,
            owner_id = todo.owner_id,
            "access denied"
        );
        return Err(AppError::Forbidden("Forbidden"));
    }

    Ok(todo)
}

/// Partial update: only the fields present in the patch are applied,
/// everything else keeps its stored value. Last writer wins; there is no
/// version token.
pub async fn update_todo(
    db: &PgPool,
    todo_id: i64,
    principal: Principal,
    patch: UpdateTodoRequest,
) -> Result<Todo, AppError> {
    let mut todo = get_todo(db, todo_id, principal).await?;
    apply_patch(&mut todo, patch);
    let todo = repo::update(db, &todo).await?;
    debug!(todo_id = todo.id, "todo updated");
    Ok(todo)
}

pub async fn delete_todo(db: &PgPool, todo_id: i64, principal: Principal) -> Result<(), AppError> {
    let todo = get_todo(db, todo_id, principal).await?;
    repo::delete(db, todo.id).await?;
    debug!(todo_id = todo.id, "todo deleted");
    Ok(())
}
