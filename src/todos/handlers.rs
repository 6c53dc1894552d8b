use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::todos::dto::{CreateTodoRequest, ListQuery, TodoResponse, UpdateTodoRequest};
use crate::todos::services;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/:id", get(get_todo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", post(create_todo))
        .route("/todos/:id", patch(update_todo))
        .route("/todos/:id", delete(delete_todo))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), AppError> {
    let todo = services::create_todo(&state.db, principal, payload).await?;
    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    q.validate_page()?;
    let todos = services::list_todos(
        &state.db,
        principal,
        q.completed,
        &q.sort_by,
        &q.order,
        q.skip,
        q.limit,
    )
    .await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = services::get_todo(&state.db, id, principal).await?;
    Ok(Json(TodoResponse::from(todo)))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = services::update_todo(&state.db, id, principal, payload).await?;
    Ok(Json(TodoResponse::from(todo)))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::delete_todo(&state.db, id, principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
