use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Domain errors surfaced by the service layer. The boundary maps each
/// variant to exactly one status code; nothing is retried internally.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Conflict(m) => (StatusCode::CONFLICT, (*m).to_string()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, (*m).to_string()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, (*m).to_string()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, (*m).to_string()),
            AppError::InvalidArgument(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (AppError::Conflict("dup"), StatusCode::CONFLICT),
            (AppError::Unauthorized("nope"), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("nope"), StatusCode::FORBIDDEN),
            (AppError::NotFound("gone"), StatusCode::NOT_FOUND),
            (
                AppError::InvalidArgument("bad sort".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
