use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RefreshRequest, SignupRequest, TokenResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
        token::generate_refresh_token,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/admin", get(admin_dashboard))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Signup does not auto-login: the client gets a public profile and has to
/// call /auth/login for tokens.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::InvalidArgument("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::InvalidArgument("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;

    // Two signups can race past the lookup above; the unique index on email
    // settles it.
    let user = User::create(&state.db, &payload.email, &hash, payload.nickname.as_deref())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered")
            }
            _ => AppError::from(e),
        })?;

    info!(user_id = user.id, email = %user.email, "user signed up");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

/// Unknown email and wrong password return the same error, so the endpoint
/// cannot be used to enumerate accounts.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            AppError::Unauthorized("Invalid credentials")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id, user.role)?;

    // Single live refresh token per user: issuing a new one revokes the old.
    let refresh_token = generate_refresh_token();
    User::set_refresh_token(&state.db, user.id, Some(&refresh_token)).await?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    }))
}

/// Clears the stored refresh token. The outstanding access token stays valid
/// until its own expiry; logout only revokes future refreshes.
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<StatusCode, AppError> {
    User::set_refresh_token(&state.db, principal.id, None).await?;
    info!(user_id = principal.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// Mints a new access token for the bearer of a stored refresh token. The
/// refresh token is rotated on every use.
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = User::find_by_refresh_token(&state.db, &payload.refresh_token)
        .await?
        .ok_or_else(|| {
            warn!("refresh token lookup miss");
            AppError::Unauthorized("Invalid refresh token")
        })?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id, user.role)?;

    let refresh_token = generate_refresh_token();
    User::set_refresh_token(&state.db, user.id, Some(&refresh_token)).await?;

    info!(user_id = user.id, "access token refreshed");
    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::find_by_id(&state.db, principal.id)
        .await?
        .ok_or(AppError::Unauthorized("User not found"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    if !principal.is_admin() {
        return Err(AppError::Forbidden("Insufficient permission"));
    }
    let user = User::find_by_id(&state.db, principal.id)
        .await?
        .ok_or(AppError::Unauthorized("User not found"))?;
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@example.org"));
    }

    #[test]
    fn email_validation_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@example.com"));
    }
}
