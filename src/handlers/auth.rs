use super::common::{created_response, success_response, validate_input};
use super::users::UserResponse;
use crate::{auth::CurrentUser, errors::ApiError, AppState};
use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters long"))]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Create an account and return a session token
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let password_hash = state
        .auth
        .hash_password(&payload.password)
        .map_err(|_| ApiError::InternalServerError)?;

    // Default display name: the local part of the email, as the dashboard UI
    // expects something to show.
    let name = payload
        .name
        .clone()
        .or_else(|| payload.email.split('@').next().map(str::to_string));

    let user = state
        .users
        .create(&payload.email, &password_hash, name)
        .await?;
    let token = state
        .auth
        .issue_token(user.id, &user.email)
        .map_err(|_| ApiError::InternalServerError)?;

    info!(user_id = user.id, "signup completed");

    Ok(created_response(json!({
        "success": true,
        "message": "Account created",
        "user": UserResponse::from(user),
        "token": token,
    })))
}

/// Verify credentials and return a session token. Unknown email and wrong
/// password produce the same response.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let password_ok = state
        .auth
        .verify_password(&payload.password, &user.password_hash)
        .map_err(|_| ApiError::InternalServerError)?;
    if !password_ok {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = state
        .auth
        .issue_token(user.id, &user.email)
        .map_err(|_| ApiError::InternalServerError)?;

    info!(user_id = user.id, "login succeeded");

    Ok(success_response(json!({
        "success": true,
        "message": "Login successful",
        "user": UserResponse::from(user),
        "token": token,
    })))
}

/// Identity behind the current session token
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_id(current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(success_response(json!({
        "success": true,
        "user": UserResponse::from(user),
    })))
}
