use super::common::{success_response, validate_input};
use crate::{
    auth::CurrentUser,
    entities::user,
    errors::ApiError,
    AppState,
};
use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Wire representation of a user account. The password hash never crosses
/// this boundary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters long"))]
    pub new_password: String,
}

/// Current user's profile
pub async fn get_profile(
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

/// Update name and/or email
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .users
        .update_profile(current_user.id, payload.name, payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(success_response(json!({
        "success": true,
        "message": "Profile updated",
        "user": UserResponse::from(updated),
    })))
}

/// Change password after verifying the current one
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .users
        .find_by_id(current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let current_ok = state
        .auth
        .verify_password(&payload.current_password, &user.password_hash)
        .map_err(|_| ApiError::InternalServerError)?;
    if !current_ok {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = state
        .auth
        .hash_password(&payload.new_password)
        .map_err(|_| ApiError::InternalServerError)?;
    state.users.update_password(current_user.id, &new_hash).await?;

    info!(user_id = current_user.id, "password changed");

    Ok(success_response(json!({
        "success": true,
        "message": "Password changed",
    })))
}

/// Delete the account along with its keys, usage records, and content
/// history.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.users.delete(current_user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(success_response(json!({
        "success": true,
        "message": "Account deleted",
    })))
}
