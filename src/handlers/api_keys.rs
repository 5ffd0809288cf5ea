use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::CurrentUser,
    entities::{api_key, api_key_usage},
    errors::ApiError,
    services::DEFAULT_USAGE_LIMIT,
    AppState,
};
use axum::{
    extract::{Extension, Json, Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Key metadata as returned by listing calls. The key string is masked;
/// the full plaintext is only ever present in the creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySummary {
    pub id: i64,
    pub api_key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<api_key::Model> for ApiKeySummary {
    fn from(model: api_key::Model) -> Self {
        Self {
            id: model.id,
            api_key: mask_key(&model.key),
            name: model.name,
            description: model.description,
            is_active: model.is_active,
            last_used_at: model.last_used_at,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

/// Creation response: the one place the plaintext key is exposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCreated {
    pub id: i64,
    pub api_key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<api_key::Model> for ApiKeyCreated {
    fn from(model: api_key::Model) -> Self {
        Self {
            id: model.id,
            api_key: model.key,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub id: i64,
    pub endpoint: String,
    pub method: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status_code: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<api_key_usage::Model> for UsageEntry {
    fn from(model: api_key_usage::Model) -> Self {
        Self {
            id: model.id,
            endpoint: model.endpoint,
            method: model.method,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            status_code: model.status_code,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 3650, message = "expiresInDays must be between 0 and 3650"))]
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleApiKeyRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub limit: Option<u64>,
}

fn mask_key(key: &str) -> String {
    if key.len() <= 14 {
        return "*".repeat(key.len());
    }
    format!("{}...{}", &key[..10], &key[key.len() - 4..])
}

/// List the caller's keys, newest first, key strings masked
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let keys = state.api_keys.find_by_user(current_user.id).await?;
    let summaries: Vec<ApiKeySummary> = keys.into_iter().map(ApiKeySummary::from).collect();

    Ok(success_response(json!({
        "success": true,
        "apiKeys": summaries,
    })))
}

/// Issue a new key for the caller
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateApiKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let expires_at = payload
        .expires_in_days
        .map(|days| Utc::now() + Duration::days(days));

    let created = state
        .api_keys
        .create(
            current_user.id,
            payload.name.or_else(|| Some("My API Key".to_string())),
            payload.description,
            expires_at,
        )
        .await?;

    Ok(created_response(json!({
        "success": true,
        "message": "API key created",
        "apiKey": ApiKeyCreated::from(created),
        "warning": "This key is only shown once. Store it somewhere safe.",
    })))
}

/// Delete one of the caller's keys. A key owned by someone else is
/// indistinguishable from a missing one.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.api_keys.delete(id, current_user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("API key not found".to_string()));
    }

    Ok(success_response(json!({
        "success": true,
        "message": "API key deleted",
    })))
}

/// Activate or deactivate one of the caller's keys
pub async fn toggle(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ToggleApiKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .api_keys
        .toggle_active(id, current_user.id, payload.is_active)
        .await?;
    if !updated {
        return Err(ApiError::NotFound("API key not found".to_string()));
    }

    let message = if payload.is_active {
        "API key activated"
    } else {
        "API key deactivated"
    };
    Ok(success_response(json!({
        "success": true,
        "message": message,
    })))
}

/// Usage history for one of the caller's keys, most recent first
pub async fn usage(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(query): Query<UsageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let key = state
        .api_keys
        .find_owned(id, current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("API key not found".to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_USAGE_LIMIT);
    let rows = state.usage.find_by_api_key(key.id, limit).await?;
    let entries: Vec<UsageEntry> = rows.into_iter().map(UsageEntry::from).collect();

    Ok(success_response(json!({
        "success": true,
        "usage": entries,
    })))
}
