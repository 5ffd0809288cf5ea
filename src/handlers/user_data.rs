use super::common::success_response;
use crate::{auth::CurrentUser, errors::ApiError, AppState};
use axum::{
    extract::{Extension, State},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

/// Aggregate of the caller's saved content history. Reachable with either a
/// session token or an API key; this is the canonical key-protected read.
pub async fn get_user_data(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.history.list_for_user(current_user.id).await?;

    Ok(success_response(json!({
        "success": true,
        "data": {
            "news": history.news,
            "radioSongs": history.radio_songs,
            "books": history.books,
        },
    })))
}
