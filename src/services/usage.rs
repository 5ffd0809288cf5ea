use crate::db::DbPool;
use crate::entities::api_key_usage;
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use std::sync::Arc;
use tracing::instrument;

pub const DEFAULT_USAGE_LIMIT: u64 = 100;

/// Append-only ledger of API-key-authenticated calls.
#[derive(Clone)]
pub struct UsageService {
    db: Arc<DbPool>,
}

impl UsageService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Appends one audit row. Callers on the request path treat a failure
    /// here as log-and-continue; the error is still surfaced so nothing is
    /// dropped silently.
    #[instrument(skip(self))]
    pub async fn record(
        &self,
        api_key_id: i64,
        endpoint: &str,
        method: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
        status_code: Option<i32>,
    ) -> Result<(), ServiceError> {
        let db = &*self.db;
        api_key_usage::ActiveModel {
            api_key_id: Set(api_key_id),
            endpoint: Set(endpoint.to_string()),
            method: Set(method.to_string()),
            ip_address: Set(ip_address),
            user_agent: Set(user_agent),
            status_code: Set(status_code),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(())
    }

    /// Usage rows for one key, most recent first, bounded by `limit`.
    #[instrument(skip(self))]
    pub async fn find_by_api_key(
        &self,
        api_key_id: i64,
        limit: u64,
    ) -> Result<Vec<api_key_usage::Model>, ServiceError> {
        let db = &*self.db;
        let rows = api_key_usage::Entity::find()
            .filter(api_key_usage::Column::ApiKeyId.eq(api_key_id))
            .order_by_desc(api_key_usage::Column::CreatedAt)
            .order_by_desc(api_key_usage::Column::Id)
            .limit(limit)
            .all(db)
            .await?;
        Ok(rows)
    }
}
