use crate::auth::AuthService;
use crate::db::DbPool;
use crate::entities::api_key;
use crate::errors::ServiceError;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// How many fresh tokens to try when the store reports a key collision.
/// With 256 bits of entropy a single retry is already unreachable in
/// practice; the bound exists so a broken RNG cannot loop forever.
const MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Registry for opaque API keys: issuance, lookup, ownership-checked
/// mutation.
#[derive(Clone)]
pub struct ApiKeyService {
    db: Arc<DbPool>,
    auth: AuthService,
}

impl ApiKeyService {
    pub fn new(db: Arc<DbPool>, auth: AuthService) -> Self {
        Self { db, auth }
    }

    /// Issues a new key for a user. The returned model carries the plaintext
    /// key string; this is the only point where it is exposed.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        user_id: i64,
        name: Option<String>,
        description: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<api_key::Model, ServiceError> {
        let db = &*self.db;

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let key_string = self.auth.generate_key_string();
            let model = api_key::ActiveModel {
                user_id: Set(user_id),
                key: Set(key_string),
                name: Set(name.clone()),
                description: Set(description.clone()),
                is_active: Set(true),
                last_used_at: Set(None),
                created_at: Set(Utc::now()),
                expires_at: Set(expires_at),
                ..Default::default()
            };

            match model.insert(db).await {
                Ok(created) => {
                    info!(key_id = created.id, user_id, "API key created");
                    return Ok(created);
                }
                Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    warn!(attempt, "generated API key collided, retrying with a fresh token");
                    continue;
                }
                Err(err) => return Err(ServiceError::DatabaseError(err)),
            }
        }

        Err(ServiceError::InternalError(
            "could not generate a unique API key".to_string(),
        ))
    }

    /// All keys for a user, newest-created first.
    #[instrument(skip(self))]
    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<api_key::Model>, ServiceError> {
        let db = &*self.db;
        let keys = api_key::Entity::find()
            .filter(api_key::Column::UserId.eq(user_id))
            .order_by_desc(api_key::Column::CreatedAt)
            .order_by_desc(api_key::Column::Id)
            .all(db)
            .await?;
        Ok(keys)
    }

    /// Look up an active key by its string. Expired keys are invisible: the
    /// row stays in the store but the lookup reports not-found.
    #[instrument(skip_all)]
    pub async fn find_by_key(&self, key: &str) -> Result<Option<api_key::Model>, ServiceError> {
        let db = &*self.db;
        let found = api_key::Entity::find()
            .filter(api_key::Column::Key.eq(key))
            .filter(api_key::Column::IsActive.eq(true))
            .one(db)
            .await?;

        Ok(found.filter(|k| k.is_usable(Utc::now())))
    }

    /// Side-effect-only update of the last-used timestamp.
    #[instrument(skip(self))]
    pub async fn touch_last_used(&self, key_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        api_key::Entity::update_many()
            .col_expr(api_key::Column::LastUsedAt, Expr::value(Some(Utc::now())))
            .filter(api_key::Column::Id.eq(key_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Deletes a key only when it belongs to `user_id`. The owner id is part
    /// of the delete predicate, so a non-owned id behaves exactly like a
    /// missing one.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, ServiceError> {
        let db = &*self.db;
        let result = api_key::Entity::delete_many()
            .filter(api_key::Column::Id.eq(id))
            .filter(api_key::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        if result.rows_affected > 0 {
            info!(key_id = id, user_id, "API key deleted");
        }
        Ok(result.rows_affected > 0)
    }

    /// Flips the active flag, same ownership predicate as [`delete`].
    ///
    /// [`delete`]: ApiKeyService::delete
    #[instrument(skip(self))]
    pub async fn toggle_active(
        &self,
        id: i64,
        user_id: i64,
        is_active: bool,
    ) -> Result<bool, ServiceError> {
        let db = &*self.db;
        let result = api_key::Entity::update_many()
            .col_expr(api_key::Column::IsActive, Expr::value(is_active))
            .filter(api_key::Column::Id.eq(id))
            .filter(api_key::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Fetch a key by id with the ownership predicate, for read paths that
    /// must not leak other users' keys.
    #[instrument(skip(self))]
    pub async fn find_owned(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<api_key::Model>, ServiceError> {
        let db = &*self.db;
        let key = api_key::Entity::find()
            .filter(api_key::Column::Id.eq(id))
            .filter(api_key::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(key)
    }
}
