use crate::db::DbPool;
use crate::entities::{api_key, api_key_usage, user};
use crate::errors::ServiceError;
use crate::services::history::HistoryService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Credential store: user records with unique email and argon2 password
/// hashes.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    history: HistoryService,
}

impl UserService {
    pub fn new(db: Arc<DbPool>, history: HistoryService) -> Self {
        Self { db, history }
    }

    /// Creates a user. A duplicate email is reported as a conflict rather
    /// than a bare database error.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<String>,
    ) -> Result<user::Model, ServiceError> {
        let db = &*self.db;
        let now = Utc::now();
        let result = user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await;

        match result {
            Ok(created) => {
                info!(user_id = created.id, "user created");
                Ok(created)
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(ServiceError::Conflict("Email already in use".to_string()))
            }
            Err(err) => Err(ServiceError::DatabaseError(err)),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        let db = &*self.db;
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<user::Model>, ServiceError> {
        let db = &*self.db;
        let found = user::Entity::find_by_id(id).one(db).await?;
        Ok(found)
    }

    /// Updates name and/or email. An email change re-checks uniqueness
    /// against other accounts.
    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        id: i64,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Option<user::Model>, ServiceError> {
        let db = &*self.db;

        if let Some(new_email) = &email {
            let taken = user::Entity::find()
                .filter(user::Column::Email.eq(new_email))
                .filter(user::Column::Id.ne(id))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::Conflict("Email already in use".to_string()));
            }
        }

        let Some(existing) = user::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(Some(name));
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Some(updated))
    }

    #[instrument(skip(self, password_hash))]
    pub async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, ServiceError> {
        let db = &*self.db;
        let Some(existing) = user::Entity::find_by_id(id).one(db).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        Ok(true)
    }

    /// Deletes an account with an explicit cascade: usage rows of the user's
    /// keys, then the keys, then content history, then the user row. The
    /// store declares the references but does not cascade on its own.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let db = &*self.db;

        let key_ids: Vec<i64> = api_key::Entity::find()
            .filter(api_key::Column::UserId.eq(id))
            .select_only()
            .column(api_key::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        if !key_ids.is_empty() {
            api_key_usage::Entity::delete_many()
                .filter(api_key_usage::Column::ApiKeyId.is_in(key_ids))
                .exec(db)
                .await?;
            api_key::Entity::delete_many()
                .filter(api_key::Column::UserId.eq(id))
                .exec(db)
                .await?;
        }

        self.history.delete_by_user(id).await?;

        let result = user::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected > 0 {
            info!(user_id = id, "account deleted");
        }
        Ok(result.rows_affected > 0)
    }
}
