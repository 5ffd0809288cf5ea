use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Database entity for API keys.
///
/// The `key` column holds the opaque bearer string and is globally unique;
/// `is_active` and `expires_at` together decide whether a key is usable.
/// Deliberately not `Serialize`: the plaintext key only leaves through the
/// creation DTO, masked everywhere else.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "api_keys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    #[sea_orm(unique, column_type = "Text")]
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Model {
    /// A key is usable only while active and, when an expiry is set, before it.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |exp| exp > now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::api_key_usage::Entity")]
    ApiKeyUsage,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::api_key_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApiKeyUsage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
