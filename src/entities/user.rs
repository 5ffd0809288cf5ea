use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Database entity for dashboard user accounts.
///
/// Deliberately not `Serialize`: the password hash must go through a
/// response DTO or not at all.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::api_key::Entity")]
    ApiKey,
    #[sea_orm(has_many = "super::news_item::Entity")]
    NewsItem,
    #[sea_orm(has_many = "super::radio_song::Entity")]
    RadioSong,
    #[sea_orm(has_many = "super::book::Entity")]
    Book,
}

impl Related<super::api_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApiKey.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
