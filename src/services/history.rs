use crate::db::DbPool;
use crate::entities::{book, news_item, radio_song};
use crate::errors::ServiceError;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

/// A user's saved dashboard content, grouped per source.
#[derive(Debug, Default)]
pub struct UserHistory {
    pub news: Vec<news_item::Model>,
    pub radio_songs: Vec<radio_song::Model>,
    pub books: Vec<book::Model>,
}

/// Read/delete access to the content-history tables. The rows themselves are
/// written by the content proxies, which sit outside this service.
#[derive(Clone)]
pub struct HistoryService {
    db: Arc<DbPool>,
}

impl HistoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: i64) -> Result<UserHistory, ServiceError> {
        let db = &*self.db;

        let news = news_item::Entity::find()
            .filter(news_item::Column::UserId.eq(user_id))
            .order_by_desc(news_item::Column::CollectedAt)
            .all(db)
            .await?;
        let radio_songs = radio_song::Entity::find()
            .filter(radio_song::Column::UserId.eq(user_id))
            .order_by_desc(radio_song::Column::CollectedAt)
            .all(db)
            .await?;
        let books = book::Entity::find()
            .filter(book::Column::UserId.eq(user_id))
            .order_by_desc(book::Column::CollectedAt)
            .all(db)
            .await?;

        Ok(UserHistory {
            news,
            radio_songs,
            books,
        })
    }

    /// Removes all content history for a user, returning per-table row
    /// counts. Counts are reported as-is; zero is a normal outcome, not a
    /// failure.
    #[instrument(skip(self))]
    pub async fn delete_by_user(&self, user_id: i64) -> Result<(u64, u64, u64), ServiceError> {
        let db = &*self.db;

        let news = news_item::Entity::delete_many()
            .filter(news_item::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        let songs = radio_song::Entity::delete_many()
            .filter(radio_song::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        let books = book::Entity::delete_many()
            .filter(book::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        Ok((
            news.rows_affected,
            songs.rows_affected,
            books.rows_affected,
        ))
    }
}
