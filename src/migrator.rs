use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_api_keys_table::Migration),
            Box::new(m20240101_000003_create_api_key_usage_table::Migration),
            Box::new(m20240101_000004_create_content_history_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Users::Name).string().null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        Name,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_api_keys_table {
    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_users_table::Users;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_api_keys_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ApiKeys::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ApiKeys::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ApiKeys::UserId).big_integer().not_null())
                        .col(ColumnDef::new(ApiKeys::Key).text().not_null().unique_key())
                        .col(ColumnDef::new(ApiKeys::Name).string().null())
                        .col(ColumnDef::new(ApiKeys::Description).string().null())
                        .col(
                            ColumnDef::new(ApiKeys::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ApiKeys::LastUsedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ApiKeys::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApiKeys::ExpiresAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_api_keys_user_id")
                                .from(ApiKeys::Table, ApiKeys::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_api_keys_user_id")
                        .table(ApiKeys::Table)
                        .col(ApiKeys::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ApiKeys::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ApiKeys {
        Table,
        Id,
        UserId,
        Key,
        Name,
        Description,
        IsActive,
        LastUsedAt,
        CreatedAt,
        ExpiresAt,
    }
}

mod m20240101_000003_create_api_key_usage_table {
    use sea_orm_migration::prelude::*;

    use super::m20240101_000002_create_api_keys_table::ApiKeys;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_api_key_usage_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ApiKeyUsage::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ApiKeyUsage::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ApiKeyUsage::ApiKeyId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ApiKeyUsage::Endpoint).string().not_null())
                        .col(ColumnDef::new(ApiKeyUsage::Method).string().not_null())
                        .col(ColumnDef::new(ApiKeyUsage::IpAddress).string().null())
                        .col(ColumnDef::new(ApiKeyUsage::UserAgent).string().null())
                        .col(ColumnDef::new(ApiKeyUsage::StatusCode).integer().null())
                        .col(
                            ColumnDef::new(ApiKeyUsage::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_api_key_usage_api_key_id")
                                .from(ApiKeyUsage::Table, ApiKeyUsage::ApiKeyId)
                                .to(ApiKeys::Table, ApiKeys::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_api_key_usage_api_key_id")
                        .table(ApiKeyUsage::Table)
                        .col(ApiKeyUsage::ApiKeyId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ApiKeyUsage::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ApiKeyUsage {
        Table,
        Id,
        ApiKeyId,
        Endpoint,
        Method,
        IpAddress,
        UserAgent,
        StatusCode,
        CreatedAt,
    }
}

mod m20240101_000004_create_content_history_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_users_table::Users;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_content_history_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(NewsItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(NewsItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(NewsItems::UserId).big_integer().not_null())
                        .col(ColumnDef::new(NewsItems::Title).string().not_null())
                        .col(ColumnDef::new(NewsItems::Summary).text().null())
                        .col(ColumnDef::new(NewsItems::Source).string().null())
                        .col(ColumnDef::new(NewsItems::Category).string().null())
                        .col(ColumnDef::new(NewsItems::Keyword).string().null())
                        .col(ColumnDef::new(NewsItems::Url).text().null())
                        .col(ColumnDef::new(NewsItems::PublishedDate).string().null())
                        .col(
                            ColumnDef::new(NewsItems::CollectedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_news_items_user_id")
                                .from(NewsItems::Table, NewsItems::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RadioSongs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RadioSongs::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RadioSongs::UserId).big_integer().not_null())
                        .col(ColumnDef::new(RadioSongs::Title).string().not_null())
                        .col(ColumnDef::new(RadioSongs::Artist).string().null())
                        .col(ColumnDef::new(RadioSongs::Genre).string().null())
                        .col(
                            ColumnDef::new(RadioSongs::PlayCount)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(RadioSongs::LastPlayed).string().null())
                        .col(
                            ColumnDef::new(RadioSongs::CollectedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_radio_songs_user_id")
                                .from(RadioSongs::Table, RadioSongs::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Books::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Books::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Books::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Books::Title).string().not_null())
                        .col(ColumnDef::new(Books::Authors).string().null())
                        .col(ColumnDef::new(Books::Description).text().null())
                        .col(ColumnDef::new(Books::ImageUrl).text().null())
                        .col(ColumnDef::new(Books::PreviewLink).text().null())
                        .col(ColumnDef::new(Books::PublishedDate).string().null())
                        .col(ColumnDef::new(Books::Categories).string().null())
                        .col(
                            ColumnDef::new(Books::CollectedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_books_user_id")
                                .from(Books::Table, Books::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Books::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RadioSongs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(NewsItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum NewsItems {
        Table,
        Id,
        UserId,
        Title,
        Summary,
        Source,
        Category,
        Keyword,
        Url,
        PublishedDate,
        CollectedAt,
    }

    #[derive(DeriveIden)]
    pub enum RadioSongs {
        Table,
        Id,
        UserId,
        Title,
        Artist,
        Genre,
        PlayCount,
        LastPlayed,
        CollectedAt,
    }

    #[derive(DeriveIden)]
    pub enum Books {
        Table,
        Id,
        UserId,
        Title,
        Authors,
        Description,
        ImageUrl,
        PreviewLink,
        PublishedDate,
        Categories,
        CollectedAt,
    }
}
