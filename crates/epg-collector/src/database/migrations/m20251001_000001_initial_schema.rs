use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tables in order of dependencies
        self.create_channels_table(manager).await?;
        self.create_stream_urls_table(manager).await?;
        self.create_epg_programs_table(manager).await?;

        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(EpgPrograms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StreamUrls::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Channels::Table).to_owned())
            .await?;

        Ok(())
    }
}

impl Migration {
    // Helper functions for database-specific types
    fn create_id_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.uuid().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn create_timestamp_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn create_text_column(&self, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        col.string().not_null().default("");
        col
    }

    async fn create_channels_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Channels::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, Channels::Id).primary_key())
                    .col(ColumnDef::new(Channels::ExternalId).string().not_null())
                    .col(ColumnDef::new(Channels::Name).string().not_null())
                    .col(self.create_text_column(Channels::IconUrl))
                    .col(self.create_text_column(Channels::Category))
                    .col(self.create_timestamp_column(manager, Channels::CreatedAt))
                    .col(self.create_timestamp_column(manager, Channels::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_stream_urls_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StreamUrls::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, StreamUrls::Id).primary_key())
                    .col(self.create_id_column(manager, StreamUrls::ChannelId))
                    .col(ColumnDef::new(StreamUrls::Url).string().not_null())
                    .col(self.create_text_column(StreamUrls::Quality))
                    .col(self.create_text_column(StreamUrls::StreamType))
                    .col(ColumnDef::new(StreamUrls::Position).integer().not_null())
                    .col(self.create_timestamp_column(manager, StreamUrls::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stream_urls_channel_id")
                            .from(StreamUrls::Table, StreamUrls::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_epg_programs_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EpgPrograms::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, EpgPrograms::Id).primary_key())
                    .col(self.create_id_column(manager, EpgPrograms::ChannelId))
                    .col(self.create_text_column(EpgPrograms::ExternalId))
                    .col(ColumnDef::new(EpgPrograms::Title).string().not_null())
                    .col(self.create_text_column(EpgPrograms::Description))
                    .col(self.create_timestamp_column(manager, EpgPrograms::StartTime))
                    .col(self.create_timestamp_column(manager, EpgPrograms::EndTime))
                    .col(
                        ColumnDef::new(EpgPrograms::DurationMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(self.create_text_column(EpgPrograms::Category))
                    .col(self.create_text_column(EpgPrograms::Genre))
                    .col(self.create_text_column(EpgPrograms::AgeRating))
                    .col(ColumnDef::new(EpgPrograms::Year).integer().not_null().default(0))
                    .col(ColumnDef::new(EpgPrograms::Rating).float().not_null().default(0.0))
                    .col(self.create_text_column(EpgPrograms::PosterUrl))
                    .col(self.create_timestamp_column(manager, EpgPrograms::CreatedAt))
                    .col(self.create_timestamp_column(manager, EpgPrograms::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_epg_programs_channel_id")
                            .from(EpgPrograms::Table, EpgPrograms::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // External id is the sole correlation key for channels
        manager
            .create_index(
                Index::create()
                    .name("idx_channels_external_id")
                    .table(Channels::Table)
                    .col(Channels::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stream_urls_channel_id")
                    .table(StreamUrls::Table)
                    .col(StreamUrls::ChannelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_epg_programs_channel_external_id")
                    .table(EpgPrograms::Table)
                    .col(EpgPrograms::ChannelId)
                    .col(EpgPrograms::ExternalId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_epg_programs_channel_start_time")
                    .table(EpgPrograms::Table)
                    .col(EpgPrograms::ChannelId)
                    .col(EpgPrograms::StartTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Channels {
    Table,
    Id,
    ExternalId,
    Name,
    IconUrl,
    Category,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StreamUrls {
    Table,
    Id,
    ChannelId,
    Url,
    Quality,
    StreamType,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EpgPrograms {
    Table,
    Id,
    ChannelId,
    ExternalId,
    Title,
    Description,
    StartTime,
    EndTime,
    DurationMinutes,
    Category,
    Genre,
    AgeRating,
    Year,
    Rating,
    PosterUrl,
    CreatedAt,
    UpdatedAt,
}
