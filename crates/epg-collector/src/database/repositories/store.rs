//! `CollectionStore` backed by the SeaORM repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use super::{ChannelSeaOrmRepository, CollectionStore, EpgProgramSeaOrmRepository};
use crate::errors::RepositoryResult;
use crate::models::{
    Channel, ChannelUpsertRequest, EpgProgram, EpgProgramCreateRequest, ProgramWriteOutcome,
};

#[derive(Clone)]
pub struct SeaOrmCollectionStore {
    channels: ChannelSeaOrmRepository,
    programs: EpgProgramSeaOrmRepository,
}

impl SeaOrmCollectionStore {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            channels: ChannelSeaOrmRepository::new(connection.clone()),
            programs: EpgProgramSeaOrmRepository::new(connection),
        }
    }
}

#[async_trait]
impl CollectionStore for SeaOrmCollectionStore {
    async fn find_channel_by_external_id(
        &self,
        external_id: &str,
    ) -> RepositoryResult<Option<Channel>> {
        self.channels.find_by_external_id(external_id).await
    }

    async fn create_channel(&self, request: &ChannelUpsertRequest) -> RepositoryResult<Channel> {
        self.channels.create(request).await
    }

    async fn update_channel(
        &self,
        id: Uuid,
        request: &ChannelUpsertRequest,
    ) -> RepositoryResult<Channel> {
        self.channels.update(id, request).await
    }

    async fn list_channels(&self) -> RepositoryResult<Vec<Channel>> {
        self.channels.find_all().await
    }

    async fn create_program(
        &self,
        request: &EpgProgramCreateRequest,
    ) -> RepositoryResult<EpgProgram> {
        self.programs.create(request).await
    }

    async fn upsert_program(
        &self,
        request: &EpgProgramCreateRequest,
    ) -> RepositoryResult<ProgramWriteOutcome> {
        let (_, outcome) = self.programs.upsert(request).await?;
        Ok(outcome)
    }

    async fn count_channels(&self) -> RepositoryResult<u64> {
        self.channels.count().await
    }

    async fn count_programs(&self) -> RepositoryResult<u64> {
        self.programs.count().await
    }

    async fn find_programs_by_channel(
        &self,
        channel_id: Uuid,
        limit: u64,
    ) -> RepositoryResult<Vec<EpgProgram>> {
        self.programs.find_by_channel_id(channel_id, limit).await
    }

    async fn find_programs_in_range(
        &self,
        channel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Vec<EpgProgram>> {
        self.programs.find_in_range(channel_id, from, to).await
    }
}
