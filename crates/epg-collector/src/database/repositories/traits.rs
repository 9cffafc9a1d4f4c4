//! Persistence capability consumed by the ingestor
//!
//! The ingestor only sees this trait, so reconcilers can be exercised against
//! in-memory fakes as well as the SeaORM-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::RepositoryResult;
use crate::models::{
    Channel, ChannelUpsertRequest, EpgProgram, EpgProgramCreateRequest, ProgramWriteOutcome,
};

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn find_channel_by_external_id(&self, external_id: &str)
    -> RepositoryResult<Option<Channel>>;

    /// Create a channel together with its stream URLs
    async fn create_channel(&self, request: &ChannelUpsertRequest) -> RepositoryResult<Channel>;

    /// Overwrite a channel and replace its stream URL set atomically
    async fn update_channel(
        &self,
        id: Uuid,
        request: &ChannelUpsertRequest,
    ) -> RepositoryResult<Channel>;

    async fn list_channels(&self) -> RepositoryResult<Vec<Channel>>;

    async fn create_program(&self, request: &EpgProgramCreateRequest)
    -> RepositoryResult<EpgProgram>;

    /// Match on (channel, external id); update when found, insert otherwise
    async fn upsert_program(
        &self,
        request: &EpgProgramCreateRequest,
    ) -> RepositoryResult<ProgramWriteOutcome>;

    async fn count_channels(&self) -> RepositoryResult<u64>;

    async fn count_programs(&self) -> RepositoryResult<u64>;

    async fn find_programs_by_channel(
        &self,
        channel_id: Uuid,
        limit: u64,
    ) -> RepositoryResult<Vec<EpgProgram>>;

    async fn find_programs_in_range(
        &self,
        channel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Vec<EpgProgram>>;
}
