//! SeaORM-based EPG Program repository implementation

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{epg_programs, prelude::EpgPrograms};
use crate::errors::RepositoryResult;
use crate::models::{EpgProgram, EpgProgramCreateRequest, ProgramWriteOutcome};

/// SeaORM repository for EPG programs
#[derive(Clone)]
pub struct EpgProgramSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl EpgProgramSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Insert a program row unconditionally
    pub async fn create(&self, request: &EpgProgramCreateRequest) -> RepositoryResult<EpgProgram> {
        let now = Utc::now();
        let active_model = epg_programs::ActiveModel {
            id: Set(Uuid::new_v4()),
            channel_id: Set(request.channel_id),
            external_id: Set(request.external_id.clone()),
            title: Set(request.title.clone()),
            description: Set(request.description.clone()),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            duration_minutes: Set(request.duration_minutes),
            category: Set(request.category.clone()),
            genre: Set(request.genre.clone()),
            age_rating: Set(request.age_rating.clone()),
            year: Set(request.year),
            rating: Set(request.rating),
            poster_url: Set(request.poster_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::model_to_domain(model))
    }

    /// Update the row matching (channel, external id) in place, or insert it
    pub async fn upsert(
        &self,
        request: &EpgProgramCreateRequest,
    ) -> RepositoryResult<(EpgProgram, ProgramWriteOutcome)> {
        let existing = EpgPrograms::find()
            .filter(epg_programs::Column::ChannelId.eq(request.channel_id))
            .filter(epg_programs::Column::ExternalId.eq(request.external_id.as_str()))
            .one(&*self.connection)
            .await?;

        let Some(existing) = existing else {
            let program = self.create(request).await?;
            return Ok((program, ProgramWriteOutcome::Created));
        };

        let mut active_model: epg_programs::ActiveModel = existing.into();
        active_model.title = Set(request.title.clone());
        active_model.description = Set(request.description.clone());
        active_model.start_time = Set(request.start_time);
        active_model.end_time = Set(request.end_time);
        active_model.duration_minutes = Set(request.duration_minutes);
        active_model.category = Set(request.category.clone());
        active_model.genre = Set(request.genre.clone());
        active_model.age_rating = Set(request.age_rating.clone());
        active_model.year = Set(request.year);
        active_model.rating = Set(request.rating);
        active_model.poster_url = Set(request.poster_url.clone());
        active_model.updated_at = Set(Utc::now());

        let model = active_model.update(&*self.connection).await?;
        Ok((Self::model_to_domain(model), ProgramWriteOutcome::Updated))
    }

    /// Programs for a channel ordered by start time
    pub async fn find_by_channel_id(
        &self,
        channel_id: Uuid,
        limit: u64,
    ) -> RepositoryResult<Vec<EpgProgram>> {
        let models = EpgPrograms::find()
            .filter(epg_programs::Column::ChannelId.eq(channel_id))
            .order_by_asc(epg_programs::Column::StartTime)
            .limit(limit)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    /// Programs that start and end inside `[from, to]`
    pub async fn find_in_range(
        &self,
        channel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Vec<EpgProgram>> {
        let models = EpgPrograms::find()
            .filter(epg_programs::Column::ChannelId.eq(channel_id))
            .filter(epg_programs::Column::StartTime.gte(from))
            .filter(epg_programs::Column::EndTime.lte(to))
            .order_by_asc(epg_programs::Column::StartTime)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    pub async fn count(&self) -> RepositoryResult<u64> {
        Ok(EpgPrograms::find().count(&*self.connection).await?)
    }

    fn model_to_domain(model: epg_programs::Model) -> EpgProgram {
        EpgProgram {
            id: model.id,
            channel_id: model.channel_id,
            external_id: model.external_id,
            title: model.title,
            description: model.description,
            start_time: model.start_time,
            end_time: model.end_time,
            duration_minutes: model.duration_minutes,
            category: model.category,
            genre: model.genre,
            age_rating: model.age_rating,
            year: model.year,
            rating: model.rating,
            poster_url: model.poster_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
