//! SeaORM-based Channel repository implementation
//!
//! Channels are keyed by their upstream `external_id`. Writes that touch the
//! stream URL set run in a single transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::stream_url::StreamUrlSeaOrmRepository;
use crate::entities::{channels, prelude::Channels, stream_urls};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Channel, ChannelUpsertRequest, StreamUrl};

/// SeaORM-based repository for Channel operations
#[derive(Clone)]
pub struct ChannelSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ChannelSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Find a channel and its stream URLs by upstream id
    pub async fn find_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<Channel>> {
        let model = Channels::find()
            .filter(channels::Column::ExternalId.eq(external_id))
            .one(&*self.connection)
            .await?;

        match model {
            Some(m) => {
                let urls = StreamUrlSeaOrmRepository::find_for_channel(&*self.connection, m.id).await?;
                Ok(Some(Self::model_to_domain(m, urls)))
            }
            None => Ok(None),
        }
    }

    /// All channels ordered by name, with stream URLs in fetched order
    pub async fn find_all(&self) -> RepositoryResult<Vec<Channel>> {
        let models = Channels::find()
            .order_by_asc(channels::Column::Name)
            .order_by_asc(channels::Column::ExternalId)
            .all(&*self.connection)
            .await?;
        let url_groups = models
            .load_many(stream_urls::Entity, &*self.connection)
            .await?;

        Ok(models
            .into_iter()
            .zip(url_groups)
            .map(|(model, mut urls)| {
                urls.sort_by_key(|u| u.position);
                let urls = urls
                    .into_iter()
                    .map(StreamUrlSeaOrmRepository::model_to_domain)
                    .collect();
                Self::model_to_domain(model, urls)
            })
            .collect())
    }

    /// Create a channel with its stream URL set
    pub async fn create(&self, request: &ChannelUpsertRequest) -> RepositoryResult<Channel> {
        let now = Utc::now();
        let txn = self.connection.begin().await?;

        let active_model = channels::ActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(request.external_id.clone()),
            name: Set(request.name.clone()),
            icon_url: Set(request.icon_url.clone()),
            category: Set(request.category.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = active_model.insert(&txn).await?;
        let urls = StreamUrlSeaOrmRepository::create(&txn, model.id, &request.stream_urls).await?;

        txn.commit().await?;
        Ok(Self::model_to_domain(model, urls))
    }

    /// Overwrite a channel's fields and replace its stream URL set
    pub async fn update(&self, id: Uuid, request: &ChannelUpsertRequest) -> RepositoryResult<Channel> {
        let txn = self.connection.begin().await?;

        let existing = Channels::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("channels", "id", id.to_string()))?;

        let mut active_model: channels::ActiveModel = existing.into();
        active_model.name = Set(request.name.clone());
        active_model.icon_url = Set(request.icon_url.clone());
        active_model.category = Set(request.category.clone());
        active_model.updated_at = Set(Utc::now());
        let model = active_model.update(&txn).await?;

        StreamUrlSeaOrmRepository::delete_for_channel(&txn, id).await?;
        let urls = StreamUrlSeaOrmRepository::create(&txn, id, &request.stream_urls).await?;

        txn.commit().await?;
        Ok(Self::model_to_domain(model, urls))
    }

    pub async fn count(&self) -> RepositoryResult<u64> {
        Ok(Channels::find().count(&*self.connection).await?)
    }

    fn model_to_domain(model: channels::Model, stream_urls: Vec<StreamUrl>) -> Channel {
        Channel {
            id: model.id,
            external_id: model.external_id,
            name: model.name,
            icon_url: model.icon_url,
            category: model.category,
            stream_urls,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
