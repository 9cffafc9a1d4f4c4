//! Stream URL persistence
//!
//! Functions take any `ConnectionTrait` so they can run inside the channel
//! repository's transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{prelude::StreamUrls, stream_urls};
use crate::errors::RepositoryResult;
use crate::models::{StreamUrl, StreamUrlRequest};

pub struct StreamUrlSeaOrmRepository;

impl StreamUrlSeaOrmRepository {
    /// Insert the given URLs for a channel, preserving their positions
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        channel_id: Uuid,
        requests: &[StreamUrlRequest],
    ) -> RepositoryResult<Vec<StreamUrl>> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(requests.len());

        for request in requests {
            let active_model = stream_urls::ActiveModel {
                id: Set(Uuid::new_v4()),
                channel_id: Set(channel_id),
                url: Set(request.url.clone()),
                quality: Set(request.quality.clone()),
                stream_type: Set(request.stream_type.clone()),
                position: Set(request.position),
                created_at: Set(now),
            };
            let model = active_model.insert(db).await?;
            created.push(Self::model_to_domain(model));
        }

        Ok(created)
    }

    /// Remove every stream URL belonging to a channel
    pub async fn delete_for_channel<C: ConnectionTrait>(
        db: &C,
        channel_id: Uuid,
    ) -> RepositoryResult<u64> {
        let result = StreamUrls::delete_many()
            .filter(stream_urls::Column::ChannelId.eq(channel_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn find_for_channel<C: ConnectionTrait>(
        db: &C,
        channel_id: Uuid,
    ) -> RepositoryResult<Vec<StreamUrl>> {
        let models = StreamUrls::find()
            .filter(stream_urls::Column::ChannelId.eq(channel_id))
            .order_by_asc(stream_urls::Column::Position)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    pub(crate) fn model_to_domain(model: stream_urls::Model) -> StreamUrl {
        StreamUrl {
            id: model.id,
            channel_id: model.channel_id,
            url: model.url,
            quality: model.quality,
            stream_type: model.stream_type,
            position: model.position,
        }
    }
}
