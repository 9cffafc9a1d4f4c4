use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::database::repositories::CollectionStore;
use crate::errors::{CollectionError, CollectionResult, SourceResult};
use crate::models::{ChannelData, ChannelUpsertRequest, FailedItem, PlaylistCollectionSummary};
use crate::sources::UpstreamSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelWriteOutcome {
    Created,
    Updated,
}

/// Reconciles the upstream lineup against persisted channels
///
/// Channels are matched on their upstream id. A match is overwritten and its
/// stream URL set replaced; anything else is created. Channels missing from the
/// latest fetch are left untouched.
pub struct PlaylistReconciler {
    source: Arc<dyn UpstreamSource>,
    store: Arc<dyn CollectionStore>,
}

impl PlaylistReconciler {
    pub fn new(source: Arc<dyn UpstreamSource>, store: Arc<dyn CollectionStore>) -> Self {
        Self { source, store }
    }

    /// Fetch the lineup and reconcile every channel in it
    ///
    /// Only a failed fetch fails the pass. Per-channel failures are logged and
    /// reported in the summary.
    pub async fn collect(&self) -> SourceResult<PlaylistCollectionSummary> {
        let started = Instant::now();
        info!("Starting playlist collection");

        let response = self.source.fetch_playlist().await.map_err(|e| {
            error!("Failed to fetch playlist: {}", e);
            e
        })?;

        let mut summary = PlaylistCollectionSummary {
            received: response.channels.len(),
            ..Default::default()
        };
        info!(channels = summary.received, "Fetched playlist");

        for (position, data) in response.channels.iter().enumerate() {
            match self.reconcile_channel(data).await {
                Ok(ChannelWriteOutcome::Created) => summary.created += 1,
                Ok(ChannelWriteOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    let key = failure_key(data, position);
                    warn!(channel = %key, error = %e, "Failed to reconcile channel");
                    summary.failed.push(FailedItem::new(key, &e));
                }
            }
        }

        info!(
            received = summary.received,
            created = summary.created,
            updated = summary.updated,
            failed = summary.failed.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Playlist collection completed"
        );
        Ok(summary)
    }

    async fn reconcile_channel(&self, data: &ChannelData) -> CollectionResult<ChannelWriteOutcome> {
        if data.id.trim().is_empty() {
            return Err(CollectionError::invalid_data(
                data.name.as_str(),
                "channel has no upstream id",
            ));
        }

        let request = ChannelUpsertRequest::from(data);
        match self.store.find_channel_by_external_id(&request.external_id).await? {
            Some(existing) => {
                self.store.update_channel(existing.id, &request).await?;
                debug!(
                    external_id = %request.external_id,
                    stream_urls = request.stream_urls.len(),
                    "Updated channel"
                );
                Ok(ChannelWriteOutcome::Updated)
            }
            None => {
                self.store.create_channel(&request).await?;
                debug!(
                    external_id = %request.external_id,
                    stream_urls = request.stream_urls.len(),
                    "Created channel"
                );
                Ok(ChannelWriteOutcome::Created)
            }
        }
    }
}

/// Upstream id of a failed channel, falling back to its name, then its position
fn failure_key(data: &ChannelData, position: usize) -> String {
    if !data.id.trim().is_empty() {
        data.id.clone()
    } else if !data.name.trim().is_empty() {
        data.name.clone()
    } else {
        format!("#{position}")
    }
}
