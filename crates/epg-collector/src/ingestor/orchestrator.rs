use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::epg::EpgReconciler;
use super::playlist::PlaylistReconciler;
use super::state_manager::{
    CollectionGuard, CollectionKind, CollectionPermit, ProcessingTrigger, RunStatus,
};
use crate::config::CollectionConfig;
use crate::database::repositories::CollectionStore;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Channel, ChannelEpgOutcome, EpgCollectionSummary, EpgProgram, PlaylistCollectionSummary,
};
use crate::sources::UpstreamSource;

/// Outcome of the startup pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapSummary {
    pub playlist: PlaylistCollectionSummary,
    pub epg: EpgCollectionSummary,
}

/// Entry point for every collection trigger and for read-side queries
///
/// Passes are serialized per `CollectionKind` through the shared guard, so the
/// scheduler, startup and HTTP triggers never overlap for the same kind.
#[derive(Clone)]
pub struct CollectionOrchestrator {
    playlist: Arc<PlaylistReconciler>,
    epg: Arc<EpgReconciler>,
    store: Arc<dyn CollectionStore>,
    pub(super) guard: CollectionGuard,
    default_timezone: i32,
}

impl CollectionOrchestrator {
    pub fn new(
        source: Arc<dyn UpstreamSource>,
        store: Arc<dyn CollectionStore>,
        config: &CollectionConfig,
    ) -> Self {
        let playlist = PlaylistReconciler::new(source.clone(), store.clone());
        let epg = EpgReconciler::new(
            source,
            store.clone(),
            config.program_strategy,
            config.pacing_delay,
        );

        Self {
            playlist: Arc::new(playlist),
            epg: Arc::new(epg),
            store,
            guard: CollectionGuard::new(),
            default_timezone: config.default_timezone,
        }
    }

    /// Timezone offset used when a trigger does not supply one
    pub fn default_timezone(&self) -> i32 {
        self.default_timezone
    }

    pub async fn collect_playlist(
        &self,
        trigger: ProcessingTrigger,
    ) -> AppResult<PlaylistCollectionSummary> {
        let permit = self.guard.try_acquire(CollectionKind::Playlist, trigger)?;
        info!(trigger = %trigger, "Playlist collection triggered");

        let playlist = self.playlist.clone();
        Self::run_detached(permit, async move {
            playlist.collect().await.map_err(AppError::from)
        })
        .await
    }

    pub async fn collect_epg_for_all_channels(
        &self,
        tz_offset: i32,
        trigger: ProcessingTrigger,
    ) -> AppResult<EpgCollectionSummary> {
        let permit = self.guard.try_acquire(CollectionKind::Epg, trigger)?;
        info!(trigger = %trigger, tz_offset, "EPG collection triggered");

        let epg = self.epg.clone();
        Self::run_detached(permit, async move {
            epg.collect_for_all_channels(tz_offset)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Collect one channel; shares the EPG guard with the full pass
    pub async fn collect_epg_for_channel(
        &self,
        external_id: &str,
        tz_offset: i32,
        trigger: ProcessingTrigger,
    ) -> AppResult<ChannelEpgOutcome> {
        let permit = self.guard.try_acquire(CollectionKind::Epg, trigger)?;
        info!(trigger = %trigger, external_id = %external_id, tz_offset, "Channel EPG collection triggered");

        let epg = self.epg.clone();
        let external_id = external_id.to_string();
        Self::run_detached(permit, async move {
            epg.collect_for_channel(&external_id, tz_offset)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Run a pass on its own task so it completes even if the caller goes away
    ///
    /// The task owns the permit and records the outcome itself.
    async fn run_detached<T, F>(permit: CollectionPermit, pass: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let result = pass.await;
            permit.finish(&result);
            result
        });

        handle
            .await
            .map_err(|e| AppError::internal(format!("Collection task failed: {e}")))?
    }

    /// Playlist first, then EPG for every channel if the playlist pass succeeded
    pub async fn bootstrap(&self, tz_offset: i32) -> AppResult<BootstrapSummary> {
        info!("Running initial collection");

        let playlist = self
            .collect_playlist(ProcessingTrigger::Startup)
            .await
            .map_err(|e| {
                error!("Initial playlist collection failed, skipping EPG: {}", e);
                e
            })?;

        let epg = self
            .collect_epg_for_all_channels(tz_offset, ProcessingTrigger::Startup)
            .await
            .map_err(|e| {
                warn!("Initial EPG collection failed: {}", e);
                e
            })?;

        Ok(BootstrapSummary { playlist, epg })
    }

    pub fn run_status(&self) -> Vec<RunStatus> {
        self.guard.statuses()
    }

    pub async fn channel_count(&self) -> AppResult<u64> {
        Ok(self.store.count_channels().await?)
    }

    pub async fn program_count(&self) -> AppResult<u64> {
        Ok(self.store.count_programs().await?)
    }

    pub async fn list_channels(&self) -> AppResult<Vec<Channel>> {
        Ok(self.store.list_channels().await?)
    }

    /// A channel and its programs ordered by start time
    pub async fn channel_programs(
        &self,
        external_id: &str,
        limit: u64,
    ) -> AppResult<(Channel, Vec<EpgProgram>)> {
        let channel = self.resolve_channel(external_id).await?;
        let programs = self
            .store
            .find_programs_by_channel(channel.id, limit)
            .await?;
        Ok((channel, programs))
    }

    /// Programs of a channel that lie entirely within `[from, to]`
    pub async fn programs_in_range(
        &self,
        external_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<(Channel, Vec<EpgProgram>)> {
        if from > to {
            return Err(AppError::validation("'from' must not be after 'to'"));
        }
        let channel = self.resolve_channel(external_id).await?;
        let programs = self
            .store
            .find_programs_in_range(channel.id, from, to)
            .await?;
        Ok((channel, programs))
    }

    async fn resolve_channel(&self, external_id: &str) -> AppResult<Channel> {
        self.store
            .find_channel_by_external_id(external_id)
            .await?
            .ok_or_else(|| AppError::not_found("channel", external_id))
    }
}
