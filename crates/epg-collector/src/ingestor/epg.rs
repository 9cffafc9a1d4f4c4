use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ProgramStrategy;
use crate::database::repositories::CollectionStore;
use crate::errors::{CollectionError, CollectionResult, RepositoryResult};
use crate::models::{
    ChannelEpgOutcome, EpgCollectionSummary, EpgProgramCreateRequest, EpgRequest, FailedItem,
    ProgramData, ProgramWriteOutcome,
};
use crate::sources::UpstreamSource;

/// Collects per-channel schedules and writes them against persisted channels
pub struct EpgReconciler {
    source: Arc<dyn UpstreamSource>,
    store: Arc<dyn CollectionStore>,
    strategy: ProgramStrategy,
    pacing_delay: Duration,
}

impl EpgReconciler {
    pub fn new(
        source: Arc<dyn UpstreamSource>,
        store: Arc<dyn CollectionStore>,
        strategy: ProgramStrategy,
        pacing_delay: Duration,
    ) -> Self {
        Self {
            source,
            store,
            strategy,
            pacing_delay,
        }
    }

    /// Collect the schedule for one channel
    ///
    /// The channel is resolved before anything is fetched; an unknown id fails
    /// with `ChannelNotFound` and writes nothing. Individual program failures are
    /// counted in the outcome and never fail the channel.
    pub async fn collect_for_channel(
        &self,
        external_id: &str,
        tz_offset: i32,
    ) -> CollectionResult<ChannelEpgOutcome> {
        let channel = self
            .store
            .find_channel_by_external_id(external_id)
            .await?
            .ok_or_else(|| CollectionError::channel_not_found(external_id))?;

        let response = self
            .source
            .fetch_epg(&EpgRequest::new(external_id, tz_offset))
            .await?;

        let mut outcome = ChannelEpgOutcome {
            external_id: external_id.to_string(),
            received: response.programs.len(),
            ..Default::default()
        };

        for program in &response.programs {
            match self.write_program(channel.id, program).await {
                Ok(ProgramWriteOutcome::Created) => outcome.created += 1,
                Ok(ProgramWriteOutcome::Updated) => outcome.updated += 1,
                Err(e) => {
                    warn!(
                        external_id = %external_id,
                        program_id = %program.id,
                        title = %program.title,
                        error = %e,
                        "Failed to save program"
                    );
                    outcome.failed += 1;
                }
            }
        }

        debug!(
            external_id = %external_id,
            received = outcome.received,
            created = outcome.created,
            updated = outcome.updated,
            failed = outcome.failed,
            "Channel EPG collected"
        );
        Ok(outcome)
    }

    /// Collect schedules for every persisted channel, one after another
    ///
    /// Only listing the channels can fail the pass. Channel failures are
    /// counted and reported by upstream id.
    pub async fn collect_for_all_channels(
        &self,
        tz_offset: i32,
    ) -> RepositoryResult<EpgCollectionSummary> {
        let started = Instant::now();
        let channels = self.store.list_channels().await?;

        let mut summary = EpgCollectionSummary {
            channels_total: channels.len(),
            ..Default::default()
        };
        info!(
            channels = summary.channels_total,
            tz_offset, "Starting EPG collection for all channels"
        );

        for (index, channel) in channels.iter().enumerate() {
            if index > 0 && !self.pacing_delay.is_zero() {
                tokio::time::sleep(self.pacing_delay).await;
            }

            match self.collect_for_channel(&channel.external_id, tz_offset).await {
                Ok(outcome) => {
                    summary.success_count += 1;
                    summary.programs_saved += outcome.saved();
                }
                Err(e) => {
                    warn!(
                        external_id = %channel.external_id,
                        error = %e,
                        "Failed to collect EPG for channel"
                    );
                    summary.failure_count += 1;
                    summary
                        .failed
                        .push(FailedItem::new(channel.external_id.as_str(), &e));
                }
            }
        }

        info!(
            channels = summary.channels_total,
            succeeded = summary.success_count,
            failed = summary.failure_count,
            programs_saved = summary.programs_saved,
            duration_ms = started.elapsed().as_millis() as u64,
            "EPG collection completed"
        );
        Ok(summary)
    }

    async fn write_program(
        &self,
        channel_id: Uuid,
        data: &ProgramData,
    ) -> CollectionResult<ProgramWriteOutcome> {
        let request = EpgProgramCreateRequest::from_program_data(channel_id, data)
            .ok_or_else(|| {
                CollectionError::invalid_data(data.id.as_str(), "program time is out of range")
            })?;

        match self.strategy {
            ProgramStrategy::AppendOnly => {
                self.store.create_program(&request).await?;
                Ok(ProgramWriteOutcome::Created)
            }
            ProgramStrategy::UpsertByExternalId => Ok(self.store.upsert_program(&request).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::testing::{FakeUpstream, MemoryStore, program_data};
    use crate::models::ChannelUpsertRequest;

    async fn seed(store: &MemoryStore, external_ids: &[&str]) {
        for id in external_ids {
            store
                .create_channel(&ChannelUpsertRequest {
                    external_id: id.to_string(),
                    name: format!("Channel {id}"),
                    icon_url: String::new(),
                    category: String::new(),
                    stream_urls: vec![],
                })
                .await
                .unwrap();
        }
    }

    fn reconciler(
        source: Arc<FakeUpstream>,
        store: Arc<MemoryStore>,
        strategy: ProgramStrategy,
    ) -> EpgReconciler {
        EpgReconciler::new(source, store, strategy, Duration::ZERO)
    }

    #[tokio::test]
    async fn unknown_channel_is_skipped_without_writes() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(
            FakeUpstream::new().with_programs("ghost", vec![program_data("p1", 1000, 1900)]),
        );

        let result = reconciler(source.clone(), store.clone(), ProgramStrategy::default())
            .collect_for_channel("ghost", 3)
            .await;

        assert!(matches!(result, Err(CollectionError::ChannelNotFound { .. })));
        assert!(store.programs.lock().unwrap().is_empty());
        assert!(source.requested_channels().is_empty());
    }

    #[tokio::test]
    async fn program_failure_does_not_block_siblings() {
        let store = Arc::new(MemoryStore::new().with_failing_program("p2"));
        seed(&store, &["ch"]).await;
        let source = Arc::new(FakeUpstream::new().with_programs(
            "ch",
            vec![
                program_data("p1", 1000, 1900),
                program_data("p2", 1900, 2800),
                program_data("p3", 2800, 3700),
            ],
        ));

        let outcome = reconciler(source, store.clone(), ProgramStrategy::default())
            .collect_for_channel("ch", 3)
            .await
            .unwrap();

        assert_eq!(outcome.received, 3);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(store.program_ids(), vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn duration_is_derived_from_epoch_bounds() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["ch"]).await;
        let source =
            Arc::new(FakeUpstream::new().with_programs("ch", vec![program_data("p1", 1000, 1900)]));

        reconciler(source, store.clone(), ProgramStrategy::default())
            .collect_for_channel("ch", 3)
            .await
            .unwrap();

        let programs = store.programs.lock().unwrap();
        assert_eq!(programs[0].duration_minutes, 15);
    }

    #[tokio::test]
    async fn request_carries_channel_and_timezone() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["42"]).await;
        let source = Arc::new(FakeUpstream::new());

        reconciler(source.clone(), store, ProgramStrategy::default())
            .collect_for_channel("42", 5)
            .await
            .unwrap();

        let requests = source.epg_requests.lock().unwrap().clone();
        assert_eq!(requests, vec![EpgRequest::new("42", 5)]);
    }

    #[tokio::test]
    async fn fan_out_isolates_channel_failures() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["A", "B", "C"]).await;
        let source = Arc::new(
            FakeUpstream::new()
                .with_programs("A", vec![program_data("a1", 1000, 1900)])
                .with_failing_epg("B")
                .with_programs("C", vec![program_data("c1", 1000, 1900), program_data("c2", 1900, 2800)]),
        );

        let summary = reconciler(source.clone(), store, ProgramStrategy::default())
            .collect_for_all_channels(3)
            .await
            .unwrap();

        assert_eq!(summary.channels_total, 3);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 1);
        assert_eq!(summary.programs_saved, 3);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].external_id, "B");
        assert_eq!(source.requested_channels(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn upsert_strategy_does_not_grow_rows() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["ch"]).await;
        let source = Arc::new(FakeUpstream::new().with_programs(
            "ch",
            vec![program_data("p1", 1000, 1900), program_data("p2", 1900, 2800)],
        ));
        let reconciler = reconciler(source, store.clone(), ProgramStrategy::UpsertByExternalId);

        let first = reconciler.collect_for_channel("ch", 3).await.unwrap();
        let second = reconciler.collect_for_channel("ch", 3).await.unwrap();

        assert_eq!((first.created, first.updated), (2, 0));
        assert_eq!((second.created, second.updated), (0, 2));
        assert_eq!(store.programs.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn append_only_strategy_accumulates_rows() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["ch"]).await;
        let source = Arc::new(FakeUpstream::new().with_programs(
            "ch",
            vec![program_data("p1", 1000, 1900), program_data("p2", 1900, 2800)],
        ));
        let reconciler = reconciler(source, store.clone(), ProgramStrategy::AppendOnly);

        reconciler.collect_for_channel("ch", 3).await.unwrap();
        reconciler.collect_for_channel("ch", 3).await.unwrap();

        assert_eq!(store.programs.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn channels_are_paced() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["A", "B", "C"]).await;
        let reconciler = EpgReconciler::new(
            Arc::new(FakeUpstream::new()),
            store,
            ProgramStrategy::default(),
            Duration::from_millis(100),
        );

        let started = tokio::time::Instant::now();
        reconciler.collect_for_all_channels(3).await.unwrap();

        // Two gaps between three channels
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));
    }
}
