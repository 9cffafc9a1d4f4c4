use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use tokio::sync::broadcast;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

use super::orchestrator::CollectionOrchestrator;
use super::state_manager::{CollectionKind, ProcessingTrigger};
use crate::config::CollectionConfig;
use crate::errors::AppError;

struct ScheduledJob {
    kind: CollectionKind,
    expression: String,
    schedule: Schedule,
    next_run: Option<DateTime<Utc>>,
}

impl ScheduledJob {
    fn new(kind: CollectionKind, expression: &str, now: DateTime<Utc>) -> Result<Self> {
        let schedule = Schedule::from_str(expression)
            .with_context(|| format!("Invalid cron expression '{expression}' for {kind} collection"))?;
        let next_run = schedule.after(&now).next();
        Ok(Self {
            kind,
            expression: expression.to_string(),
            schedule,
            next_run,
        })
    }

    fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run.is_some_and(|next| next <= now)
    }

    fn advance(&mut self, now: DateTime<Utc>) {
        self.next_run = self.schedule.after(&now).next();
    }
}

/// Cron-driven trigger for playlist and EPG collection
///
/// Each due job is spawned so a long EPG pass never delays the playlist
/// schedule; the orchestrator's guard rejects overlapping passes of one kind.
pub struct SchedulerService {
    orchestrator: CollectionOrchestrator,
    jobs: Vec<ScheduledJob>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl SchedulerService {
    pub fn new(
        orchestrator: CollectionOrchestrator,
        config: &CollectionConfig,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<Self> {
        let now = Utc::now();
        let jobs = vec![
            ScheduledJob::new(CollectionKind::Playlist, &config.playlist_schedule, now)?,
            ScheduledJob::new(CollectionKind::Epg, &config.epg_schedule, now)?,
        ];

        Ok(Self {
            orchestrator,
            jobs,
            shutdown_rx,
        })
    }

    pub async fn start(mut self) -> Result<()> {
        info!("Starting collection scheduler");
        for job in &self.jobs {
            match job.next_run {
                Some(next) => info!(
                    "{} collection - next scheduled run: {} (cron: {})",
                    job.kind, next, job.expression
                ),
                None => warn!(
                    "{} collection has no upcoming run for cron '{}'",
                    job.kind, job.expression
                ),
            }
        }

        loop {
            let next_wake_time = self.calculate_next_wake_time();

            tokio::select! {
                _ = sleep_until(next_wake_time) => {
                    self.run_due_jobs();
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Scheduler shutting down");
                    return Ok(());
                }
            }
        }
    }

    fn calculate_next_wake_time(&self) -> Instant {
        let now = Utc::now();
        let next_wake = self
            .jobs
            .iter()
            .filter_map(|job| job.next_run)
            .min()
            .unwrap_or_else(|| now + chrono::Duration::minutes(5));

        let sleep_duration = next_wake
            .signed_duration_since(now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
            .min(std::time::Duration::from_secs(300));

        Instant::now() + sleep_duration
    }

    fn run_due_jobs(&mut self) {
        let now = Utc::now();
        for job in self.jobs.iter_mut().filter(|job| job.is_due(now)) {
            job.advance(now);
            debug!("{} collection due, next run: {:?}", job.kind, job.next_run);

            let orchestrator = self.orchestrator.clone();
            let kind = job.kind;
            tokio::spawn(async move {
                run_scheduled(orchestrator, kind).await;
            });
        }
    }
}

async fn run_scheduled(orchestrator: CollectionOrchestrator, kind: CollectionKind) {
    let trigger = ProcessingTrigger::Scheduler;
    let result = match kind {
        CollectionKind::Playlist => orchestrator.collect_playlist(trigger).await.map(|_| ()),
        CollectionKind::Epg => orchestrator
            .collect_epg_for_all_channels(orchestrator.default_timezone(), trigger)
            .await
            .map(|_| ()),
    };

    match result {
        Ok(()) => info!("Scheduled {} collection completed", kind),
        Err(AppError::OperationInProgress { .. }) => {
            warn!("Skipping scheduled {} collection: previous run still in progress", kind)
        }
        Err(e) => error!("Scheduled {} collection failed: {}", kind, e),
    }
}
