use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Independent collection passes; one of each may be in flight at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CollectionKind {
    Playlist,
    Epg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingTrigger {
    Scheduler,
    Manual,
    Startup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Succeeded,
    Failed,
}

/// Last known state of one collection kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub kind: CollectionKind,
    pub running: bool,
    pub triggered_by: Option<ProcessingTrigger>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<RunOutcome>,
    pub last_error: Option<String>,
}

impl RunStatus {
    fn idle(kind: CollectionKind) -> Self {
        Self {
            kind,
            running: false,
            triggered_by: None,
            started_at: None,
            finished_at: None,
            last_outcome: None,
            last_error: None,
        }
    }
}

/// Single-flight guard per `CollectionKind`
///
/// Acquisition never waits: a second pass of the same kind is rejected with
/// `AppError::OperationInProgress` while the first holds its permit.
#[derive(Clone)]
pub struct CollectionGuard {
    locks: Arc<HashMap<CollectionKind, Arc<Mutex<()>>>>,
    status: Arc<RwLock<HashMap<CollectionKind, RunStatus>>>,
}

impl CollectionGuard {
    pub fn new() -> Self {
        let kinds = [CollectionKind::Playlist, CollectionKind::Epg];
        let locks: HashMap<CollectionKind, Arc<Mutex<()>>> = kinds
            .iter()
            .map(|kind| (*kind, Arc::new(Mutex::new(()))))
            .collect();
        let status: HashMap<CollectionKind, RunStatus> = kinds
            .iter()
            .map(|kind| (*kind, RunStatus::idle(*kind)))
            .collect();

        Self {
            locks: Arc::new(locks),
            status: Arc::new(RwLock::new(status)),
        }
    }

    /// Claim the pass for `kind`, or fail if one is already running
    pub fn try_acquire(
        &self,
        kind: CollectionKind,
        trigger: ProcessingTrigger,
    ) -> AppResult<CollectionPermit> {
        let lock = self
            .locks
            .get(&kind)
            .cloned()
            .ok_or_else(|| AppError::internal(format!("No run guard for {kind}")))?;

        let permit = lock
            .try_lock_owned()
            .map_err(|_| AppError::operation_in_progress(format!("{kind} collection"), "upstream"))?;

        self.update_status(kind, |status| {
            status.running = true;
            status.triggered_by = Some(trigger);
            status.started_at = Some(Utc::now());
            status.finished_at = None;
        });
        debug!(kind = %kind, trigger = %trigger, "Acquired collection permit");

        Ok(CollectionPermit {
            _permit: permit,
            kind,
            guard: self.clone(),
            finished: false,
        })
    }

    pub fn is_running(&self, kind: CollectionKind) -> bool {
        self.locks
            .get(&kind)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Status of every kind, playlist first
    pub fn statuses(&self) -> Vec<RunStatus> {
        let status = self.status.read().unwrap_or_else(|e| e.into_inner());
        let mut statuses: Vec<RunStatus> = status.values().cloned().collect();
        statuses.sort_by_key(|s| s.kind as u8);
        statuses
    }

    fn update_status(&self, kind: CollectionKind, update: impl FnOnce(&mut RunStatus)) {
        let mut status = self.status.write().unwrap_or_else(|e| e.into_inner());
        let entry = status.entry(kind).or_insert_with(|| RunStatus::idle(kind));
        update(entry);
    }
}

impl Default for CollectionGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the duration of a pass; dropping it releases the kind
pub struct CollectionPermit {
    _permit: OwnedMutexGuard<()>,
    kind: CollectionKind,
    guard: CollectionGuard,
    finished: bool,
}

impl CollectionPermit {
    /// Record how the pass ended and release the permit
    pub fn finish<T, E: fmt::Display>(mut self, result: &Result<T, E>) {
        let (outcome, error) = match result {
            Ok(_) => (RunOutcome::Succeeded, None),
            Err(e) => (RunOutcome::Failed, Some(e.to_string())),
        };
        self.record(outcome, error);
    }

    fn record(&mut self, outcome: RunOutcome, error: Option<String>) {
        self.finished = true;
        self.guard.update_status(self.kind, |status| {
            status.running = false;
            status.finished_at = Some(Utc::now());
            status.last_outcome = Some(outcome);
            status.last_error = error;
        });
    }
}

impl Drop for CollectionPermit {
    fn drop(&mut self) {
        if !self.finished {
            self.record(
                RunOutcome::Failed,
                Some("collection ended without reporting an outcome".to_string()),
            );
        }
    }
}
