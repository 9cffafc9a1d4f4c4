//! Collection pipeline
//!
//! The playlist reconciler keeps channels in step with the upstream lineup;
//! the EPG reconciler writes per-channel schedules against those channels.
//! `CollectionOrchestrator` sequences both behind a per-kind run guard and is
//! what the scheduler, startup bootstrap and HTTP handlers call.

pub mod epg;
pub mod orchestrator;
pub mod playlist;
pub mod scheduler;
pub mod state_manager;

#[cfg(test)]
pub(crate) mod testing;

pub use epg::EpgReconciler;
pub use orchestrator::{BootstrapSummary, CollectionOrchestrator};
pub use playlist::PlaylistReconciler;
pub use scheduler::SchedulerService;
pub use state_manager::{
    CollectionGuard, CollectionKind, CollectionPermit, ProcessingTrigger, RunOutcome, RunStatus,
};
