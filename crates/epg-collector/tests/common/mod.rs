//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use epg_collector::{
    config::{CollectionConfig, DatabaseConfig, ProgramStrategy},
    database::{Database, repositories::SeaOrmCollectionStore},
    errors::{SourceError, SourceResult},
    ingestor::CollectionOrchestrator,
    models::{ChannelData, EpgRequest, EpgResponse, PlaylistResponse, ProgramData},
    sources::UpstreamSource,
};

/// Upstream serving a lineup and schedules that tests can change between runs
#[derive(Default)]
pub struct ScriptedUpstream {
    channels: Mutex<Vec<ChannelData>>,
    programs: Mutex<HashMap<String, Vec<ProgramData>>>,
    failing_epg: Mutex<Vec<String>>,
    /// When set, the next playlist fetch parks until `release` is notified
    playlist_gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
    /// Same for the next EPG fetch
    epg_gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

fn gate() -> (Arc<Notify>, Arc<Notify>) {
    (Arc::new(Notify::new()), Arc::new(Notify::new()))
}

async fn pass_gate(slot: &Mutex<Option<(Arc<Notify>, Arc<Notify>)>>) {
    let gate = slot.lock().unwrap().take();
    if let Some((entered, release)) = gate {
        entered.notify_one();
        release.notified().await;
    }
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns (entered, release) handles for a parked playlist fetch
    pub fn with_playlist_gate(self) -> (Self, Arc<Notify>, Arc<Notify>) {
        let (entered, release) = gate();
        *self.playlist_gate.lock().unwrap() = Some((entered.clone(), release.clone()));
        (self, entered, release)
    }

    /// Park the next EPG fetch; returns (entered, release) handles
    pub fn gate_next_epg_fetch(&self) -> (Arc<Notify>, Arc<Notify>) {
        let (entered, release) = gate();
        *self.epg_gate.lock().unwrap() = Some((entered.clone(), release.clone()));
        (entered, release)
    }

    pub fn set_channels(&self, channels: Vec<ChannelData>) {
        *self.channels.lock().unwrap() = channels;
    }

    pub fn set_programs(&self, external_id: &str, programs: Vec<ProgramData>) {
        self.programs
            .lock()
            .unwrap()
            .insert(external_id.to_string(), programs);
    }

    pub fn fail_epg_for(&self, external_id: &str) {
        self.failing_epg.lock().unwrap().push(external_id.to_string());
    }
}

#[async_trait]
impl UpstreamSource for ScriptedUpstream {
    async fn fetch_playlist(&self) -> SourceResult<PlaylistResponse> {
        pass_gate(&self.playlist_gate).await;
        Ok(PlaylistResponse {
            status: "ok".to_string(),
            channels: self.channels.lock().unwrap().clone(),
        })
    }

    async fn fetch_epg(&self, request: &EpgRequest) -> SourceResult<EpgResponse> {
        pass_gate(&self.epg_gate).await;
        if self
            .failing_epg
            .lock()
            .unwrap()
            .contains(&request.channel_external_id)
        {
            return Err(SourceError::Http {
                status: 502,
                url: "scripted://epg".to_string(),
            });
        }
        Ok(EpgResponse {
            status: "ok".to_string(),
            programs: self
                .programs
                .lock()
                .unwrap()
                .get(&request.channel_external_id)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

/// In-memory SQLite with the real migrations applied
pub async fn migrated_database() -> Database {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        // Each pooled connection would otherwise get its own in-memory database
        max_connections: Some(1),
    };
    let database = Database::new(&config).await.unwrap();
    database.migrate().await.unwrap();
    database
}

pub fn collection_config(strategy: ProgramStrategy) -> CollectionConfig {
    CollectionConfig {
        pacing_delay: Duration::ZERO,
        program_strategy: strategy,
        ..CollectionConfig::default()
    }
}

pub async fn orchestrator(
    upstream: Arc<ScriptedUpstream>,
    strategy: ProgramStrategy,
) -> CollectionOrchestrator {
    let database = migrated_database().await;
    let store = Arc::new(SeaOrmCollectionStore::new(database.connection()));
    CollectionOrchestrator::new(upstream, store, &collection_config(strategy))
}

pub fn channel(id: &str, urls: &[&str]) -> ChannelData {
    ChannelData {
        id: id.to_string(),
        name: format!("Channel {id}"),
        icon: format!("https://img.example/{id}.png"),
        category: "News".to_string(),
        urls: urls.iter().map(|u| u.to_string()).collect(),
    }
}

pub fn program(id: &str, start_time: i64, end_time: i64) -> ProgramData {
    ProgramData {
        id: id.to_string(),
        title: format!("Program {id}"),
        start_time,
        end_time,
        ..Default::default()
    }
}
