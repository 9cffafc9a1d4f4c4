//! In-memory upstream and store used by the ingestor unit tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use crate::database::repositories::CollectionStore;
use crate::errors::{RepositoryError, RepositoryResult, SourceError, SourceResult};
use crate::models::*;
use crate::sources::UpstreamSource;

#[derive(Default)]
pub struct FakeUpstream {
    playlist: Mutex<Option<PlaylistResponse>>,
    epg: HashMap<String, Vec<ProgramData>>,
    failing_epg: HashSet<String>,
    pub epg_requests: Mutex<Vec<EpgRequest>>,
    pub playlist_fetches: Mutex<usize>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(self, channels: Vec<ChannelData>) -> Self {
        *self.playlist.lock().unwrap() = Some(PlaylistResponse {
            status: "ok".to_string(),
            channels,
        });
        self
    }

    /// Replace the lineup served by later playlist fetches
    pub fn set_channels(&self, channels: Vec<ChannelData>) {
        *self.playlist.lock().unwrap() = Some(PlaylistResponse {
            status: "ok".to_string(),
            channels,
        });
    }

    pub fn with_programs(mut self, external_id: &str, programs: Vec<ProgramData>) -> Self {
        self.epg.insert(external_id.to_string(), programs);
        self
    }

    pub fn with_failing_epg(mut self, external_id: &str) -> Self {
        self.failing_epg.insert(external_id.to_string());
        self
    }

    pub fn requested_channels(&self) -> Vec<String> {
        self.epg_requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.channel_external_id.clone())
            .collect()
    }
}

#[async_trait]
impl UpstreamSource for FakeUpstream {
    async fn fetch_playlist(&self) -> SourceResult<PlaylistResponse> {
        *self.playlist_fetches.lock().unwrap() += 1;
        self.playlist
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::Http {
                status: 503,
                url: "fake://playlist".to_string(),
            })
    }

    async fn fetch_epg(&self, request: &EpgRequest) -> SourceResult<EpgResponse> {
        self.epg_requests.lock().unwrap().push(request.clone());
        if self.failing_epg.contains(&request.channel_external_id) {
            return Err(SourceError::Transport {
                url: "fake://epg".to_string(),
                message: "connection reset".to_string(),
            });
        }
        Ok(EpgResponse {
            status: "ok".to_string(),
            programs: self
                .epg
                .get(&request.channel_external_id)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub channels: Mutex<Vec<Channel>>,
    pub programs: Mutex<Vec<EpgProgram>>,
    failing_programs: HashSet<String>,
    failing_channels: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program writes with this external id fail
    pub fn with_failing_program(mut self, external_id: &str) -> Self {
        self.failing_programs.insert(external_id.to_string());
        self
    }

    /// Channel writes with this external id fail
    pub fn with_failing_channel(mut self, external_id: &str) -> Self {
        self.failing_channels.insert(external_id.to_string());
        self
    }

    pub fn channel(&self, external_id: &str) -> Option<Channel> {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.external_id == external_id)
            .cloned()
    }

    pub fn program_ids(&self) -> Vec<String> {
        self.programs
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.external_id.clone())
            .collect()
    }

    fn check_channel(&self, external_id: &str) -> RepositoryResult<()> {
        if self.failing_channels.contains(external_id) {
            return Err(RepositoryError::ConstraintViolation {
                constraint: "channels".to_string(),
                message: format!("write rejected for {external_id}"),
            });
        }
        Ok(())
    }

    fn check_program(&self, external_id: &str) -> RepositoryResult<()> {
        if self.failing_programs.contains(external_id) {
            return Err(RepositoryError::ConstraintViolation {
                constraint: "epg_programs".to_string(),
                message: format!("write rejected for {external_id}"),
            });
        }
        Ok(())
    }

    fn build_channel(id: Uuid, request: &ChannelUpsertRequest, created_at: DateTime<Utc>) -> Channel {
        Channel {
            id,
            external_id: request.external_id.clone(),
            name: request.name.clone(),
            icon_url: request.icon_url.clone(),
            category: request.category.clone(),
            stream_urls: request
                .stream_urls
                .iter()
                .map(|u| StreamUrl {
                    id: Uuid::new_v4(),
                    channel_id: id,
                    url: u.url.clone(),
                    quality: u.quality.clone(),
                    stream_type: u.stream_type.clone(),
                    position: u.position,
                })
                .collect(),
            created_at,
            updated_at: Utc::now(),
        }
    }

    fn build_program(request: &EpgProgramCreateRequest) -> EpgProgram {
        let now = Utc::now();
        EpgProgram {
            id: Uuid::new_v4(),
            channel_id: request.channel_id,
            external_id: request.external_id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            duration_minutes: request.duration_minutes,
            category: request.category.clone(),
            genre: request.genre.clone(),
            age_rating: request.age_rating.clone(),
            year: request.year,
            rating: request.rating,
            poster_url: request.poster_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn find_channel_by_external_id(
        &self,
        external_id: &str,
    ) -> RepositoryResult<Option<Channel>> {
        Ok(self.channel(external_id))
    }

    async fn create_channel(&self, request: &ChannelUpsertRequest) -> RepositoryResult<Channel> {
        self.check_channel(&request.external_id)?;
        let channel = Self::build_channel(Uuid::new_v4(), request, Utc::now());
        self.channels.lock().unwrap().push(channel.clone());
        Ok(channel)
    }

    async fn update_channel(
        &self,
        id: Uuid,
        request: &ChannelUpsertRequest,
    ) -> RepositoryResult<Channel> {
        self.check_channel(&request.external_id)?;
        let mut channels = self.channels.lock().unwrap();
        let existing = channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RepositoryError::not_found("channels", "id", id.to_string()))?;
        *existing = Self::build_channel(id, request, existing.created_at);
        Ok(existing.clone())
    }

    async fn list_channels(&self) -> RepositoryResult<Vec<Channel>> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn create_program(
        &self,
        request: &EpgProgramCreateRequest,
    ) -> RepositoryResult<EpgProgram> {
        self.check_program(&request.external_id)?;
        let program = Self::build_program(request);
        self.programs.lock().unwrap().push(program.clone());
        Ok(program)
    }

    async fn upsert_program(
        &self,
        request: &EpgProgramCreateRequest,
    ) -> RepositoryResult<ProgramWriteOutcome> {
        self.check_program(&request.external_id)?;
        let mut programs = self.programs.lock().unwrap();
        match programs
            .iter_mut()
            .find(|p| p.channel_id == request.channel_id && p.external_id == request.external_id)
        {
            Some(existing) => {
                let id = existing.id;
                *existing = Self::build_program(request);
                existing.id = id;
                Ok(ProgramWriteOutcome::Updated)
            }
            None => {
                programs.push(Self::build_program(request));
                Ok(ProgramWriteOutcome::Created)
            }
        }
    }

    async fn count_channels(&self) -> RepositoryResult<u64> {
        Ok(self.channels.lock().unwrap().len() as u64)
    }

    async fn count_programs(&self) -> RepositoryResult<u64> {
        Ok(self.programs.lock().unwrap().len() as u64)
    }

    async fn find_programs_by_channel(
        &self,
        channel_id: Uuid,
        limit: u64,
    ) -> RepositoryResult<Vec<EpgProgram>> {
        let mut programs: Vec<_> = self
            .programs
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.channel_id == channel_id)
            .cloned()
            .collect();
        programs.sort_by_key(|p| p.start_time);
        programs.truncate(limit as usize);
        Ok(programs)
    }

    async fn find_programs_in_range(
        &self,
        channel_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Vec<EpgProgram>> {
        let mut programs: Vec<_> = self
            .programs
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.channel_id == channel_id && p.start_time >= from && p.end_time <= to)
            .cloned()
            .collect();
        programs.sort_by_key(|p| p.start_time);
        Ok(programs)
    }
}

pub fn channel_data(id: &str, urls: &[&str]) -> ChannelData {
    ChannelData {
        id: id.to_string(),
        name: format!("Channel {id}"),
        icon: format!("https://img.example/{id}.png"),
        category: "General".to_string(),
        urls: urls.iter().map(|u| u.to_string()).collect(),
    }
}

pub fn program_data(id: &str, start_time: i64, end_time: i64) -> ProgramData {
    ProgramData {
        id: id.to_string(),
        title: format!("Program {id}"),
        start_time,
        end_time,
        ..Default::default()
    }
}
