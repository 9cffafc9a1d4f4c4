use async_trait::async_trait;

use crate::errors::SourceResult;
use crate::models::{EpgRequest, EpgResponse, PlaylistResponse};

/// Fetches the channel lineup and per-channel schedules from upstream
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Fetch the full channel lineup
    async fn fetch_playlist(&self) -> SourceResult<PlaylistResponse>;

    /// Fetch the schedule for one channel
    async fn fetch_epg(&self, request: &EpgRequest) -> SourceResult<EpgResponse>;
}
