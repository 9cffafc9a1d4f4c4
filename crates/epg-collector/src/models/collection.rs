//! Outcomes reported by collection passes

use serde::{Deserialize, Serialize};

/// A unit of work that failed, keyed by the upstream id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub external_id: String,
    pub error: String,
}

impl FailedItem {
    pub fn new<S: Into<String>, E: ToString>(external_id: S, error: E) -> Self {
        Self {
            external_id: external_id.into(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCollectionSummary {
    pub received: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: Vec<FailedItem>,
}

/// Result of collecting EPG for one channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEpgOutcome {
    pub external_id: String,
    pub received: usize,
    pub created: usize,
    pub updated: usize,
    /// Programs that could not be written; siblings are unaffected
    pub failed: usize,
}

impl ChannelEpgOutcome {
    pub fn saved(&self) -> usize {
        self.created + self.updated
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgCollectionSummary {
    pub channels_total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub programs_saved: usize,
    pub failed: Vec<FailedItem>,
}

/// How a single program write landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramWriteOutcome {
    Created,
    Updated,
}
