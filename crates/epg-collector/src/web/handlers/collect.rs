//! Manual collection triggers
//!
//! Each trigger runs through the orchestrator's guard; a pass of the same kind
//! already in flight answers 409.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::ingestor::ProcessingTrigger;
use crate::web::{AppState, responses::handle_result};

#[derive(Debug, Default, Deserialize)]
pub struct TimezoneQuery {
    /// Offset in hours passed to the EPG endpoint
    pub tz: Option<String>,
}

impl TimezoneQuery {
    /// The requested offset, or `default` when none was given
    fn offset_or(&self, default: i32) -> AppResult<i32> {
        match self.tz.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                AppError::validation(format!("tz must be a whole hour offset, got '{raw}'"))
            }),
        }
    }
}

pub async fn collect_playlist(State(state): State<AppState>) -> impl IntoResponse {
    handle_result(
        state
            .orchestrator
            .collect_playlist(ProcessingTrigger::Manual)
            .await,
    )
}

pub async fn collect_epg(
    State(state): State<AppState>,
    Query(query): Query<TimezoneQuery>,
) -> impl IntoResponse {
    let result = async {
        let tz = query.offset_or(state.orchestrator.default_timezone())?;
        state
            .orchestrator
            .collect_epg_for_all_channels(tz, ProcessingTrigger::Manual)
            .await
    }
    .await;
    handle_result(result)
}

pub async fn collect_channel_epg(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
    Query(query): Query<TimezoneQuery>,
) -> impl IntoResponse {
    let result = async {
        let tz = query.offset_or(state.orchestrator.default_timezone())?;
        state
            .orchestrator
            .collect_epg_for_channel(&external_id, tz, ProcessingTrigger::Manual)
            .await
    }
    .await;
    handle_result(result)
}
