//! Read-side channel and program endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults::{DEFAULT_PROGRAM_LIST_LIMIT, MAX_PROGRAM_LIST_LIMIT};
use crate::errors::{AppError, AppResult};
use crate::models::{Channel, EpgProgram};
use crate::web::{AppState, responses::handle_result};

#[derive(Debug, Default, Deserialize)]
pub struct ProgramListQuery {
    pub limit: Option<String>,
}

impl ProgramListQuery {
    fn validated_limit(&self) -> AppResult<u64> {
        let Some(raw) = self.limit.as_deref() else {
            return Ok(DEFAULT_PROGRAM_LIST_LIMIT);
        };
        match raw.trim().parse::<u64>() {
            Ok(limit) if (1..=MAX_PROGRAM_LIST_LIMIT).contains(&limit) => Ok(limit),
            _ => Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                MAX_PROGRAM_LIST_LIMIT
            ))),
        }
    }
}

/// Window bounds as RFC 3339 timestamps
#[derive(Debug, Default, Deserialize)]
pub struct ProgramRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProgramsResponse {
    pub channel: Channel,
    pub programs: Vec<EpgProgram>,
}

fn parse_bound(name: &str, value: Option<&str>) -> AppResult<DateTime<Utc>> {
    let value = value.ok_or_else(|| AppError::validation(format!("'{name}' is required")))?;
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::validation(format!("'{name}' is not an RFC 3339 timestamp: {e}")))
}

pub async fn list_channels(State(state): State<AppState>) -> impl IntoResponse {
    handle_result(state.orchestrator.list_channels().await)
}

/// Programs of one channel ordered by start time
pub async fn channel_programs(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
    Query(query): Query<ProgramListQuery>,
) -> impl IntoResponse {
    let result = async {
        let limit = query.validated_limit()?;
        let (channel, programs) = state
            .orchestrator
            .channel_programs(&external_id, limit)
            .await?;
        Ok::<_, AppError>(ChannelProgramsResponse { channel, programs })
    }
    .await;
    handle_result(result)
}

/// Programs that start and end inside `[from, to]`
pub async fn channel_programs_in_range(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
    Query(query): Query<ProgramRangeQuery>,
) -> impl IntoResponse {
    let result = async {
        let from = parse_bound("from", query.from.as_deref())?;
        let to = parse_bound("to", query.to.as_deref())?;
        let (channel, programs) = state
            .orchestrator
            .programs_in_range(&external_id, from, to)
            .await?;
        Ok::<_, AppError>(ChannelProgramsResponse { channel, programs })
    }
    .await;
    handle_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(raw: Option<&str>) -> AppResult<u64> {
        ProgramListQuery {
            limit: raw.map(str::to_string),
        }
        .validated_limit()
    }

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(limit(None).unwrap(), DEFAULT_PROGRAM_LIST_LIMIT);
        assert_eq!(limit(Some("10")).unwrap(), 10);
        assert!(limit(Some("0")).is_err());
        assert!(limit(Some(&(MAX_PROGRAM_LIST_LIMIT + 1).to_string())).is_err());
        assert!(matches!(limit(Some("ten")), Err(AppError::Validation { .. })));
    }

    #[test]
    fn bounds_accept_offsets() {
        let parsed = parse_bound("from", Some("2025-03-01T09:00:00+03:00")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T06:00:00+00:00");
        assert!(matches!(
            parse_bound("to", None),
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            parse_bound("to", Some("yesterday")),
            Err(AppError::Validation { .. })
        ));
    }
}
