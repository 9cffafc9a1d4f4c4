//! Health, statistics and run status endpoints

use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ingestor::RunStatus;
use crate::web::{
    AppState,
    responses::{handle_result, ok},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub channels: u64,
    pub programs: u64,
}

/// Health check endpoint
///
/// Reports `degraded` when the channel table cannot be read.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match state.orchestrator.channel_count().await {
        Ok(_) => ("healthy", "connected"),
        Err(e) => {
            tracing::warn!("Health check database probe failed: {}", e);
            ("degraded", "unavailable")
        }
    };

    ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: Utc::now(),
    })
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let result = async {
        Ok::<_, AppError>(StatsResponse {
            channels: state.orchestrator.channel_count().await?,
            programs: state.orchestrator.program_count().await?,
        })
    }
    .await;
    handle_result(result)
}

/// Last and current run per collection kind
pub async fn run_status(State(state): State<AppState>) -> impl IntoResponse {
    let statuses: Vec<RunStatus> = state.orchestrator.run_status();
    ok(statuses)
}
