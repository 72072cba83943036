//! Leaderboard handler

use super::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use curse_core::{LeaderboardEntry, DEFAULT_LEADERBOARD_LIMIT};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    leaderboard: Vec<LeaderboardEntry>,
}

pub async fn get(State(state): State<AppState>) -> Result<Json<LeaderboardResponse>, ApiError> {
    let leaderboard = state
        .store
        .get_leaderboard(DEFAULT_LEADERBOARD_LIMIT)
        .await?;
    tracing::debug!("Leaderboard has {} entries", leaderboard.len());

    Ok(Json(LeaderboardResponse { leaderboard }))
}
