//! Curse handlers

use super::ApiError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use curse_core::{Curse, NewCurse, DEFAULT_RECENT_LIMIT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CurseListResponse {
    curses: Vec<Curse>,
}

/// Recent feed, or every curse for `?target=`
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CurseListResponse>, ApiError> {
    let target = params
        .target
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let curses = match target {
        Some(target) => state.store.get_curses_for_target(target).await?,
        None => state.store.get_recent_curses(DEFAULT_RECENT_LIMIT).await?,
    };

    Ok(Json(CurseListResponse { curses }))
}

#[derive(Debug, Serialize)]
pub struct CurseResponse {
    curse: Curse,
}

fn str_field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Body is taken loosely: any content type, missing or non-string fields count
/// as empty. A body that is not JSON at all gets the generic server error.
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CurseResponse>), ApiError> {
    let body: Value = serde_json::from_slice(&body)?;
    let new_curse = NewCurse::parse(
        str_field(&body, "targetName"),
        str_field(&body, "curseText"),
    )?;

    let curse = state
        .store
        .add_curse(new_curse.target_name(), new_curse.curse_text())
        .await?;
    info!("Curse {} added against {}", curse.id, curse.target_name);

    Ok((StatusCode::CREATED, Json(CurseResponse { curse })))
}
