use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, auth};
use crate::api::types::{CreateSeasonResponse, SeasonDto, UserHistoryDto};
use crate::db::ParticipantInput;

#[derive(Deserialize)]
pub struct CreateSeasonRequest {
    #[serde(rename = "startDate", default)]
    pub start_date: String,
    #[serde(rename = "endDate", default)]
    pub end_date: String,
    #[serde(default)]
    pub participants: Vec<ParticipantInput>,
}

/// GET /seasons
/// Public ranking archive: every season with its full participant list,
/// oldest first.
pub async fn list_seasons(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SeasonDto>>, ApiError> {
    let seasons = state
        .store()
        .list_seasons_with_participants()
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(seasons.into_iter().map(SeasonDto::from).collect()))
}

/// POST /seasons
/// Import a finished season together with its roster. The season row and
/// every participant land in one transaction.
pub async fn create_season(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateSeasonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth::require_roles(&session, auth::LEADERSHIP).await?;

    if payload.start_date.is_empty() || payload.end_date.is_empty() {
        return Err(ApiError::validation("Start and end dates are required"));
    }

    let season_id = state
        .store()
        .create_season(&payload.start_date, &payload.end_date, payload.participants)
        .await
        .map_err(ApiError::from_store)?;

    tracing::info!(season_id, "season created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateSeasonResponse { season_id })),
    ))
}

/// GET /history/{habby_id}
/// The player's most recent participation with ranking position and the
/// stage delta versus the prior season; null if they never competed.
pub async fn user_history(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(habby_id): Path<String>,
) -> Result<Json<ApiResponse<Option<UserHistoryDto>>>, ApiError> {
    auth::session_user(&session).await?;

    let latest = state
        .store()
        .latest_participation(&habby_id)
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(ApiResponse::success(latest.map(|p| UserHistoryDto {
        season_id: p.season_id,
        start_date: p.start_date,
        position: p.position,
        fase_acesso: p.fase,
        evolution: p.evolution,
    }))))
}
