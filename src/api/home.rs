use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, auth};
use crate::api::types::{HomeContentDto, MessageResponse};
use crate::db::HomeContentUpdate;

#[derive(Deserialize)]
pub struct UpdateHomeContentRequest {
    #[serde(default)]
    pub leader: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub about_us: String,
    #[serde(default)]
    pub content_section: String,
}

/// GET /home-content
/// Public landing-page content, with requirements exposed as a list.
pub async fn get_home_content(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HomeContentDto>>, ApiError> {
    let content = state
        .store()
        .get_home_content()
        .await
        .map_err(ApiError::from_store)?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;

    Ok(Json(ApiResponse::success(HomeContentDto::from(content))))
}

/// PUT /home-content
/// Full overwrite of the singleton content block (unlike profile updates,
/// which are partial).
pub async fn update_home_content(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateHomeContentRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    auth::require_roles(&session, auth::ADMIN_ONLY).await?;

    state
        .store()
        .update_home_content(HomeContentUpdate {
            leader: payload.leader,
            focus: payload.focus,
            league: payload.league,
            requirements: payload.requirements,
            about_us: payload.about_us,
            content_section: payload.content_section,
        })
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Home content updated".to_string(),
    })))
}
