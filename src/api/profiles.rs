use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, auth};
use crate::api::types::MessageResponse;
use crate::constants::limits::MIN_SEARCH_QUERY_LEN;
use crate::db::{ProfileSearchHit, ProfileUpdate};
use crate::entities::user_profiles;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub habby_id: String,
    #[serde(flatten)]
    pub fields: ProfileUpdate,
}

/// GET /search-users?query=
/// Member lookup for the profile pages. Short queries return nothing rather
/// than scanning the whole table.
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ProfileSearchHit>>, ApiError> {
    auth::session_user(&session).await?;

    if params.query.chars().count() < MIN_SEARCH_QUERY_LEN {
        return Ok(Json(Vec::new()));
    }

    let hits = state
        .store()
        .search_profiles(&params.query)
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(hits))
}

/// GET /profile/{habby_id}
/// Any logged-in member may view any profile; only editing is restricted.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(habby_id): Path<String>,
) -> Result<Json<ApiResponse<user_profiles::Model>>, ApiError> {
    auth::session_user(&session).await?;

    let profile = state
        .store()
        .get_profile(&habby_id)
        .await
        .map_err(ApiError::from_store)?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /profile
/// Partial update of the caller's own profile. Ownership is absolute: not
/// even admins may edit someone else's profile.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let caller = auth::session_user(&session).await?;

    if payload.habby_id != caller.habby_id {
        return Err(ApiError::forbidden("You may only edit your own profile"));
    }

    if payload.fields.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    state
        .store()
        .update_profile(&caller.habby_id, payload.fields)
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Profile updated".to_string(),
    })))
}
