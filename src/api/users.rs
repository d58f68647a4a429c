use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, auth};
use crate::api::types::{MessageResponse, UserListEntryDto};
use crate::entities::users::Role;

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub role: String,
}

/// GET /users
/// All users with their profile data, for the management screen.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<UserListEntryDto>>>, ApiError> {
    auth::require_roles(&session, auth::LEADERSHIP).await?;

    let users = state
        .store()
        .list_users_with_profiles()
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserListEntryDto::from).collect(),
    )))
}

/// PUT /users/{id}/role
/// Promote or demote between member and leader. Admin cannot be assigned
/// here, and admins cannot change their own level.
pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let caller = auth::require_roles(&session, auth::ADMIN_ONLY).await?;

    let new_role = match Role::parse(&payload.role) {
        Some(role @ (Role::Member | Role::Leader)) => role,
        _ => return Err(ApiError::validation("Invalid role")),
    };

    if caller.id == user_id {
        return Err(ApiError::forbidden(
            "Admins cannot change their own access level",
        ));
    }

    // No existence check: updating an unknown id affects zero rows and is
    // reported as success.
    state
        .store()
        .update_user_role(user_id, new_role)
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Access level updated".to_string(),
    })))
}

/// DELETE /users/{id}
/// Admins may delete anyone but themselves; leaders may only delete members.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let caller = auth::require_roles(&session, auth::LEADERSHIP).await?;

    if caller.id == user_id {
        return Err(ApiError::forbidden("You cannot delete yourself"));
    }

    let target = state
        .store()
        .get_user_by_id(user_id)
        .await
        .map_err(ApiError::from_store)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if caller.role == Role::Leader && matches!(target.role, Role::Leader | Role::Admin) {
        return Err(ApiError::forbidden("Leaders may only delete members"));
    }

    state
        .store()
        .delete_user(user_id)
        .await
        .map_err(ApiError::from_store)?;

    tracing::info!(
        deleted = target.username,
        by = caller.username,
        "user deleted"
    );

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "User deleted".to_string(),
    })))
}
