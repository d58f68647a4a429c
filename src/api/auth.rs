use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{
    LoginResponse, MessageResponse, PublicUserDto, RegisterResponse, SessionResponse,
};
use crate::entities::users::Role;

/// Session key holding the [`SessionUser`] snapshot.
const SESSION_USER_KEY: &str = "user";

/// Allowed-role sets for the gated routes.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const LEADERSHIP: &[Role] = &[Role::Admin, Role::Leader];

/// Snapshot of the logged-in user, captured at login time. Role changes made
/// by an admin afterwards do not refresh an existing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub habby_id: String,
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub habby_id: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Gates
// ============================================================================

/// Role gate called at the top of every role-restricted handler: 401 without
/// a session, 403 when the session role is not in `allowed`. Returns the
/// caller snapshot so handlers can apply self-target rules.
pub async fn require_roles(session: &Session, allowed: &[Role]) -> Result<SessionUser, ApiError> {
    let user = session_user(session).await?;

    if !allowed.contains(&user.role) {
        return Err(ApiError::forbidden(
            "Insufficient permissions for this resource",
        ));
    }

    Ok(user)
}

/// Get the session snapshot, or 401 if nobody is logged in.
pub async fn session_user(session: &Session) -> Result<SessionUser, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register-user
/// Create an account plus its default profile. The first account ever
/// registered becomes the admin.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() || payload.habby_id.is_empty() {
        return Err(ApiError::validation(
            "Username, password and habby id are required",
        ));
    }

    // Pre-check; the unique constraints catch whatever races past it.
    if state
        .store()
        .identity_taken(&payload.username, &payload.habby_id)
        .await
        .map_err(ApiError::from_store)?
    {
        return Err(ApiError::Conflict(
            "Username or habby id already exists".to_string(),
        ));
    }

    let security = state.config().read().await.security.clone();

    let role = state
        .store()
        .register_user(
            &payload.username,
            &payload.password,
            &payload.habby_id,
            crate::constants::DEFAULT_PROFILE_PIC_URL,
            &security,
        )
        .await
        .map_err(ApiError::from_store)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisterResponse { role })),
    ))
}

/// POST /login
/// Verify credentials and establish the session snapshot. The failure
/// message never reveals whether the username exists.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let is_valid = state
        .store()
        .verify_user_password(&payload.username, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = state
        .store()
        .get_user_by_username(&payload.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let snapshot = SessionUser {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
        habby_id: user.habby_id.clone(),
    };

    if let Err(e) = session.insert(SESSION_USER_KEY, &snapshot).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    tracing::info!(username = %snapshot.username, role = %snapshot.role.as_str(), "login");

    Ok(Json(ApiResponse::success(LoginResponse {
        user: PublicUserDto::from(user),
    })))
}

/// POST /logout
/// Clears the session; succeeds whether or not one existed.
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /session
/// Returns the cached snapshot without touching the store, so it reflects
/// login-time state.
pub async fn get_session(session: Session) -> Result<Json<SessionResponse>, ApiError> {
    let user = session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(match user {
        Some(user) => SessionResponse {
            is_logged_in: true,
            user: Some(PublicUserDto {
                id: user.id,
                username: user.username,
                role: user.role,
                habby_id: user.habby_id,
            }),
        },
        None => SessionResponse {
            is_logged_in: false,
            user: None,
        },
    }))
}
