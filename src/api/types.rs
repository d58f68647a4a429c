use serde::{Deserialize, Serialize};

use crate::db::UserWithProfile;
use crate::entities::{home_content, participants, seasons, users};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Public view of a user, safe to hand to the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUserDto {
    pub id: i32,
    pub username: String,
    pub role: users::Role,
    pub habby_id: String,
}

impl From<users::Model> for PublicUserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            habby_id: model.habby_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub role: users::Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUserDto,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUserDto>,
}

/// Row of the management user list: user joined with its profile, profile
/// columns null when the profile is missing.
#[derive(Debug, Serialize)]
pub struct UserListEntryDto {
    pub id: i32,
    pub username: String,
    pub role: users::Role,
    pub habby_id: Option<String>,
    pub nick: Option<String>,
    pub profile_pic_url: Option<String>,
}

impl From<UserWithProfile> for UserListEntryDto {
    fn from(row: UserWithProfile) -> Self {
        Self {
            id: row.id,
            username: row.username,
            role: row.role,
            habby_id: row.habby_id,
            nick: row.nick,
            profile_pic_url: row.profile_pic_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeasonDto {
    pub id: i32,
    pub start_date: String,
    pub end_date: String,
    pub participants: Vec<participants::Model>,
}

impl From<(seasons::Model, Vec<participants::Model>)> for SeasonDto {
    fn from((season, participants): (seasons::Model, Vec<participants::Model>)) -> Self {
        Self {
            id: season.id,
            start_date: season.start_date,
            end_date: season.end_date,
            participants,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateSeasonResponse {
    #[serde(rename = "seasonId")]
    pub season_id: i32,
}

/// Most recent participation of a player, as shown on the profile page.
#[derive(Debug, Serialize)]
pub struct UserHistoryDto {
    pub season_id: i32,
    pub start_date: String,
    /// 1-based rank within that season, by fase descending
    pub position: Option<usize>,
    pub fase_acesso: i32,
    /// Fase delta versus the prior season, null for a first participation
    pub evolution: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeContentDto {
    pub id: i32,
    pub leader: String,
    pub focus: String,
    pub league: String,
    pub requirements: Vec<String>,
    pub about_us: String,
    pub content_section: String,
}

impl From<home_content::Model> for HomeContentDto {
    fn from(model: home_content::Model) -> Self {
        Self {
            id: model.id,
            leader: model.leader,
            focus: model.focus,
            league: model.league,
            requirements: crate::db::repositories::home::split_requirements(&model.requirements),
            about_us: model.about_us,
            content_section: model.content_section,
        }
    }
}
