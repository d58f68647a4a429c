use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::constants::REQUIREMENTS_SEPARATOR;
use crate::entities::{home_content, prelude::*};

/// Fixed id of the singleton content row.
const HOME_CONTENT_ID: i32 = 1;

/// Full set of content fields; updates overwrite every one of them.
#[derive(Debug, Clone)]
pub struct HomeContentUpdate {
    pub leader: String,
    pub focus: String,
    pub league: String,
    pub requirements: Vec<String>,
    pub about_us: String,
    pub content_section: String,
}

pub struct HomeRepository {
    conn: DatabaseConnection,
}

impl HomeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self) -> Result<Option<home_content::Model>> {
        HomeContent::find_by_id(HOME_CONTENT_ID)
            .one(&self.conn)
            .await
            .context("Failed to query home content")
    }

    /// Full overwrite of the singleton row.
    pub async fn update(&self, update: HomeContentUpdate) -> Result<()> {
        let active = home_content::ActiveModel {
            id: Set(HOME_CONTENT_ID),
            leader: Set(update.leader),
            focus: Set(update.focus),
            league: Set(update.league),
            requirements: Set(join_requirements(&update.requirements)),
            about_us: Set(update.about_us),
            content_section: Set(update.content_section),
        };

        active
            .update(&self.conn)
            .await
            .context("Failed to update home content")?;

        Ok(())
    }
}

/// Storage side of the requirements codec: list -> `;`-joined text.
/// An empty list maps to the empty string.
#[must_use]
pub fn join_requirements(requirements: &[String]) -> String {
    requirements.join(&REQUIREMENTS_SEPARATOR.to_string())
}

/// Caller side of the requirements codec: `;`-joined text -> list.
/// The empty string maps back to an empty list.
#[must_use]
pub fn split_requirements(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }

    stored
        .split(REQUIREMENTS_SEPARATOR)
        .map(ToString::to_string)
        .collect()
}
