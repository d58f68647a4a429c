use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{home_content, participants, seasons, user_profiles, users};

pub mod migrator;
pub mod repositories;

pub use repositories::home::HomeContentUpdate;
pub use repositories::profile::{ProfileSearchHit, ProfileUpdate};
pub use repositories::season::{LatestParticipation, ParticipantInput};
pub use repositories::user::UserWithProfile;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn season_repo(&self) -> repositories::season::SeasonRepository {
        repositories::season::SeasonRepository::new(self.conn.clone())
    }

    fn home_repo(&self) -> repositories::home::HomeRepository {
        repositories::home::HomeRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn identity_taken(&self, username: &str, habby_id: &str) -> Result<bool> {
        self.user_repo().identity_taken(username, habby_id).await
    }

    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        habby_id: &str,
        default_pic_url: &str,
        security: &SecurityConfig,
    ) -> Result<users::Role> {
        self.user_repo()
            .register(username, password, habby_id, default_pic_url, security)
            .await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn list_users_with_profiles(&self) -> Result<Vec<UserWithProfile>> {
        self.user_repo().list_with_profiles().await
    }

    pub async fn update_user_role(&self, user_id: i32, role: users::Role) -> Result<()> {
        self.user_repo().update_role(user_id, role).await
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<()> {
        self.user_repo().delete_with_profile(user_id).await
    }

    // ========== Profiles ==========

    pub async fn get_profile(&self, habby_id: &str) -> Result<Option<user_profiles::Model>> {
        self.profile_repo().get_by_habby_id(habby_id).await
    }

    pub async fn search_profiles(&self, query: &str) -> Result<Vec<ProfileSearchHit>> {
        self.profile_repo().search(query).await
    }

    pub async fn update_profile(&self, habby_id: &str, update: ProfileUpdate) -> Result<()> {
        self.profile_repo().update_partial(habby_id, update).await
    }

    // ========== Seasons ==========

    pub async fn list_seasons_with_participants(
        &self,
    ) -> Result<Vec<(seasons::Model, Vec<participants::Model>)>> {
        self.season_repo().list_with_participants().await
    }

    pub async fn create_season(
        &self,
        start_date: &str,
        end_date: &str,
        roster: Vec<ParticipantInput>,
    ) -> Result<i32> {
        self.season_repo().create(start_date, end_date, roster).await
    }

    pub async fn latest_participation(
        &self,
        habby_id: &str,
    ) -> Result<Option<LatestParticipation>> {
        self.season_repo().latest_participation(habby_id).await
    }

    // ========== Home content ==========

    pub async fn get_home_content(&self) -> Result<Option<home_content::Model>> {
        self.home_repo().get().await
    }

    pub async fn update_home_content(&self, update: HomeContentUpdate) -> Result<()> {
        self.home_repo().update(update).await
    }
}
