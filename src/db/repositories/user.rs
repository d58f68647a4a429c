use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, user_profiles, users};

/// A user row joined with its profile. Profile columns are null for users
/// whose profile row is missing.
#[derive(Debug, Clone)]
pub struct UserWithProfile {
    pub id: i32,
    pub username: String,
    pub role: users::Role,
    pub habby_id: Option<String>,
    pub nick: Option<String>,
    pub profile_pic_url: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get the full user row (including the password hash) by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")
    }

    /// Pre-check for registration. Not atomic with the insert; the unique
    /// constraints remain the final authority on races.
    pub async fn identity_taken(&self, username: &str, habby_id: &str) -> Result<bool> {
        let existing = Users::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::HabbyId.eq(habby_id)),
            )
            .one(&self.conn)
            .await
            .context("Failed to check username/habby_id availability")?;

        Ok(existing.is_some())
    }

    /// Creates the user and its default profile in one transaction.
    ///
    /// The first user registered while no admin exists becomes the admin;
    /// everyone else starts as a member. Returns the assigned role.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        habby_id: &str,
        default_pic_url: &str,
        security: &SecurityConfig,
    ) -> Result<users::Role> {
        let password = password.to_string();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let txn = self.conn.begin().await?;

        let admin_exists = Users::find()
            .filter(users::Column::Role.eq(users::Role::Admin))
            .one(&txn)
            .await
            .context("Failed to check for an existing admin")?
            .is_some();

        let role = if admin_exists {
            users::Role::Member
        } else {
            users::Role::Admin
        };

        let user = Users::insert(users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(role),
            habby_id: Set(habby_id.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        })
        .exec(&txn)
        .await
        .context("Failed to insert user")?;

        UserProfiles::insert(user_profiles::ActiveModel {
            user_id: Set(user.last_insert_id),
            habby_id: Set(habby_id.to_string()),
            nick: Set(username.to_string()),
            profile_pic_url: Set(default_pic_url.to_string()),
            ..Default::default()
        })
        .exec(&txn)
        .await
        .context("Failed to insert default profile")?;

        txn.commit().await?;
        Ok(role)
    }

    /// Verify a password against a user's stored hash.
    /// Runs under `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would stall the async runtime.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let Some(user) = self.get_by_username(username).await? else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// All users LEFT JOINed with their profiles, ordered by role then
    /// username.
    pub async fn list_with_profiles(&self) -> Result<Vec<UserWithProfile>> {
        let rows = Users::find()
            .find_also_related(UserProfiles)
            .order_by_asc(users::Column::Role)
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows
            .into_iter()
            .map(|(user, profile)| UserWithProfile {
                id: user.id,
                username: user.username,
                role: user.role,
                habby_id: profile.as_ref().map(|p| p.habby_id.clone()),
                nick: profile.as_ref().map(|p| p.nick.clone()),
                profile_pic_url: profile.map(|p| p.profile_pic_url),
            })
            .collect())
    }

    /// Unconditional role update. Updating an id that does not exist affects
    /// zero rows and is reported as success.
    pub async fn update_role(&self, user_id: i32, role: users::Role) -> Result<()> {
        Users::update_many()
            .set(users::ActiveModel {
                role: Set(role),
                ..Default::default()
            })
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to update user role")?;

        Ok(())
    }

    /// Deletes the user row and its profile row in one transaction.
    pub async fn delete_with_profile(&self, user_id: i32) -> Result<()> {
        let txn = self.conn.begin().await?;

        UserProfiles::delete_many()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .context("Failed to delete user profile")?;

        Users::delete_by_id(user_id)
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit().await?;
        Ok(())
    }
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
