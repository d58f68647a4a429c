use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use serde::Deserialize;

use crate::constants::limits::MAX_SEARCH_RESULTS;
use crate::entities::{prelude::*, user_profiles};

/// The whitelisted editable profile fields. Only fields present in the
/// request body are written; everything else keeps its stored value.
/// Unknown keys are dropped during deserialization, and an explicit `null`
/// is treated the same as an absent key, so a stored stat cannot be
/// cleared back to empty through this endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub nick: Option<String>,
    pub profile_pic_url: Option<String>,

    pub atk: Option<f64>,
    pub hp: Option<f64>,

    pub survivor_base_atk: Option<f64>,
    pub survivor_base_hp: Option<f64>,
    pub survivor_bonus_atk: Option<f64>,
    pub survivor_bonus_hp: Option<f64>,
    pub survivor_final_atk: Option<f64>,
    pub survivor_final_hp: Option<f64>,
    pub survivor_crit_rate: Option<f64>,
    pub survivor_crit_damage: Option<f64>,
    pub survivor_skill_damage: Option<f64>,
    pub survivor_shield_boost: Option<f64>,
    pub survivor_poison_targets: Option<f64>,
    pub survivor_weak_targets: Option<f64>,
    pub survivor_frozen_targets: Option<f64>,

    pub pet_base_atk: Option<f64>,
    pub pet_base_hp: Option<f64>,
    pub pet_crit_damage: Option<f64>,
    pub pet_skill_damage: Option<f64>,

    pub collect_final_atk: Option<f64>,
    pub collect_final_hp: Option<f64>,
    pub collect_crit_rate: Option<f64>,
    pub collect_crit_damage: Option<f64>,
    pub collect_skill_damage: Option<f64>,
    pub collect_poison_targets: Option<f64>,
    pub collect_weak_targets: Option<f64>,
    pub collect_frozen_targets: Option<f64>,
}

impl ProfileUpdate {
    /// True when no whitelisted field was supplied at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nick.is_none()
            && self.profile_pic_url.is_none()
            && self.atk.is_none()
            && self.hp.is_none()
            && self.survivor_base_atk.is_none()
            && self.survivor_base_hp.is_none()
            && self.survivor_bonus_atk.is_none()
            && self.survivor_bonus_hp.is_none()
            && self.survivor_final_atk.is_none()
            && self.survivor_final_hp.is_none()
            && self.survivor_crit_rate.is_none()
            && self.survivor_crit_damage.is_none()
            && self.survivor_skill_damage.is_none()
            && self.survivor_shield_boost.is_none()
            && self.survivor_poison_targets.is_none()
            && self.survivor_weak_targets.is_none()
            && self.survivor_frozen_targets.is_none()
            && self.pet_base_atk.is_none()
            && self.pet_base_hp.is_none()
            && self.pet_crit_damage.is_none()
            && self.pet_skill_damage.is_none()
            && self.collect_final_atk.is_none()
            && self.collect_final_hp.is_none()
            && self.collect_crit_rate.is_none()
            && self.collect_crit_damage.is_none()
            && self.collect_skill_damage.is_none()
            && self.collect_poison_targets.is_none()
            && self.collect_weak_targets.is_none()
            && self.collect_frozen_targets.is_none()
    }

    /// Builds an `ActiveModel` carrying only the supplied fields.
    fn into_active_model(self) -> user_profiles::ActiveModel {
        let mut active = user_profiles::ActiveModel::default();

        if let Some(v) = self.nick {
            active.nick = Set(v);
        }
        if let Some(v) = self.profile_pic_url {
            active.profile_pic_url = Set(v);
        }
        if let Some(v) = self.atk {
            active.atk = Set(Some(v));
        }
        if let Some(v) = self.hp {
            active.hp = Set(Some(v));
        }
        if let Some(v) = self.survivor_base_atk {
            active.survivor_base_atk = Set(Some(v));
        }
        if let Some(v) = self.survivor_base_hp {
            active.survivor_base_hp = Set(Some(v));
        }
        if let Some(v) = self.survivor_bonus_atk {
            active.survivor_bonus_atk = Set(Some(v));
        }
        if let Some(v) = self.survivor_bonus_hp {
            active.survivor_bonus_hp = Set(Some(v));
        }
        if let Some(v) = self.survivor_final_atk {
            active.survivor_final_atk = Set(Some(v));
        }
        if let Some(v) = self.survivor_final_hp {
            active.survivor_final_hp = Set(Some(v));
        }
        if let Some(v) = self.survivor_crit_rate {
            active.survivor_crit_rate = Set(Some(v));
        }
        if let Some(v) = self.survivor_crit_damage {
            active.survivor_crit_damage = Set(Some(v));
        }
        if let Some(v) = self.survivor_skill_damage {
            active.survivor_skill_damage = Set(Some(v));
        }
        if let Some(v) = self.survivor_shield_boost {
            active.survivor_shield_boost = Set(Some(v));
        }
        if let Some(v) = self.survivor_poison_targets {
            active.survivor_poison_targets = Set(Some(v));
        }
        if let Some(v) = self.survivor_weak_targets {
            active.survivor_weak_targets = Set(Some(v));
        }
        if let Some(v) = self.survivor_frozen_targets {
            active.survivor_frozen_targets = Set(Some(v));
        }
        if let Some(v) = self.pet_base_atk {
            active.pet_base_atk = Set(Some(v));
        }
        if let Some(v) = self.pet_base_hp {
            active.pet_base_hp = Set(Some(v));
        }
        if let Some(v) = self.pet_crit_damage {
            active.pet_crit_damage = Set(Some(v));
        }
        if let Some(v) = self.pet_skill_damage {
            active.pet_skill_damage = Set(Some(v));
        }
        if let Some(v) = self.collect_final_atk {
            active.collect_final_atk = Set(Some(v));
        }
        if let Some(v) = self.collect_final_hp {
            active.collect_final_hp = Set(Some(v));
        }
        if let Some(v) = self.collect_crit_rate {
            active.collect_crit_rate = Set(Some(v));
        }
        if let Some(v) = self.collect_crit_damage {
            active.collect_crit_damage = Set(Some(v));
        }
        if let Some(v) = self.collect_skill_damage {
            active.collect_skill_damage = Set(Some(v));
        }
        if let Some(v) = self.collect_poison_targets {
            active.collect_poison_targets = Set(Some(v));
        }
        if let Some(v) = self.collect_weak_targets {
            active.collect_weak_targets = Set(Some(v));
        }
        if let Some(v) = self.collect_frozen_targets {
            active.collect_frozen_targets = Set(Some(v));
        }

        active
    }
}

/// Minimal row returned by the member search.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProfileSearchHit {
    pub habby_id: String,
    pub nick: String,
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_habby_id(&self, habby_id: &str) -> Result<Option<user_profiles::Model>> {
        UserProfiles::find()
            .filter(user_profiles::Column::HabbyId.eq(habby_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile")
    }

    /// Substring search over nick and habby_id. LIKE is case-insensitive
    /// under the default collation, matching the intended behavior.
    pub async fn search(&self, query: &str) -> Result<Vec<ProfileSearchHit>> {
        let rows = UserProfiles::find()
            .filter(
                Condition::any()
                    .add(user_profiles::Column::Nick.contains(query))
                    .add(user_profiles::Column::HabbyId.contains(query)),
            )
            .limit(MAX_SEARCH_RESULTS)
            .all(&self.conn)
            .await
            .context("Failed to search profiles")?;

        Ok(rows
            .into_iter()
            .map(|p| ProfileSearchHit {
                habby_id: p.habby_id,
                nick: p.nick,
            })
            .collect())
    }

    /// Partial update: only the fields carried by `update` are written.
    pub async fn update_partial(&self, habby_id: &str, update: ProfileUpdate) -> Result<()> {
        UserProfiles::update_many()
            .set(update.into_active_model())
            .filter(user_profiles::Column::HabbyId.eq(habby_id))
            .exec(&self.conn)
            .await
            .context("Failed to update profile")?;

        Ok(())
    }
}
