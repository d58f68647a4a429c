use sea_orm::entity::prelude::*;
use serde::Serialize;

/// 1:1 extension of a user, keyed by habby_id. Holds the editable display
/// fields plus the self-reported game statistics shown on the profile page.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    #[sea_orm(unique)]
    pub habby_id: String,

    pub nick: String,

    pub profile_pic_url: String,

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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
