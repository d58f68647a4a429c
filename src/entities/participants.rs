use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One competitor's result within a season. `habby_id` may or may not belong
/// to a registered user; results are imported for the whole roster.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub season_id: i32,

    pub habby_id: Option<String>,

    pub name: String,

    /// Stage/level reached, used for ranking and historical evolution
    pub fase: i32,

    pub r1: i32,
    pub r2: i32,
    pub r3: i32,

    /// Stored as supplied by the importer, never recomputed server-side
    pub total: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seasons::Entity",
        from = "Column::SeasonId",
        to = "super::seasons::Column::Id"
    )]
    Season,
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
