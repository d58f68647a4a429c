use sea_orm::entity::prelude::*;

/// Singleton content block for the landing page. Exactly one row exists
/// (id = 1, seeded by the initial migration); it is only ever updated.
///
/// `requirements` is persisted as a `;`-joined string and exposed to callers
/// as a list — see `db::repositories::home` for the codec.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "home_content")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub leader: String,

    pub focus: String,

    pub league: String,

    pub requirements: String,

    pub about_us: String,

    pub content_section: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
