use sea_orm::entity::prelude::*;

/// A user favoriting an article.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "collects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub collector_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub collected_id: i32,

    /// When the article was favorited
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CollectorId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Collector,
    #[sea_orm(
        belongs_to = "super::articles::Entity",
        from = "Column::CollectedId",
        to = "super::articles::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Collected,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collector.def()
    }
}

impl Related<super::articles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collected.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
