use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Always stored lowercase
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub bio: Option<String>,

    pub image: Option<String>,

    pub confirmed: bool,

    /// Bearer token issued at registration/login (64-char hex string)
    #[sea_orm(unique)]
    pub token: Option<String>,

    /// Pending email confirmation token, cleared once confirmed.
    pub confirm_token: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::articles::Entity")]
    Articles,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
    #[sea_orm(has_many = "super::collects::Entity")]
    Collects,
}

impl Related<super::articles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::collects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
