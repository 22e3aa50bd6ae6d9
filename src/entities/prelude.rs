pub use super::article_tags::Entity as ArticleTags;
pub use super::articles::Entity as Articles;
pub use super::collects::Entity as Collects;
pub use super::comments::Entity as Comments;
pub use super::follows::Entity as Follows;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;
