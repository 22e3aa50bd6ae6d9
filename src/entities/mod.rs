pub mod prelude;

pub mod article_tags;
pub mod articles;
pub mod collects;
pub mod comments;
pub mod follows;
pub mod tags;
pub mod users;
