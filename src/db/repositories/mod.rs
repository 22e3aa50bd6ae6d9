pub mod article;
pub mod collect;
pub mod comment;
pub mod follow;
pub mod tag;
pub mod user;
