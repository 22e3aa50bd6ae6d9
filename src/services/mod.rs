pub mod mailer;
pub use mailer::{LogMailer, MailMessage, Mailer};

pub mod presenter;
pub use presenter::{ArticleDto, CommentDto, Presenter, ProfileDto, UserDto};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Registration, SignedIn, UserUpdate};
pub use auth_service_impl::SeaOrmAuthService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{ProfileError, ProfileService};
pub use profile_service_impl::SeaOrmProfileService;

pub mod article_service;
pub mod article_service_impl;
pub use article_service::{
    ArticleError, ArticleList, ArticleListQuery, ArticleService, ArticleUpdate, NewArticleInput,
};
pub use article_service_impl::SeaOrmArticleService;

pub mod comment_service;
pub mod comment_service_impl;
pub use comment_service::{CommentError, CommentService};
pub use comment_service_impl::SeaOrmCommentService;
