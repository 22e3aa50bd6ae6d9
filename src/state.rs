use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ArticleService, AuthService, CommentService, LogMailer, Mailer, ProfileService,
    SeaOrmArticleService, SeaOrmAuthService, SeaOrmCommentService, SeaOrmProfileService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub profile_service: Arc<dyn ProfileService>,

    pub article_service: Arc<dyn ArticleService>,

    pub comment_service: Arc<dyn CommentService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_mailer(config, Arc::new(LogMailer)).await
    }

    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            config.mail.clone(),
            mailer,
        )) as Arc<dyn AuthService>;

        let profile_service =
            Arc::new(SeaOrmProfileService::new(store.clone())) as Arc<dyn ProfileService>;

        let article_service = Arc::new(SeaOrmArticleService::new(
            store.clone(),
            config.pagination.clone(),
        )) as Arc<dyn ArticleService>;

        let comment_service =
            Arc::new(SeaOrmCommentService::new(store.clone())) as Arc<dyn CommentService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            profile_service,
            article_service,
            comment_service,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
