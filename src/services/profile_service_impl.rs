//! `SeaORM` implementation of the `ProfileService` trait.

use async_trait::async_trait;
use tracing::debug;

use crate::db::{Store, User};
use crate::domain::UserId;
use crate::services::presenter::{Presenter, ProfileDto};
use crate::services::profile_service::{ProfileError, ProfileService};

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn target(&self, username: &str) -> Result<User, ProfileError> {
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ProfileError::NotFound(username.to_string()))
    }
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn get(&self, username: &str, viewer: Option<UserId>) -> Result<ProfileDto, ProfileError> {
        let user = self.target(username).await?;
        Ok(Presenter::new(&self.store, viewer).profile(&user).await?)
    }

    async fn follow(&self, actor: UserId, username: &str) -> Result<ProfileDto, ProfileError> {
        let user = self.target(username).await?;
        if user.id == actor.value() {
            return Err(ProfileError::SelfFollow);
        }

        self.store.follow(actor.value(), user.id).await?;
        debug!(follower = %actor, followed = user.id, "Followed user");

        Ok(Presenter::new(&self.store, Some(actor)).profile(&user).await?)
    }

    async fn unfollow(&self, actor: UserId, username: &str) -> Result<ProfileDto, ProfileError> {
        let user = self.target(username).await?;

        self.store.unfollow(actor.value(), user.id).await?;
        debug!(follower = %actor, followed = user.id, "Unfollowed user");

        Ok(Presenter::new(&self.store, Some(actor)).profile(&user).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::NewUser;

    async fn setup() -> (SeaOrmProfileService, UserId, UserId) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };

        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let email = format!("{name}@example.com");
            let user = store
                .create_user(
                    NewUser {
                        username: name,
                        email: &email,
                        password: "password123",
                    },
                    &security,
                )
                .await
                .unwrap();
            ids.push(UserId::new(user.id));
        }

        (SeaOrmProfileService::new(store), ids[0], ids[1])
    }

    #[tokio::test]
    async fn follow_then_unfollow() {
        let (svc, alice, _) = setup().await;

        let profile = svc.follow(alice, "bob").await.unwrap();
        assert!(profile.following);
        let profile = svc.follow(alice, "bob").await.unwrap();
        assert!(profile.following);

        assert!(svc.get("bob", Some(alice)).await.unwrap().following);
        assert!(!svc.get("bob", None).await.unwrap().following);

        let profile = svc.unfollow(alice, "bob").await.unwrap();
        assert!(!profile.following);
        assert!(!svc.unfollow(alice, "bob").await.unwrap().following);
    }

    #[tokio::test]
    async fn self_follow_is_rejected() {
        let (svc, alice, _) = setup().await;
        assert!(matches!(
            svc.follow(alice, "alice").await,
            Err(ProfileError::SelfFollow)
        ));
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let (svc, alice, _) = setup().await;
        assert!(matches!(
            svc.get("nobody", None).await,
            Err(ProfileError::NotFound(_))
        ));
        assert!(matches!(
            svc.follow(alice, "nobody").await,
            Err(ProfileError::NotFound(_))
        ));
    }
}
