//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{MailConfig, SecurityConfig};
use crate::db::{NewUser, Store, User, UserChanges};
use crate::domain::UserId;
use crate::services::auth_service::{AuthError, AuthService, Registration, SignedIn, UserUpdate};
use crate::services::mailer::{Mailer, confirmation_message};
use crate::services::presenter::UserDto;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    mail: MailConfig,
    mailer: Arc<dyn Mailer>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        security: SecurityConfig,
        mail: MailConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            security,
            mail,
            mailer,
        }
    }

    async fn send_confirmation(&self, user: &User) -> Result<(), AuthError> {
        let Some(token) = self.store.get_user_confirm_token(user.id).await? else {
            return Ok(());
        };

        let message = confirmation_message(&self.mail, &user.email, &user.username, &token);
        // Registration succeeds even if the mail cannot be delivered.
        if let Err(e) = self.mailer.send(message).await {
            warn!(user_id = user.id, error = %e, "Failed to send confirmation mail");
        }

        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<SignedIn, AuthError> {
        if self
            .store
            .get_user_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUser("email already registered".to_string()));
        }

        if self
            .store
            .get_user_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUser("username already taken".to_string()));
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    username: &registration.username,
                    email: &registration.email,
                    password: &registration.password,
                },
                &self.security,
            )
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");

        if self.mail.enabled {
            self.send_confirmation(&user).await?;
        }

        Ok(SignedIn {
            user_id: UserId::new(user.id),
            user: UserDto::from(&user),
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::EmailNotRegistered)?;

        if !self.store.verify_user_password(user.id, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.store.rotate_user_token(user.id).await?;

        let mut dto = UserDto::from(&user);
        dto.token = Some(token);

        Ok(SignedIn {
            user_id: UserId::new(user.id),
            user: dto,
        })
    }

    async fn authenticate(&self, token: &str) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user_by_token(token).await?)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user(id.value()).await?)
    }

    async fn update(&self, id: UserId, update: UserUpdate) -> Result<UserDto, AuthError> {
        if let Some(email) = &update.email
            && let Some(other) = self.store.get_user_by_email(email).await?
            && other.id != id.value()
        {
            return Err(AuthError::DuplicateUser("email already registered".to_string()));
        }

        if let Some(username) = &update.username
            && let Some(other) = self.store.get_user_by_username(username).await?
            && other.id != id.value()
        {
            return Err(AuthError::DuplicateUser("username already taken".to_string()));
        }

        let changes = UserChanges {
            username: update.username,
            email: update.email,
            bio: update.bio,
            image: update.image,
            password: update.password,
        };

        let user = self
            .store
            .update_user(id.value(), changes, &self.security)
            .await?;

        Ok(UserDto::from(&user))
    }

    async fn confirm(&self, id: UserId, token: &str) -> Result<UserDto, AuthError> {
        if !self.store.confirm_user(id.value(), token).await? {
            return Err(AuthError::Validation("invalid confirmation token".to_string()));
        }

        let user = self
            .store
            .get_user(id.value())
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        info!(user_id = user.id, "Email confirmed");
        Ok(UserDto::from(&user))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, AuthError> {
        let Some(user) = self.store.get_user_by_username(username).await? else {
            return Ok(false);
        };

        let deleted = self.store.delete_user(user.id).await?;
        if deleted {
            info!(user_id = user.id, username = %username, "User deleted");
        }
        Ok(deleted)
    }
}
