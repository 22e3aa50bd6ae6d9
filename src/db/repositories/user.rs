use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{
    article_tags, articles, collects, comments, follows, prelude::*, users,
};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub confirmed: bool,
    pub token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            bio: model.bio,
            image: model.image,
            confirmed: model.confirmed,
            token: model.token,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields accepted when registering.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Partial profile update; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub password: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user with a hashed password and fresh bearer/confirm tokens.
    pub async fn create(&self, new_user: NewUser<'_>, config: &SecurityConfig) -> Result<User> {
        let password = new_user.password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let now = crate::domain::timestamp();
        let model = users::ActiveModel {
            username: Set(new_user.username.to_string()),
            email: Set(new_user.email.to_lowercase()),
            password_hash: Set(password_hash),
            bio: Set(None),
            image: Set(None),
            confirmed: Set(false),
            token: Set(Some(generate_token())),
            confirm_token: Set(Some(generate_token())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by email (case-insensitive, emails are stored lowercase)
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Verify a bearer token and return the associated user
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query user by token")?;

        Ok(user.map(User::from))
    }

    /// Verify password for a user
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, id: i32, password: &str) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?
        else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Apply a partial profile update; the password, if present, is re-hashed.
    pub async fn update(
        &self,
        id: i32,
        changes: UserChanges,
        config: &SecurityConfig,
    ) -> Result<User> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let new_hash = match changes.password {
            Some(password) => {
                let config = config.clone();
                Some(
                    task::spawn_blocking(move || hash_password(&password, Some(&config)))
                        .await
                        .context("Password hashing task panicked")??,
                )
            }
            None => None,
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email.to_lowercase());
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        if let Some(hash) = new_hash {
            active.password_hash = Set(hash);
        }
        active.updated_at = Set(crate::domain::timestamp());

        let model = active.update(&self.conn).await.context("Failed to update user")?;
        Ok(User::from(model))
    }

    /// Issue a new bearer token, invalidating the previous one.
    pub async fn rotate_token(&self, id: i32) -> Result<String> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for token rotation")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let token = generate_token();
        let mut active: users::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(crate::domain::timestamp());
        active.update(&self.conn).await?;

        Ok(token)
    }

    pub async fn get_confirm_token(&self, id: i32) -> Result<Option<String>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for confirm token")?;

        Ok(user.and_then(|u| u.confirm_token))
    }

    /// Marks the user confirmed when `token` matches the pending confirm
    /// token. Returns whether the user is confirmed afterwards.
    pub async fn confirm(&self, id: i32, token: &str) -> Result<bool> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for confirmation")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        if user.confirmed {
            return Ok(true);
        }

        if user.confirm_token.as_deref() != Some(token) {
            return Ok(false);
        }

        let mut active: users::ActiveModel = user.into();
        active.confirmed = Set(true);
        active.confirm_token = Set(None);
        active.updated_at = Set(crate::domain::timestamp());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Delete a user together with everything that references them: their
    /// articles (and those articles' comments, favorites and tag links), their
    /// own comments and favorites, and follow edges in both directions.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let article_ids: Vec<i32> = Articles::find()
            .filter(articles::Column::AuthorId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();

        if !article_ids.is_empty() {
            delete_article_children(&txn, &article_ids).await?;
            Articles::delete_many()
                .filter(articles::Column::Id.is_in(article_ids))
                .exec(&txn)
                .await?;
        }

        Comments::delete_many()
            .filter(comments::Column::AuthorId.eq(id))
            .exec(&txn)
            .await?;

        Collects::delete_many()
            .filter(collects::Column::CollectorId.eq(id))
            .exec(&txn)
            .await?;

        Follows::delete_many()
            .filter(
                follows::Column::FollowerId
                    .eq(id)
                    .or(follows::Column::FollowedId.eq(id)),
            )
            .exec(&txn)
            .await?;

        let result = Users::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}

/// Remove tag links, favorites and comments of the given articles.
pub(crate) async fn delete_article_children<C: ConnectionTrait>(
    conn: &C,
    article_ids: &[i32],
) -> Result<()> {
    ArticleTags::delete_many()
        .filter(article_tags::Column::ArticleId.is_in(article_ids.to_vec()))
        .exec(conn)
        .await?;

    Collects::delete_many()
        .filter(collects::Column::CollectedId.is_in(article_ids.to_vec()))
        .exec(conn)
        .await?;

    Comments::delete_many()
        .filter(comments::Column::ArticleId.is_in(article_ids.to_vec()))
        .exec(conn)
        .await?;

    Ok(())
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default Argon2 params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a random token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_hex_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn hashed_password_verifies() {
        let cfg = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let hash = hash_password("correct horse", Some(&cfg)).unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong horse", &parsed)
                .is_err()
        );
    }
}
