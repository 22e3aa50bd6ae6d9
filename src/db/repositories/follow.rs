use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
    sea_query::OnConflict,
};
use std::collections::HashSet;

use crate::entities::{follows, prelude::*};

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Idempotent: following twice leaves a single edge.
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<()> {
        let edge = follows::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
            created_at: Set(crate::domain::timestamp()),
        };

        Follows::insert(edge)
            .on_conflict(
                OnConflict::columns([follows::Column::FollowerId, follows::Column::FollowedId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    /// Idempotent: unfollowing someone not followed is a no-op.
    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<()> {
        Follows::delete_many()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowedId.eq(followed_id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let count = Follows::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowedId.eq(followed_id))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    /// Which of `candidates` are followed by `follower_id`.
    pub async fn following_among(
        &self,
        follower_id: i32,
        candidates: &[i32],
    ) -> Result<HashSet<i32>> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = Follows::find()
            .select_only()
            .column(follows::Column::FollowedId)
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowedId.is_in(candidates.to_vec()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(ids.into_iter().collect())
    }
}
