use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    sea_query::OnConflict,
};
use std::collections::{HashMap, HashSet};

use crate::entities::{collects, prelude::*};

/// Favorites ("collects") of articles by users.
pub struct CollectRepository {
    conn: DatabaseConnection,
}

impl CollectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn collect(&self, user_id: i32, article_id: i32) -> Result<()> {
        let row = collects::ActiveModel {
            collector_id: Set(user_id),
            collected_id: Set(article_id),
            created_at: Set(crate::domain::timestamp()),
        };

        Collects::insert(row)
            .on_conflict(
                OnConflict::columns([collects::Column::CollectorId, collects::Column::CollectedId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn uncollect(&self, user_id: i32, article_id: i32) -> Result<()> {
        Collects::delete_many()
            .filter(collects::Column::CollectorId.eq(user_id))
            .filter(collects::Column::CollectedId.eq(article_id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Favorite counts per article. Articles nobody favorited are absent.
    pub async fn counts_for(&self, article_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if article_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let results: Vec<(i32, i64)> = Collects::find()
            .select_only()
            .column(collects::Column::CollectedId)
            .column_as(collects::Column::CollectedId.count(), "count")
            .filter(collects::Column::CollectedId.is_in(article_ids.to_vec()))
            .group_by(collects::Column::CollectedId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(results.into_iter().collect())
    }

    /// Which of `article_ids` the user has favorited.
    pub async fn collected_among(&self, user_id: i32, article_ids: &[i32]) -> Result<HashSet<i32>> {
        if article_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = Collects::find()
            .select_only()
            .column(collects::Column::CollectedId)
            .filter(collects::Column::CollectorId.eq(user_id))
            .filter(collects::Column::CollectedId.is_in(article_ids.to_vec()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(ids.into_iter().collect())
    }
}
