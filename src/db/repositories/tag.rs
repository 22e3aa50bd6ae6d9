use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::OnConflict,
};
use std::collections::HashMap;

use crate::entities::{article_tags, prelude::*, tags};

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All tag names ever used, in creation order.
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let names: Vec<String> = Tags::find()
            .select_only()
            .column(tags::Column::Name)
            .order_by_asc(tags::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(names)
    }

    /// Tag names per article, each list in attachment order.
    pub async fn names_for_articles(&self, article_ids: &[i32]) -> Result<HashMap<i32, Vec<String>>> {
        names_for_articles(&self.conn, article_ids).await
    }
}

pub(crate) async fn names_for_articles<C: ConnectionTrait>(
    conn: &C,
    article_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>> {
    if article_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, String)> = ArticleTags::find()
        .select_only()
        .column(article_tags::Column::ArticleId)
        .column(tags::Column::Name)
        .inner_join(Tags)
        .filter(article_tags::Column::ArticleId.is_in(article_ids.to_vec()))
        .order_by_asc(article_tags::Column::ArticleId)
        .order_by_asc(tags::Column::Id)
        .into_tuple()
        .all(conn)
        .await?;

    let mut map: HashMap<i32, Vec<String>> = HashMap::new();
    for (article_id, name) in rows {
        map.entry(article_id).or_default().push(name);
    }

    Ok(map)
}

/// Returns the ids for `names`, creating any tag that does not exist yet.
/// Output order follows `names`.
pub(crate) async fn resolve_ids<C: ConnectionTrait>(conn: &C, names: &[String]) -> Result<Vec<i32>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let existing: HashMap<String, i32> = Tags::find()
        .filter(tags::Column::Name.is_in(names.to_vec()))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| (t.name, t.id))
        .collect();

    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        if let Some(id) = existing.get(name) {
            ids.push(*id);
            continue;
        }

        let model = tags::ActiveModel {
            name: Set(name.clone()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        ids.push(model.id);
    }

    Ok(ids)
}

/// Replaces the tag links of an article with `tag_ids`.
pub(crate) async fn set_article_tags<C: ConnectionTrait>(
    conn: &C,
    article_id: i32,
    tag_ids: &[i32],
) -> Result<()> {
    ArticleTags::delete_many()
        .filter(article_tags::Column::ArticleId.eq(article_id))
        .exec(conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let links = tag_ids.iter().map(|tag_id| article_tags::ActiveModel {
        article_id: Set(article_id),
        tag_id: Set(*tag_id),
    });

    ArticleTags::insert_many(links)
        .on_conflict(
            OnConflict::columns([article_tags::Column::ArticleId, article_tags::Column::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}
