use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Secondary indexes for the reverse side of each association. The forward
/// side is already covered by the composite primary keys.
const INDEXES: &[(&str, &str, &str)] = &[
    ("idx_articles_author_id", "articles", "author_id"),
    ("idx_comments_article_id", "comments", "article_id"),
    ("idx_article_tags_tag_id", "article_tags", "tag_id"),
    ("idx_follows_followed_id", "follows", "followed_id"),
    ("idx_collects_collected_id", "collects", "collected_id"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, column) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(*name)
                        .table(Alias::new(*table))
                        .col(Alias::new(*column))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in INDEXES {
            manager
                .drop_index(
                    Index::drop()
                        .name(*name)
                        .table(Alias::new(*table))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
