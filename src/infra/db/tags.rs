use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::application::repos::{EntryFilter, RepoError, TagUsage, TagsRepo};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct TagUsageRow {
    name: String,
    usage_count: i64,
}

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn usage_counts(&self, filter: &EntryFilter) -> Result<Vec<TagUsage>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT t.name, COUNT(DISTINCT e.id) AS usage_count \
             FROM tags t \
             INNER JOIN entry_tags et ON et.tag_id = t.id \
             INNER JOIN entries e ON e.id = et.entry_id \
             WHERE 1=1 ",
        );
        self.apply_entry_filter(&mut qb, filter);
        qb.push(" GROUP BY t.name ORDER BY t.name ");

        let rows: Vec<TagUsageRow> = qb
            .build_query_as::<TagUsageRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(TagUsage {
                    name: row.name,
                    count: Self::convert_count(row.usage_count)?,
                })
            })
            .collect()
    }
}
