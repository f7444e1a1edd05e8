use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{AuthorOrder, AuthorsRepo, EntryFilter, RepoError};
use crate::domain::entities::AuthorRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    date_joined: OffsetDateTime,
}

impl From<AuthorRow> for AuthorRecord {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            date_joined: row.date_joined,
        }
    }
}

#[async_trait]
impl AuthorsRepo for PostgresRepositories {
    async fn list_authors(
        &self,
        filter: &EntryFilter,
        order: AuthorOrder,
    ) -> Result<Vec<AuthorRecord>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT a.id, a.username, a.first_name, a.last_name, a.email, a.date_joined \
             FROM authors a \
             WHERE EXISTS (SELECT 1 FROM entries e WHERE e.author_id = a.id ",
        );
        self.apply_entry_filter(&mut qb, filter);

        // Column names come from a closed enum, never from input.
        let direction = if order.descending { "DESC" } else { "ASC" };
        qb.push(format_args!(
            ") ORDER BY a.{} {direction}, a.id ASC",
            order.field.as_str()
        ));

        let rows: Vec<AuthorRow> = qb
            .build_query_as::<AuthorRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(AuthorRecord::from).collect())
    }
}
