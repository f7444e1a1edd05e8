use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::application::repos::{Adjacency, EntriesRepo, EntryFilter, RepoError};
use crate::domain::entities::EntryRecord;
use crate::domain::language::LanguageTag;

use super::{ENTRY_COLUMNS, NORMALIZED_LANGUAGE, PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    slug: String,
    title: String,
    excerpt: String,
    language: String,
    author_id: Uuid,
    is_published: bool,
    pub_date: OffsetDateTime,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    tags: Vec<String>,
}

impl TryFrom<EntryRow> for EntryRecord {
    type Error = RepoError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let language = LanguageTag::parse(&row.language).map_err(|err| {
            RepoError::integrity(format!("entry `{}` has a bad language: {err}", row.slug))
        })?;

        Ok(Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            excerpt: row.excerpt,
            language,
            author_id: row.author_id,
            is_published: row.is_published,
            pub_date: row.pub_date,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BucketRow {
    bucket: Date,
}

impl PostgresRepositories {
    async fn distinct_buckets(
        &self,
        unit: &'static str,
        filter: &EntryFilter,
    ) -> Result<Vec<Date>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT DISTINCT date_trunc(");
        qb.push_bind(unit);
        qb.push(", ");
        self.push_local_time_expr(&mut qb);
        qb.push(")::date AS bucket FROM entries e WHERE 1=1 ");
        self.apply_entry_filter(&mut qb, filter);
        qb.push(" ORDER BY bucket ");

        let rows: Vec<BucketRow> = qb
            .build_query_as::<BucketRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.bucket).collect())
    }
}

#[async_trait]
impl EntriesRepo for PostgresRepositories {
    async fn distinct_years(&self, filter: &EntryFilter) -> Result<Vec<Date>, RepoError> {
        self.distinct_buckets("year", filter).await
    }

    async fn distinct_months(&self, filter: &EntryFilter) -> Result<Vec<Date>, RepoError> {
        self.distinct_buckets("month", filter).await
    }

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM entries e WHERE 1=1 ");
        self.apply_entry_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn list_entries(
        &self,
        filter: &EntryFilter,
        limit: Option<u32>,
    ) -> Result<Vec<EntryRecord>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(ENTRY_COLUMNS);
        qb.push(" FROM entries e WHERE 1=1 ");
        self.apply_entry_filter(&mut qb, filter);
        qb.push(" ORDER BY e.pub_date DESC, e.id DESC ");
        if let Some(limit) = limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        let rows: Vec<EntryRow> = qb
            .build_query_as::<EntryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(EntryRecord::try_from).collect()
    }

    async fn find_by_slug(
        &self,
        language: &LanguageTag,
        slug: &str,
    ) -> Result<Option<EntryRecord>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(ENTRY_COLUMNS);
        qb.push(" FROM entries e WHERE ");
        qb.push(NORMALIZED_LANGUAGE);
        qb.push(" = ");
        qb.push_bind(language.as_str().to_owned());
        qb.push(" AND e.slug = ");
        qb.push_bind(slug.to_owned());

        let row: Option<EntryRow> = qb
            .build_query_as::<EntryRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(EntryRecord::try_from).transpose()
    }

    async fn find_adjacent(
        &self,
        entry: &EntryRecord,
        direction: Adjacency,
        filter: &EntryFilter,
    ) -> Result<EntryRecord, RepoError> {
        let (comparison, ordering) = match direction {
            Adjacency::Previous => ("<", "DESC"),
            Adjacency::Next => (">", "ASC"),
        };

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(ENTRY_COLUMNS);
        qb.push(" FROM entries e WHERE 1=1 ");
        self.apply_entry_filter(&mut qb, filter);
        qb.push(format_args!(" AND (e.pub_date, e.id) {comparison} ("));
        qb.push_bind(entry.pub_date);
        qb.push(", ");
        qb.push_bind(entry.id);
        qb.push(format_args!(
            ") ORDER BY e.pub_date {ordering}, e.id {ordering} LIMIT 1"
        ));

        let row: EntryRow = qb
            .build_query_as::<EntryRow>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        EntryRecord::try_from(row)
    }
}
