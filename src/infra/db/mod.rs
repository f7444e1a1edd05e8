//! Postgres-backed repository implementations.

mod authors;
mod entries;
mod tags;
mod timezone;
mod util;

pub use timezone::SqlTimeZone;
pub use util::map_sqlx_error;

use std::sync::Arc;

use chrono_tz::Tz;
use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
};

use crate::application::repos::{EntryFilter, EntryScope, RepoError};

/// Columns selected for an entry, tags aggregated in name order.
const ENTRY_COLUMNS: &str = "e.id, e.slug, e.title, e.excerpt, e.language, e.author_id, \
     e.is_published, e.pub_date, e.created_at, e.updated_at, \
     ARRAY(SELECT t.name FROM entry_tags et INNER JOIN tags t ON t.id = et.tag_id \
           WHERE et.entry_id = e.id ORDER BY t.name) AS tags";

/// `e.language` folded the way `LanguageTag::parse` folds it, so rows stored
/// as `en_GB` or `EN-gb` match the tag `en-gb`.
const NORMALIZED_LANGUAGE: &str = "lower(replace(btrim(e.language), '_', '-'))";

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
    archive_timezone: SqlTimeZone,
}

impl PostgresRepositories {
    /// Year and month buckets are computed on the wall clock of
    /// `archive_timezone`.
    pub fn new(pool: PgPool, archive_timezone: Tz) -> Self {
        Self {
            pool: Arc::new(pool),
            archive_timezone: SqlTimeZone(archive_timezone),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    /// Pushes `e.pub_date` converted to the archive time zone.
    fn push_local_time_expr(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("(e.pub_date AT TIME ZONE ");
        qb.push_bind(self.archive_timezone);
        qb.push(")");
    }

    /// Appends ` AND ...` conditions for `filter` to a query over `entries e`.
    fn apply_entry_filter(&self, qb: &mut QueryBuilder<'_, Postgres>, filter: &EntryFilter) {
        qb.push(" AND ");
        qb.push(NORMALIZED_LANGUAGE);
        qb.push(" = ");
        qb.push_bind(filter.language.as_str().to_owned());

        match filter.scope {
            EntryScope::Published { now } => {
                qb.push(" AND e.is_published AND e.pub_date <= ");
                qb.push_bind(now);
            }
            EntryScope::All => {}
        }

        if let Some(year) = filter.year {
            qb.push(" AND EXTRACT(YEAR FROM ");
            self.push_local_time_expr(qb);
            qb.push(")::int = ");
            qb.push_bind(year);
        }

        if let Some(month) = filter.month {
            qb.push(" AND EXTRACT(MONTH FROM ");
            self.push_local_time_expr(qb);
            qb.push(")::int = ");
            qb.push_bind(i32::from(u8::from(month)));
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}
