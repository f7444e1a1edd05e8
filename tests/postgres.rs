//! Repository queries against a real Postgres database.
//!
//! Run with `DATABASE_URL` pointing at a server the tests may create
//! databases on, and `--ignored`.

use std::sync::Arc;

use blogtags::application::archive::ArchiveService;
use blogtags::application::repos::{
    Adjacency, AuthorOrder, AuthorsRepo, EntriesRepo, EntryFilter, RepoError, TagsRepo,
};
use blogtags::cache::{CacheConfig, MemoryCache};
use blogtags::domain::archive::MonthLinks;
use blogtags::domain::language::LanguageTag;
use blogtags::infra::db::PostgresRepositories;
use blogtags::util::clock::ManualClock;
use chrono_tz::Tz;
use sqlx::PgPool;
use time::macros::{date, datetime};
use time::{Month, OffsetDateTime};
use uuid::Uuid;

const NOW: OffsetDateTime = datetime!(2022-01-01 00:00 UTC);

fn en() -> LanguageTag {
    LanguageTag::parse("en").expect("valid tag")
}

async fn insert_author(pool: &PgPool, username: &str, last_name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO authors (id, username, first_name, last_name, email) \
         VALUES ($1, $2, '', $3, '')",
    )
    .bind(id)
    .bind(username)
    .bind(last_name)
    .execute(pool)
    .await
    .expect("insert author");
    id
}

async fn insert_entry(
    pool: &PgPool,
    author_id: Uuid,
    slug: &str,
    language: &str,
    is_published: bool,
    pub_date: OffsetDateTime,
    tags: &[&str],
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO entries (id, slug, title, language, author_id, is_published, pub_date) \
         VALUES ($1, $2, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(slug)
    .bind(language)
    .bind(author_id)
    .bind(is_published)
    .bind(pub_date)
    .execute(pool)
    .await
    .expect("insert entry");

    for name in tags {
        sqlx::query(
            "INSERT INTO tags (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(*name)
        .execute(pool)
        .await
        .expect("insert tag");
        sqlx::query(
            "INSERT INTO entry_tags (entry_id, tag_id) SELECT $1, id FROM tags WHERE name = $2",
        )
        .bind(id)
        .bind(*name)
        .execute(pool)
        .await
        .expect("link tag");
    }

    id
}

async fn seed(pool: &PgPool) {
    let ada = insert_author(pool, "ada", "Lovelace").await;
    let grace = insert_author(pool, "grace", "Hopper").await;

    let rows: [(Uuid, &str, &str, bool, OffsetDateTime, &[&str]); 6] = [
        (ada, "first", "en", true, datetime!(2021-03-05 10:00 UTC), &["rust"]),
        (grace, "second", "en", true, datetime!(2021-03-20 10:00 UTC), &["rust", "db"]),
        (ada, "third", "en", true, datetime!(2021-07-01 10:00 UTC), &[]),
        (grace, "draft", "en", false, datetime!(2021-08-01 10:00 UTC), &["draft"]),
        (grace, "later", "en", true, datetime!(2022-02-01 10:00 UTC), &[]),
        (ada, "bonjour", "fr", true, datetime!(2020-05-01 10:00 UTC), &[]),
    ];
    for (author_id, slug, language, published, pub_date, tags) in rows {
        insert_entry(pool, author_id, slug, language, published, pub_date, tags).await;
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn distinct_dates_and_counts(pool: PgPool) {
    seed(&pool).await;
    let repos = PostgresRepositories::new(pool, Tz::UTC);
    let published = EntryFilter::published(en(), NOW);

    let years = repos.distinct_years(&published).await.expect("years");
    assert_eq!(years, vec![date!(2021 - 01 - 01)]);

    let months = repos
        .distinct_months(&published.clone().in_year(2021))
        .await
        .expect("months");
    assert_eq!(months, vec![date!(2021 - 03 - 01), date!(2021 - 07 - 01)]);

    let march = published.clone().in_year(2021).in_month(Month::March);
    assert_eq!(repos.count_entries(&march).await.expect("count"), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn buckets_follow_the_archive_time_zone(pool: PgPool) {
    let ada = insert_author(&pool, "ada", "Lovelace").await;
    insert_entry(&pool, ada, "nye", "en", true, datetime!(2020-12-31 20:00 UTC), &[]).await;

    let repos = PostgresRepositories::new(pool, chrono_tz::Asia::Tokyo);
    let published = EntryFilter::published(en(), NOW);

    let years = repos.distinct_years(&published).await.expect("years");
    assert_eq!(years, vec![date!(2021 - 01 - 01)]);
    assert_eq!(
        repos
            .count_entries(&published.in_year(2021).in_month(Month::January))
            .await
            .expect("count"),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn adjacent_entries_and_not_found(pool: PgPool) {
    seed(&pool).await;
    let repos = PostgresRepositories::new(pool, Tz::UTC);
    let published = EntryFilter::published(en(), NOW);

    let second = repos
        .find_by_slug(&en(), "second")
        .await
        .expect("lookup")
        .expect("entry present");
    assert_eq!(second.tags, vec!["db".to_string(), "rust".to_string()]);

    let previous = repos
        .find_adjacent(&second, Adjacency::Previous, &published)
        .await
        .expect("previous");
    assert_eq!(previous.slug, "first");

    let third = repos
        .find_adjacent(&second, Adjacency::Next, &published)
        .await
        .expect("next");
    let missing = repos
        .find_adjacent(&third, Adjacency::Next, &published)
        .await;
    assert!(matches!(missing, Err(RepoError::NotFound)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn tags_authors_and_recent(pool: PgPool) {
    seed(&pool).await;
    let repos = PostgresRepositories::new(pool, Tz::UTC);
    let published = EntryFilter::published(en(), NOW);

    let usage = repos.usage_counts(&published).await.expect("tags");
    let usage: Vec<(&str, u64)> = usage.iter().map(|t| (t.name.as_str(), t.count)).collect();
    assert_eq!(usage, vec![("db", 1), ("rust", 2)]);

    let order: AuthorOrder = "-last_name".parse().expect("order");
    let authors = repos.list_authors(&published, order).await.expect("authors");
    let names: Vec<&str> = authors.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(names, vec!["ada", "grace"]);

    let recent = repos.list_entries(&published, Some(2)).await.expect("recent");
    let slugs: Vec<&str> = recent.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["third", "second"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn archive_service_over_postgres(pool: PgPool) {
    seed(&pool).await;
    let repos = Arc::new(PostgresRepositories::new(pool, Tz::UTC));
    let clock = Arc::new(ManualClock::new(NOW));
    let config = CacheConfig::default();
    let cache: Arc<MemoryCache<Arc<MonthLinks>>> =
        Arc::new(MemoryCache::new(&config, clock.clone()));
    let service = ArchiveService::new(repos, cache, clock, &config);

    let links = service.get_month_links(&en()).await.expect("month links");
    let again = service.get_month_links(&en()).await.expect("month links");

    assert!(Arc::ptr_eq(&links, &again));
    assert_eq!(links.years.len(), 1);
    let counts: Vec<u64> = links.years[0]
        .months
        .iter()
        .map(|month| month.post_count)
        .collect();
    assert_eq!(counts, vec![2, 1]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stored_language_spellings_match_the_normalized_tag(pool: PgPool) {
    let ada = insert_author(&pool, "ada", "Lovelace").await;
    let rows: [(&str, &str, OffsetDateTime, &[&str]); 2] = [
        ("cheerio", "en_GB", datetime!(2021-03-05 10:00 UTC), &["tea"]),
        ("colour", "EN-gb", datetime!(2021-03-20 10:00 UTC), &[]),
    ];
    for (slug, language, pub_date, tags) in rows {
        insert_entry(&pool, ada, slug, language, true, pub_date, tags).await;
    }

    let duplicate = sqlx::query(
        "INSERT INTO entries (id, slug, title, language, author_id, pub_date) \
         VALUES ($1, 'colour', 'colour', 'en-GB', $2, now())",
    )
    .bind(Uuid::new_v4())
    .bind(ada)
    .execute(&pool)
    .await;
    assert!(duplicate.is_err());

    let repos = PostgresRepositories::new(pool, Tz::UTC);
    let en_gb = LanguageTag::parse("en-gb").expect("valid tag");
    let published = EntryFilter::published(en_gb.clone(), NOW);

    assert_eq!(
        repos.distinct_years(&published).await.expect("years"),
        vec![date!(2021 - 01 - 01)]
    );
    assert_eq!(repos.count_entries(&published).await.expect("count"), 2);

    let usage = repos.usage_counts(&published).await.expect("tags");
    assert_eq!(usage.len(), 1);

    let found = repos
        .find_by_slug(&en_gb, "cheerio")
        .await
        .expect("lookup")
        .expect("entry present");
    assert_eq!(found.language, en_gb);
}
