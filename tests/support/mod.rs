#![allow(dead_code)]

use std::sync::Arc;

use blogtags::application::archive::ArchiveService;
use blogtags::cache::{CacheConfig, MemoryCache};
use blogtags::domain::archive::MonthLinks;
use blogtags::domain::entities::{AuthorRecord, EntryRecord};
use blogtags::domain::language::LanguageTag;
use blogtags::infra::memory::MemoryRepositories;
use blogtags::util::clock::ManualClock;
use time::OffsetDateTime;
use time::macros::datetime;
use uuid::Uuid;

pub const NOW: OffsetDateTime = datetime!(2022-01-01 00:00 UTC);

pub fn tag(value: &str) -> LanguageTag {
    LanguageTag::parse(value).expect("valid language tag")
}

pub fn entry(slug: &str, language: &str, pub_date: OffsetDateTime) -> EntryRecord {
    EntryRecord {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: slug.replace('-', " "),
        excerpt: String::new(),
        language: tag(language),
        author_id: Uuid::nil(),
        is_published: true,
        pub_date,
        tags: Vec::new(),
        created_at: pub_date,
        updated_at: pub_date,
    }
}

pub fn draft(slug: &str, language: &str, pub_date: OffsetDateTime) -> EntryRecord {
    EntryRecord {
        is_published: false,
        ..entry(slug, language, pub_date)
    }
}

pub fn author(username: &str, first_name: &str, last_name: &str) -> AuthorRecord {
    AuthorRecord {
        id: Uuid::new_v4(),
        username: username.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{username}@example.com"),
        date_joined: datetime!(2020-01-01 00:00 UTC),
    }
}

pub struct ArchiveFixture {
    pub repos: Arc<MemoryRepositories>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<MemoryCache<Arc<MonthLinks>>>,
    pub service: ArchiveService,
}

impl ArchiveFixture {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let repos = Arc::new(MemoryRepositories::default());
        let clock = Arc::new(ManualClock::new(NOW));
        let cache = Arc::new(MemoryCache::new(&config, clock.clone()));
        let service = ArchiveService::new(repos.clone(), cache.clone(), clock.clone(), &config);

        Self {
            repos,
            clock,
            cache,
            service,
        }
    }

    /// `(year, [(month, count)])` pairs, for compact assertions.
    pub async fn summary(&self, language: &str) -> Vec<(i32, Vec<(time::Month, u64)>)> {
        let links = self
            .service
            .get_month_links(&tag(language))
            .await
            .expect("month links");
        summarize(&links)
    }
}

pub fn summarize(links: &MonthLinks) -> Vec<(i32, Vec<(time::Month, u64)>)> {
    links
        .years
        .iter()
        .map(|year| {
            (
                year.year.year(),
                year.months
                    .iter()
                    .map(|month| (month.month.month(), month.post_count))
                    .collect(),
            )
        })
        .collect()
}
