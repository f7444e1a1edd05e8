//! Previous/next links between published entries of one language.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::application::error::BlogError;
use crate::application::repos::{Adjacency, EntriesRepo, EntryFilter, RepoError};
use crate::domain::entities::EntryRecord;
use crate::domain::language::LanguageTag;
use crate::util::clock::Clock;

const SOURCE: &str = "application::navigation::NavigationService";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogNav {
    pub previous: Option<EntryRecord>,
    pub next: Option<EntryRecord>,
}

#[derive(Clone)]
pub struct NavigationService {
    entries: Arc<dyn EntriesRepo>,
    clock: Arc<dyn Clock>,
}

impl NavigationService {
    pub fn new(entries: Arc<dyn EntriesRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { entries, clock }
    }

    pub async fn entry_by_slug(
        &self,
        language: &LanguageTag,
        slug: &str,
    ) -> Result<EntryRecord, BlogError> {
        self.entries
            .find_by_slug(language, slug)
            .await?
            .ok_or_else(|| BlogError::unknown_entry(slug, language.as_str()))
    }

    /// Neighbors of `entry` among the published entries of `language`.
    pub async fn blog_nav(
        &self,
        entry: &EntryRecord,
        language: &LanguageTag,
    ) -> Result<BlogNav, BlogError> {
        let published = EntryFilter::published(language.clone(), self.clock.now());

        let previous = self.neighbor(entry, Adjacency::Previous, &published).await?;
        let next = self.neighbor(entry, Adjacency::Next, &published).await?;

        debug!(
            target = SOURCE,
            slug = %entry.slug,
            %language,
            has_previous = previous.is_some(),
            has_next = next.is_some(),
            "Resolved entry navigation"
        );

        Ok(BlogNav { previous, next })
    }

    async fn neighbor(
        &self,
        entry: &EntryRecord,
        direction: Adjacency,
        filter: &EntryFilter,
    ) -> Result<Option<EntryRecord>, RepoError> {
        match self.entries.find_adjacent(entry, direction, filter).await {
            Ok(found) => Ok(Some(found)),
            Err(RepoError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use time::macros::datetime;
    use uuid::Uuid;

    use crate::infra::memory::MemoryRepositories;
    use crate::util::clock::ManualClock;

    use super::*;

    fn tag(value: &str) -> LanguageTag {
        LanguageTag::parse(value).expect("valid tag")
    }

    fn entry(
        slug: &str,
        language: &str,
        published: bool,
        pub_date: OffsetDateTime,
    ) -> EntryRecord {
        EntryRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            excerpt: String::new(),
            language: tag(language),
            author_id: Uuid::nil(),
            is_published: published,
            pub_date,
            tags: Vec::new(),
            created_at: pub_date,
            updated_at: pub_date,
        }
    }

    fn service(repos: Arc<MemoryRepositories>) -> NavigationService {
        let clock = Arc::new(ManualClock::new(datetime!(2021-12-01 00:00 UTC)));
        NavigationService::new(repos, clock)
    }

    #[tokio::test]
    async fn skips_hidden_and_foreign_neighbors() {
        let repos = Arc::new(MemoryRepositories::default());
        let first = entry("first", "en", true, datetime!(2021-01-01 00:00 UTC));
        let middle = entry("middle", "en", true, datetime!(2021-02-01 00:00 UTC));
        repos.insert_entry(first.clone());
        repos.insert_entry(middle.clone());
        repos.insert_entry(entry("draft", "en", false, datetime!(2021-03-01 00:00 UTC)));
        repos.insert_entry(entry("french", "fr", true, datetime!(2021-03-15 00:00 UTC)));
        repos.insert_entry(entry("future", "en", true, datetime!(2022-01-01 00:00 UTC)));

        let nav = service(repos)
            .blog_nav(&middle, &tag("en"))
            .await
            .expect("navigation");

        assert_eq!(nav.previous.map(|found| found.slug), Some("first".to_string()));
        assert_eq!(nav.next, None);
    }

    #[tokio::test]
    async fn equal_dates_are_ordered_by_id() {
        let repos = Arc::new(MemoryRepositories::default());
        let stamp = datetime!(2021-05-01 00:00 UTC);
        let mut low = entry("low", "en", true, stamp);
        let mut high = entry("high", "en", true, stamp);
        low.id = Uuid::from_u128(1);
        high.id = Uuid::from_u128(2);
        repos.insert_entry(low.clone());
        repos.insert_entry(high.clone());

        let nav = service(repos)
            .blog_nav(&low, &tag("en"))
            .await
            .expect("navigation");

        assert_eq!(nav.previous, None);
        assert_eq!(nav.next.map(|found| found.slug), Some("high".to_string()));
    }

    #[tokio::test]
    async fn unknown_slug_is_reported() {
        let repos = Arc::new(MemoryRepositories::default());

        let err = service(repos)
            .entry_by_slug(&tag("en"), "missing")
            .await
            .expect_err("missing entry");

        assert!(matches!(err, BlogError::UnknownEntry { ref slug, .. } if slug == "missing"));
    }
}
