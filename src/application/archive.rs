//! Month/year archive of published entries, cached per language.

use std::sync::Arc;

use time::Duration;
use tracing::debug;

use crate::application::error::BlogError;
use crate::application::repos::{EntriesRepo, EntryFilter, RepoError};
use crate::cache::{Cache, CacheConfig, archive_key};
use crate::domain::archive::{ArchiveMonth, ArchiveYear, MonthLinks};
use crate::domain::language::LanguageTag;
use crate::util::clock::Clock;

const SOURCE: &str = "application::archive::ArchiveService";

pub type ArchiveCache = dyn Cache<Arc<MonthLinks>>;

#[derive(Clone)]
pub struct ArchiveService {
    entries: Arc<dyn EntriesRepo>,
    cache: Arc<ArchiveCache>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    caching: bool,
}

impl ArchiveService {
    pub fn new(
        entries: Arc<dyn EntriesRepo>,
        cache: Arc<ArchiveCache>,
        clock: Arc<dyn Clock>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            entries,
            cache,
            clock,
            ttl: config.archive_ttl(),
            caching: config.enabled,
        }
    }

    /// Years and months with published entries in `language`, with the number
    /// of entries per month.
    ///
    /// A cached archive is returned as-is until it expires; entry edits are not
    /// reflected before then. Concurrent misses may both recompute, the last
    /// write wins.
    pub async fn get_month_links(
        &self,
        language: &LanguageTag,
    ) -> Result<Arc<MonthLinks>, BlogError> {
        let key = archive_key(language);

        if self.caching {
            if let Some(cached) = self.cache.get(&key) {
                debug!(target = SOURCE, %language, "Serving cached month links");
                return Ok(cached);
            }
        }

        let links = Arc::new(self.collect(language).await?);
        debug!(
            target = SOURCE,
            %language,
            years = links.years.len(),
            posts = links.post_count(),
            "Recomputed month links"
        );

        if self.caching {
            self.cache.set(key, Arc::clone(&links), self.ttl);
        }

        Ok(links)
    }

    async fn collect(&self, language: &LanguageTag) -> Result<MonthLinks, RepoError> {
        let published = EntryFilter::published(language.clone(), self.clock.now());

        let year_dates = self.entries.distinct_years(&published).await?;
        let mut years = Vec::with_capacity(year_dates.len());

        for year in year_dates {
            let in_year = published.clone().in_year(year.year());
            let month_dates = self.entries.distinct_months(&in_year).await?;
            let mut months = Vec::with_capacity(month_dates.len());

            for month in month_dates {
                let in_month = in_year.clone().in_month(month.month());
                let post_count = self.entries.count_entries(&in_month).await?;
                months.push(ArchiveMonth { month, post_count });
            }

            years.push(ArchiveYear { year, months });
        }

        Ok(MonthLinks { years })
    }
}
