//! Most recent published entries.

use std::num::NonZeroU32;
use std::sync::Arc;

use crate::application::error::BlogError;
use crate::application::repos::{EntriesRepo, EntryFilter};
use crate::domain::entities::EntryRecord;
use crate::domain::language::LanguageTag;
use crate::util::clock::Clock;

#[derive(Clone)]
pub struct RecentPostsService {
    entries: Arc<dyn EntriesRepo>,
    clock: Arc<dyn Clock>,
    limit: Option<NonZeroU32>,
}

impl RecentPostsService {
    /// `limit` of `None` lists every published entry.
    pub fn new(
        entries: Arc<dyn EntriesRepo>,
        clock: Arc<dyn Clock>,
        limit: Option<NonZeroU32>,
    ) -> Self {
        Self {
            entries,
            clock,
            limit,
        }
    }

    pub async fn last_posts(&self, language: &LanguageTag) -> Result<Vec<EntryRecord>, BlogError> {
        let published = EntryFilter::published(language.clone(), self.clock.now());
        let limit = self.limit.map(NonZeroU32::get);
        Ok(self.entries.list_entries(&published, limit).await?)
    }
}
