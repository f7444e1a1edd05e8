//! Tag cloud data for published entries of one language.

use std::sync::Arc;

use crate::application::error::BlogError;
use crate::application::repos::{EntryFilter, TagUsage, TagsRepo};
use crate::domain::language::LanguageTag;
use crate::util::clock::Clock;

#[derive(Clone)]
pub struct TagLinksService {
    tags: Arc<dyn TagsRepo>,
    clock: Arc<dyn Clock>,
}

impl TagLinksService {
    pub fn new(tags: Arc<dyn TagsRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { tags, clock }
    }

    /// Tags with the number of published entries using each, ordered by name.
    pub async fn tag_links(&self, language: &LanguageTag) -> Result<Vec<TagUsage>, BlogError> {
        let published = EntryFilter::published(language.clone(), self.clock.now());
        Ok(self.tags.usage_counts(&published).await?)
    }
}
