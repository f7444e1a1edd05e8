//! Authors who have published in a language.

use std::sync::Arc;

use crate::application::error::BlogError;
use crate::application::repos::{AuthorOrder, AuthorsRepo, EntryFilter};
use crate::domain::entities::AuthorRecord;
use crate::domain::language::LanguageTag;
use crate::util::clock::Clock;

#[derive(Clone)]
pub struct AuthorLinksService {
    authors: Arc<dyn AuthorsRepo>,
    clock: Arc<dyn Clock>,
}

impl AuthorLinksService {
    pub fn new(authors: Arc<dyn AuthorsRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { authors, clock }
    }

    /// Distinct authors of published entries, sorted by `order_by`
    /// (`username`, `first_name`, `last_name`, `email` or `date_joined`,
    /// prefixed with `-` for descending).
    pub async fn author_links(
        &self,
        language: &LanguageTag,
        order_by: &str,
    ) -> Result<Vec<AuthorRecord>, BlogError> {
        let order: AuthorOrder = order_by.parse()?;
        let published = EntryFilter::published(language.clone(), self.clock.now());
        Ok(self.authors.list_authors(&published, order).await?)
    }
}
