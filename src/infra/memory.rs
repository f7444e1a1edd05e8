//! In-process repositories backed by plain vectors.
//!
//! Distinct-date extraction is a group-by on the publication time truncated
//! to the year or month in the archive time zone. Every trait call is counted
//! so callers can observe how many store queries an operation issued.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono_tz::Tz;
use time::Date;
use tracing::trace;
use uuid::Uuid;

use crate::application::repos::{
    Adjacency, AuthorOrder, AuthorOrderField, AuthorsRepo, EntriesRepo, EntryFilter, RepoError,
    TagUsage, TagsRepo,
};
use crate::domain::entities::{AuthorRecord, EntryRecord};
use crate::domain::language::LanguageTag;
use crate::util::lock::recover;
use crate::util::timezone;

const SOURCE: &str = "infra::memory::MemoryRepositories";

#[derive(Default)]
struct MemoryState {
    entries: Vec<EntryRecord>,
    authors: Vec<AuthorRecord>,
}

pub struct MemoryRepositories {
    state: RwLock<MemoryState>,
    timezone: Tz,
    queries: AtomicUsize,
}

impl Default for MemoryRepositories {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl MemoryRepositories {
    pub fn new(timezone: Tz) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            timezone,
            queries: AtomicUsize::new(0),
        }
    }

    /// Inserts `entry`, replacing any entry with the same id.
    pub fn insert_entry(&self, entry: EntryRecord) {
        let mut state = recover(self.state.write(), SOURCE, "insert_entry");
        state.entries.retain(|existing| existing.id != entry.id);
        state.entries.push(entry);
    }

    pub fn remove_entry(&self, id: Uuid) -> bool {
        let mut state = recover(self.state.write(), SOURCE, "remove_entry");
        let before = state.entries.len();
        state.entries.retain(|entry| entry.id != id);
        state.entries.len() != before
    }

    /// Inserts `author`, replacing any author with the same id.
    pub fn insert_author(&self, author: AuthorRecord) {
        let mut state = recover(self.state.write(), SOURCE, "insert_author");
        state.authors.retain(|existing| existing.id != author.id);
        state.authors.push(author);
    }

    /// Number of repository queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn record_query(&self, op: &'static str) {
        let total = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(target = SOURCE, op, total, "Serving in-memory query");
    }

    fn matching(&self, filter: &EntryFilter) -> Vec<EntryRecord> {
        let state = recover(self.state.read(), SOURCE, "matching");
        state
            .entries
            .iter()
            .filter(|entry| {
                filter.matches(entry, timezone::localized_date(entry.pub_date, self.timezone))
            })
            .cloned()
            .collect()
    }

    fn buckets(
        &self,
        filter: &EntryFilter,
        bucket: fn(time::OffsetDateTime, Tz) -> Date,
    ) -> Vec<Date> {
        self.matching(filter)
            .iter()
            .map(|entry| bucket(entry.pub_date, self.timezone))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn compare_authors(order: AuthorOrder, left: &AuthorRecord, right: &AuthorRecord) -> CmpOrdering {
    let by_field = match order.field {
        AuthorOrderField::Username => left.username.cmp(&right.username),
        AuthorOrderField::FirstName => left.first_name.cmp(&right.first_name),
        AuthorOrderField::LastName => left.last_name.cmp(&right.last_name),
        AuthorOrderField::Email => left.email.cmp(&right.email),
        AuthorOrderField::DateJoined => left.date_joined.cmp(&right.date_joined),
    };
    let by_field = if order.descending {
        by_field.reverse()
    } else {
        by_field
    };
    by_field.then_with(|| left.id.cmp(&right.id))
}

#[async_trait]
impl EntriesRepo for MemoryRepositories {
    async fn distinct_years(&self, filter: &EntryFilter) -> Result<Vec<Date>, RepoError> {
        self.record_query("distinct_years");
        Ok(self.buckets(filter, timezone::year_bucket))
    }

    async fn distinct_months(&self, filter: &EntryFilter) -> Result<Vec<Date>, RepoError> {
        self.record_query("distinct_months");
        Ok(self.buckets(filter, timezone::month_bucket))
    }

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64, RepoError> {
        self.record_query("count_entries");
        Ok(self.matching(filter).len() as u64)
    }

    async fn list_entries(
        &self,
        filter: &EntryFilter,
        limit: Option<u32>,
    ) -> Result<Vec<EntryRecord>, RepoError> {
        self.record_query("list_entries");
        let mut entries = self.matching(filter);
        entries.sort_by(|left, right| {
            right
                .pub_date
                .cmp(&left.pub_date)
                .then_with(|| right.id.cmp(&left.id))
        });
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }
        Ok(entries)
    }

    async fn find_by_slug(
        &self,
        language: &LanguageTag,
        slug: &str,
    ) -> Result<Option<EntryRecord>, RepoError> {
        self.record_query("find_by_slug");
        let state = recover(self.state.read(), SOURCE, "find_by_slug");
        Ok(state
            .entries
            .iter()
            .find(|entry| &entry.language == language && entry.slug == slug)
            .cloned())
    }

    async fn find_adjacent(
        &self,
        entry: &EntryRecord,
        direction: Adjacency,
        filter: &EntryFilter,
    ) -> Result<EntryRecord, RepoError> {
        self.record_query("find_adjacent");
        let anchor = (entry.pub_date, entry.id);
        let candidates = self.matching(filter).into_iter();

        let found = match direction {
            Adjacency::Previous => candidates
                .filter(|candidate| (candidate.pub_date, candidate.id) < anchor)
                .max_by_key(|candidate| (candidate.pub_date, candidate.id)),
            Adjacency::Next => candidates
                .filter(|candidate| (candidate.pub_date, candidate.id) > anchor)
                .min_by_key(|candidate| (candidate.pub_date, candidate.id)),
        };

        found.ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TagsRepo for MemoryRepositories {
    async fn usage_counts(&self, filter: &EntryFilter) -> Result<Vec<TagUsage>, RepoError> {
        self.record_query("usage_counts");
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for entry in self.matching(filter) {
            let distinct: BTreeSet<String> = entry.tags.into_iter().collect();
            for name in distinct {
                *counts.entry(name).or_insert(0) += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(name, count)| TagUsage { name, count })
            .collect())
    }
}

#[async_trait]
impl AuthorsRepo for MemoryRepositories {
    async fn list_authors(
        &self,
        filter: &EntryFilter,
        order: AuthorOrder,
    ) -> Result<Vec<AuthorRecord>, RepoError> {
        self.record_query("list_authors");
        let author_ids: HashSet<Uuid> = self
            .matching(filter)
            .iter()
            .map(|entry| entry.author_id)
            .collect();

        let state = recover(self.state.read(), SOURCE, "list_authors");
        let mut authors: Vec<AuthorRecord> = state
            .authors
            .iter()
            .filter(|author| author_ids.contains(&author.id))
            .cloned()
            .collect();
        authors.sort_by(|left, right| compare_authors(order, left, right));
        Ok(authors)
    }
}
