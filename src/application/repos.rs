//! Repository traits describing the entry, tag and author stores.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::{Date, Month, OffsetDateTime};

use crate::domain::entities::{AuthorRecord, EntryRecord};
use crate::domain::language::LanguageTag;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

/// Which entries a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryScope {
    /// Published flag set and publication time at or before `now`.
    Published { now: OffsetDateTime },
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    pub scope: EntryScope,
    pub language: LanguageTag,
    pub year: Option<i32>,
    pub month: Option<Month>,
}

impl EntryFilter {
    pub fn published(language: LanguageTag, now: OffsetDateTime) -> Self {
        Self {
            scope: EntryScope::Published { now },
            language,
            year: None,
            month: None,
        }
    }

    pub fn in_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn in_month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    /// Evaluates the filter against a single entry. Year and month are
    /// compared against the bucket date already localized by the caller.
    pub fn matches(&self, entry: &EntryRecord, local_date: Date) -> bool {
        if entry.language != self.language {
            return false;
        }
        if let EntryScope::Published { now } = self.scope {
            if !entry.is_visible_at(now) {
                return false;
            }
        }
        if self.year.is_some_and(|year| local_date.year() != year) {
            return false;
        }
        if self.month.is_some_and(|month| local_date.month() != month) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorOrderField {
    Username,
    FirstName,
    LastName,
    Email,
    DateJoined,
}

impl AuthorOrderField {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthorOrderField::Username => "username",
            AuthorOrderField::FirstName => "first_name",
            AuthorOrderField::LastName => "last_name",
            AuthorOrderField::Email => "email",
            AuthorOrderField::DateJoined => "date_joined",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("cannot order authors by `{0}`")]
pub struct InvalidAuthorOrder(pub String);

/// Author list ordering, written `field` or `-field` for descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorOrder {
    pub field: AuthorOrderField,
    pub descending: bool,
}

impl Default for AuthorOrder {
    fn default() -> Self {
        Self {
            field: AuthorOrderField::Username,
            descending: false,
        }
    }
}

impl FromStr for AuthorOrder {
    type Err = InvalidAuthorOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (descending, name) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let field = match name {
            "username" => AuthorOrderField::Username,
            "first_name" => AuthorOrderField::FirstName,
            "last_name" => AuthorOrderField::LastName,
            "email" => AuthorOrderField::Email,
            "date_joined" => AuthorOrderField::DateJoined,
            _ => return Err(InvalidAuthorOrder(value.to_string())),
        };

        Ok(Self { field, descending })
    }
}

impl fmt::Display for AuthorOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(self.field.as_str())
    }
}

#[async_trait]
pub trait EntriesRepo: Send + Sync {
    /// January 1st of every year with a matching entry, ascending.
    async fn distinct_years(&self, filter: &EntryFilter) -> Result<Vec<Date>, RepoError>;

    /// First day of every month with a matching entry, ascending.
    async fn distinct_months(&self, filter: &EntryFilter) -> Result<Vec<Date>, RepoError>;

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64, RepoError>;

    /// Matching entries, newest publication first.
    async fn list_entries(
        &self,
        filter: &EntryFilter,
        limit: Option<u32>,
    ) -> Result<Vec<EntryRecord>, RepoError>;

    async fn find_by_slug(
        &self,
        language: &LanguageTag,
        slug: &str,
    ) -> Result<Option<EntryRecord>, RepoError>;

    /// Nearest matching entry before or after `entry` by publication time,
    /// ties broken by id. Absence is reported as [`RepoError::NotFound`].
    async fn find_adjacent(
        &self,
        entry: &EntryRecord,
        direction: Adjacency,
        filter: &EntryFilter,
    ) -> Result<EntryRecord, RepoError>;
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    /// Tags attached to matching entries with usage counts, ordered by name.
    async fn usage_counts(&self, filter: &EntryFilter) -> Result<Vec<TagUsage>, RepoError>;
}

#[async_trait]
pub trait AuthorsRepo: Send + Sync {
    /// Distinct authors of matching entries.
    async fn list_authors(
        &self,
        filter: &EntryFilter,
        order: AuthorOrder,
    ) -> Result<Vec<AuthorRecord>, RepoError>;
}
