//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::language::LanguageTag;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub language: LanguageTag,
    pub author_id: Uuid,
    pub is_published: bool,
    pub pub_date: OffsetDateTime,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl EntryRecord {
    /// Published flag set and publication time already reached.
    pub fn is_visible_at(&self, now: OffsetDateTime) -> bool {
        self.is_published && self.pub_date <= now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRecord {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_joined: OffsetDateTime,
}

impl AuthorRecord {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
