use askama::Error as AskamaError;
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;

use crate::application::navigation::BlogNav;
use crate::application::repos::TagUsage;
use crate::domain::archive::{
    MonthLinks, format_human_date, month_key_for, month_label_for, month_name_for, year_key_for,
};
use crate::domain::entities::{AuthorRecord, EntryRecord};
use crate::domain::language::LanguageTag;
use crate::util::timezone;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(public_message: &'static str, error: AskamaError) -> Self {
        Self {
            public_message,
            error,
        }
    }
}

/// Blog URL paths, all under `/{language}/blog/`.
///
/// Free-text segments are percent-encoded so every path stays one segment deep.
pub mod paths {
    use time::Date;
    use urlencoding::encode;

    use crate::domain::language::LanguageTag;

    pub fn year(language: &LanguageTag, year: Date) -> String {
        format!("/{language}/blog/{}/", year.year())
    }

    pub fn month(language: &LanguageTag, month: Date) -> String {
        format!(
            "/{language}/blog/{}/{:02}/",
            month.year(),
            u8::from(month.month())
        )
    }

    pub fn entry(language: &LanguageTag, day: Date, slug: &str) -> String {
        format!(
            "/{language}/blog/{}/{:02}/{:02}/{}/",
            day.year(),
            u8::from(day.month()),
            day.day(),
            encode(slug)
        )
    }

    pub fn tag(language: &LanguageTag, name: &str) -> String {
        format!("/{language}/blog/tagged/{}/", encode(name))
    }

    pub fn author(language: &LanguageTag, username: &str) -> String {
        format!("/{language}/blog/author/{}/", encode(username))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthLinkView {
    pub key: String,
    pub name: String,
    pub label: String,
    pub path: String,
    pub post_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearLinksView {
    pub key: String,
    pub path: String,
    pub post_count: u64,
    pub months: Vec<MonthLinkView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthLinksView {
    pub language: String,
    pub post_count: u64,
    pub years: Vec<YearLinksView>,
}

impl MonthLinksView {
    pub fn new(language: &LanguageTag, links: &MonthLinks) -> Self {
        let years = links
            .years
            .iter()
            .map(|year| YearLinksView {
                key: year_key_for(year.year),
                path: paths::year(language, year.year),
                post_count: year.post_count(),
                months: year
                    .months
                    .iter()
                    .map(|month| MonthLinkView {
                        key: month_key_for(month.month),
                        name: month_name_for(month.month),
                        label: month_label_for(month.month),
                        path: paths::month(language, month.month),
                        post_count: month.post_count,
                    })
                    .collect(),
            })
            .collect();

        Self {
            language: language.to_string(),
            post_count: links.post_count(),
            years,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryLinkView {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub path: String,
    pub iso_date: String,
    pub published: String,
    pub tags: Vec<String>,
}

impl EntryLinkView {
    /// The calendar day in paths and labels is taken in `timezone`.
    pub fn new(entry: &EntryRecord, timezone: Tz) -> Self {
        let day = timezone::localized_date(entry.pub_date, timezone);
        Self {
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            excerpt: entry.excerpt.clone(),
            path: paths::entry(&entry.language, day, &entry.slug),
            iso_date: entry
                .pub_date
                .format(&Rfc3339)
                .unwrap_or_else(|_| entry.pub_date.to_string()),
            published: format_human_date(day),
            tags: entry.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogNavView {
    pub previous: Option<EntryLinkView>,
    pub next: Option<EntryLinkView>,
}

impl BlogNavView {
    pub fn new(nav: &BlogNav, timezone: Tz) -> Self {
        Self {
            previous: nav
                .previous
                .as_ref()
                .map(|entry| EntryLinkView::new(entry, timezone)),
            next: nav
                .next
                .as_ref()
                .map(|entry| EntryLinkView::new(entry, timezone)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagLinkView {
    pub name: String,
    pub path: String,
    pub count: u64,
}

pub fn build_tag_links(language: &LanguageTag, tags: &[TagUsage]) -> Vec<TagLinkView> {
    tags.iter()
        .map(|usage| TagLinkView {
            name: usage.name.clone(),
            path: paths::tag(language, &usage.name),
            count: usage.count,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorLinkView {
    pub username: String,
    pub display_name: String,
    pub path: String,
}

pub fn build_author_links(language: &LanguageTag, authors: &[AuthorRecord]) -> Vec<AuthorLinkView> {
    authors
        .iter()
        .map(|author| AuthorLinkView {
            username: author.username.clone(),
            display_name: author.display_name(),
            path: paths::author(language, &author.username),
        })
        .collect()
}

pub fn build_entry_links(entries: &[EntryRecord], timezone: Tz) -> Vec<EntryLinkView> {
    entries
        .iter()
        .map(|entry| EntryLinkView::new(entry, timezone))
        .collect()
}
