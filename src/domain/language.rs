//! Language tags selecting the localized variant of translatable content.
//!
//! Tags are normalized to lowercase with `-` separators, so `en_US`, `en-us`
//! and ` EN-us ` all name the same language.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

const MAX_TAG_LEN: usize = 35;
const MAX_SUBTAG_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_language_tag(value, "tag is empty"));
        }
        if trimmed.len() > MAX_TAG_LEN {
            return Err(DomainError::invalid_language_tag(value, "tag is too long"));
        }

        let normalized: String = trimmed
            .chars()
            .map(|ch| if ch == '_' { '-' } else { ch.to_ascii_lowercase() })
            .collect();

        let well_formed = normalized.split('-').all(|subtag| {
            !subtag.is_empty()
                && subtag.len() <= MAX_SUBTAG_LEN
                && subtag.chars().all(|ch| ch.is_ascii_alphanumeric())
        });
        if !well_formed {
            return Err(DomainError::invalid_language_tag(
                value,
                "subtags must be 1-8 ASCII letters or digits",
            ));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary subtag, `en` for `en-gb`.
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageTag {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageTag> for String {
    fn from(tag: LanguageTag) -> Self {
        tag.0
    }
}
