//! Picks the language a request should be served in.

use tracing::debug;

use crate::domain::language::LanguageTag;

const SOURCE: &str = "application::context::LanguageResolver";

#[derive(Debug, Clone)]
pub struct LanguageResolver {
    default: LanguageTag,
    available: Vec<LanguageTag>,
}

/// One `Accept-Language` range with its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference {
    pub tag: LanguageTag,
    pub weight: f32,
}

impl LanguageResolver {
    /// The default language is always available, even when `available`
    /// leaves it out.
    pub fn new(default: LanguageTag, available: Vec<LanguageTag>) -> Self {
        let mut available = available;
        if !available.contains(&default) {
            available.insert(0, default.clone());
        }
        Self { default, available }
    }

    pub fn default_language(&self) -> &LanguageTag {
        &self.default
    }

    pub fn available(&self) -> &[LanguageTag] {
        &self.available
    }

    /// An explicitly requested available language wins, then the best
    /// `Accept-Language` match, then the default.
    pub fn resolve(&self, explicit: Option<&str>, accept_language: Option<&str>) -> LanguageTag {
        if let Some(requested) = explicit {
            match LanguageTag::parse(requested) {
                Ok(tag) if self.available.contains(&tag) => return tag,
                Ok(tag) => {
                    debug!(target = SOURCE, requested = %tag, "Requested language is not available")
                }
                Err(err) => debug!(target = SOURCE, error = %err, "Ignoring malformed language"),
            }
        }

        if let Some(header) = accept_language {
            for preference in parse_accept_language(header) {
                if let Some(found) = self.best_match(&preference.tag) {
                    return found.clone();
                }
            }
        }

        self.default.clone()
    }

    fn best_match(&self, wanted: &LanguageTag) -> Option<&LanguageTag> {
        self.available
            .iter()
            .find(|candidate| *candidate == wanted)
            .or_else(|| {
                self.available
                    .iter()
                    .find(|candidate| candidate.primary() == wanted.primary())
            })
    }
}

/// Parses an `Accept-Language` header into preferences, highest weight first.
///
/// Ranges with equal weight keep their header order. Wildcards, malformed
/// ranges and ranges weighted zero are dropped.
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference> {
    let mut preferences: Vec<LanguagePreference> = header
        .split(',')
        .filter_map(|range| {
            let mut parts = range.split(';');
            let tag = parts.next()?.trim();
            if tag == "*" {
                return None;
            }
            let tag = LanguageTag::parse(tag).ok()?;

            let mut weight = 1.0_f32;
            for param in parts {
                if let Some(value) = param.trim().strip_prefix("q=") {
                    weight = value.trim().parse::<f32>().ok()?;
                }
            }

            (weight > 0.0 && weight <= 1.0).then_some(LanguagePreference { tag, weight })
        })
        .collect();

    preferences.sort_by(|left, right| right.weight.total_cmp(&left.weight));
    preferences
}
