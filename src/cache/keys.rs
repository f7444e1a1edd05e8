//! Cache key derivation.

use crate::domain::language::LanguageTag;

pub const ARCHIVE_KEY_PREFIX: &str = "blog_pub_dates_";

/// Key of the month archive for `language`.
pub fn archive_key(language: &LanguageTag) -> String {
    format!("{ARCHIVE_KEY_PREFIX}{language}")
}
