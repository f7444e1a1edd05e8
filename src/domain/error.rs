use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid language tag `{value}`: {reason}")]
    InvalidLanguageTag { value: String, reason: &'static str },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn invalid_language_tag(value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidLanguageTag {
            value: value.into(),
            reason,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
