use thiserror::Error;

use crate::application::repos::{InvalidAuthorOrder, RepoError};
use crate::config::LoadError;
use crate::infra::error::InfraError;
use crate::presentation::views::TemplateRenderError;

/// Failures surfaced by the template helpers.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("no entry `{slug}` in language `{language}`")]
    UnknownEntry { slug: String, language: String },
    #[error(transparent)]
    InvalidOrder(#[from] InvalidAuthorOrder),
}

impl BlogError {
    pub fn unknown_entry(slug: impl Into<String>, language: impl Into<String>) -> Self {
        Self::UnknownEntry {
            slug: slug.into(),
            language: language.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Blog(#[from] BlogError),
    #[error(transparent)]
    Render(#[from] TemplateRenderError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// The only thing an end user gets to see; details stay in the logs.
    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Blog(BlogError::UnknownEntry { .. }) => "Entry not found",
            AppError::Blog(BlogError::InvalidOrder(_)) => "Request could not be processed",
            AppError::Infra(InfraError::Database { .. }) | AppError::Blog(BlogError::Repo(_)) => {
                "Service temporarily unavailable"
            }
            AppError::Config(_) | AppError::Infra(InfraError::Configuration { .. }) => {
                "Service misconfigured"
            }
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Io(_)) => "I/O failure",
            AppError::Render(_) | AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}
