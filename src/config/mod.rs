//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    num::{NonZeroU32, NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
};

use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::language::LanguageTag;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blogtags";
const ENV_PREFIX: &str = "BLOGTAGS";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_ARCHIVE_TTL_SECS: u64 = 3600;
const DEFAULT_CACHE_CAPACITY: u64 = 64;
const DEFAULT_ARCHIVE_TIMEZONE: &str = "UTC";
const DEFAULT_LANGUAGE: &str = "en";

/// Command-line arguments for the blogtags binary.
#[derive(Debug, Parser)]
#[command(
    name = "blogtags",
    version,
    about = "Blog template helpers: archives, tags, authors, recent posts"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BLOGTAGS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Years and months with published entries and their post counts.
    Archive(HelperArgs),
    /// Previous and next published entries around one entry.
    Nav(NavArgs),
    /// Tags used by published entries with usage counts.
    Tags(HelperArgs),
    /// Authors of published entries.
    Authors(AuthorsArgs),
    /// Most recent published entries.
    Recent(HelperArgs),
    /// Apply database migrations.
    Migrate(MigrateArgs),
}

impl Command {
    pub fn overrides(&self) -> &RuntimeOverrides {
        match self {
            Command::Archive(args) | Command::Tags(args) | Command::Recent(args) => {
                &args.overrides
            }
            Command::Nav(args) => &args.helper.overrides,
            Command::Authors(args) => &args.helper.overrides,
            Command::Migrate(args) => &args.overrides,
        }
    }

    /// Output options shared by the helper commands; `None` for `migrate`.
    pub fn helper(&self) -> Option<&HelperArgs> {
        match self {
            Command::Archive(args) | Command::Tags(args) | Command::Recent(args) => Some(args),
            Command::Nav(args) => Some(&args.helper),
            Command::Authors(args) => Some(&args.helper),
            Command::Migrate(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Html,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RuntimeOverrides {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct HelperArgs {
    #[command(flatten)]
    pub overrides: RuntimeOverrides,

    /// Language to render; must be one of the configured languages.
    #[arg(long, value_name = "TAG")]
    pub language: Option<String>,

    /// An `Accept-Language` header value used when --language is absent.
    #[arg(long = "accept-language", value_name = "HEADER")]
    pub accept_language: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct NavArgs {
    #[command(flatten)]
    pub helper: HelperArgs,

    /// Slug of the entry to navigate from.
    #[arg(long, value_name = "SLUG")]
    pub slug: String,
}

#[derive(Debug, Args, Clone)]
pub struct AuthorsArgs {
    #[command(flatten)]
    pub helper: HelperArgs,

    /// Sort field, prefixed with `-` for descending.
    #[arg(long = "order-by", value_name = "FIELD", default_value = "username")]
    pub order_by: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub overrides: RuntimeOverrides,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub archive: ArchiveSettings,
    pub languages: LanguageSettings,
    pub recent: RecentSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub archive_ttl: NonZeroU64,
    pub capacity: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Zone whose wall clock decides the year and month of an entry.
    pub timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct LanguageSettings {
    pub default: LanguageTag,
    /// Always contains `default`.
    pub available: Vec<LanguageTag>,
}

#[derive(Debug, Clone)]
pub struct RecentSettings {
    /// `None` lists every published entry.
    pub limit: Option<NonZeroU32>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("languages.available")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_runtime_overrides(cli.command.overrides());

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    archive: RawArchiveSettings,
    languages: RawLanguageSettings,
    recent: RawRecentSettings,
}

impl RawSettings {
    fn apply_runtime_overrides(&mut self, overrides: &RuntimeOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            database,
            cache,
            archive,
            languages,
            recent,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
            archive: build_archive_settings(archive)?,
            languages: build_language_settings(languages)?,
            recent: build_recent_settings(recent)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let max_connections = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

    Ok(DatabaseSettings {
        url,
        max_connections: non_zero_u32(max_connections.into(), "database.max_connections")?,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let ttl = cache.archive_ttl_seconds.unwrap_or(DEFAULT_ARCHIVE_TTL_SECS);
    let archive_ttl = NonZeroU64::new(ttl).ok_or_else(|| {
        LoadError::invalid("cache.archive_ttl_seconds", "must be greater than zero")
    })?;
    i64::try_from(ttl).map_err(|_| {
        LoadError::invalid(
            "cache.archive_ttl_seconds",
            "value exceeds supported range for i64",
        )
    })?;

    let capacity_value = cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
    let capacity = usize::try_from(capacity_value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            LoadError::invalid("cache.capacity", "must be between 1 and usize::MAX")
        })?;

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        archive_ttl,
        capacity,
    })
}

fn build_archive_settings(archive: RawArchiveSettings) -> Result<ArchiveSettings, LoadError> {
    let name = archive
        .timezone
        .unwrap_or_else(|| DEFAULT_ARCHIVE_TIMEZONE.to_string());
    let timezone = name.trim().parse::<Tz>().map_err(|err| {
        LoadError::invalid("archive.timezone", format!("unknown zone `{name}`: {err}"))
    })?;

    Ok(ArchiveSettings { timezone })
}

fn build_language_settings(languages: RawLanguageSettings) -> Result<LanguageSettings, LoadError> {
    let default_value = languages
        .default
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let default = LanguageTag::parse(&default_value)
        .map_err(|err| LoadError::invalid("languages.default", err.to_string()))?;

    let mut available = Vec::new();
    for value in languages.available.unwrap_or_default() {
        let tag = LanguageTag::parse(&value)
            .map_err(|err| LoadError::invalid("languages.available", err.to_string()))?;
        if !available.contains(&tag) {
            available.push(tag);
        }
    }
    if !available.contains(&default) {
        available.insert(0, default.clone());
    }

    Ok(LanguageSettings { default, available })
}

fn build_recent_settings(recent: RawRecentSettings) -> Result<RecentSettings, LoadError> {
    let limit = recent
        .limit
        .map(|value| non_zero_u32(value, "recent.limit"))
        .transpose()?;

    Ok(RecentSettings { limit })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    archive_ttl_seconds: Option<u64>,
    capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawArchiveSettings {
    timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLanguageSettings {
    default: Option<String>,
    available: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRecentSettings {
    limit: Option<u64>,
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
