use std::{
    io::{self, Write},
    process,
    sync::Arc,
};

use blogtags::{
    application::{
        archive::{ArchiveCache, ArchiveService},
        authors::AuthorLinksService,
        context::LanguageResolver,
        error::AppError,
        navigation::NavigationService,
        recent::RecentPostsService,
        tags::TagLinksService,
    },
    cache::{CacheConfig, MemoryCache},
    config::{self, Command, HelperArgs, OutputFormat},
    domain::{archive::MonthLinks, language::LanguageTag},
    infra::{db::PostgresRepositories, error::InfraError, telemetry},
    presentation::{
        fragments::{
            AuthorLinksTemplate, BlogNavTemplate, LastPostsTemplate, MonthLinksTemplate,
            TagLinksTemplate, render_fragment,
        },
        views::{
            BlogNavView, MonthLinksView, build_author_links, build_entry_links, build_tag_links,
        },
    },
    util::clock::{Clock, SystemClock},
};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let summary = error.presentation_message();
    if dispatcher::has_been_set() {
        error!(error = %error, summary, "application error");
    } else {
        let subscriber = tracing_fmt()
            .with_writer(io::stderr)
            .with_max_level(Level::ERROR)
            .finish();
        let dispatch = Dispatch::new(subscriber);
        dispatcher::with_default(&dispatch, || {
            error!(error = %error, summary, "application error");
        });
    }

    let _ = writeln!(io::stderr(), "blogtags: {summary}");
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let command = cli_args.command;
    if let Command::Migrate(_) = command {
        return run_migrations(&settings).await;
    }

    let repositories = init_repositories(&settings).await?;
    let helpers = Helpers::new(repositories, &settings);

    match command {
        Command::Archive(args) => {
            let language = helpers.language_for(&args);
            let links = helpers.archive.get_month_links(&language).await?;
            let view = MonthLinksView::new(&language, &links);
            emit(&args, &view, || MonthLinksTemplate { view: view.clone() })
        }
        Command::Nav(args) => {
            let language = helpers.language_for(&args.helper);
            let entry = helpers
                .navigation
                .entry_by_slug(&language, &args.slug)
                .await?;
            let nav = helpers.navigation.blog_nav(&entry, &language).await?;
            let view = BlogNavView::new(&nav, helpers.timezone);
            emit(&args.helper, &view, || BlogNavTemplate { view: view.clone() })
        }
        Command::Tags(args) => {
            let language = helpers.language_for(&args);
            let usage = helpers.tags.tag_links(&language).await?;
            let tags = build_tag_links(&language, &usage);
            emit(&args, &tags, || TagLinksTemplate { tags: tags.clone() })
        }
        Command::Authors(args) => {
            let language = helpers.language_for(&args.helper);
            let records = helpers
                .authors
                .author_links(&language, &args.order_by)
                .await?;
            let authors = build_author_links(&language, &records);
            emit(&args.helper, &authors, || AuthorLinksTemplate {
                authors: authors.clone(),
            })
        }
        Command::Recent(args) => {
            let language = helpers.language_for(&args);
            let entries = helpers.recent.last_posts(&language).await?;
            let posts = build_entry_links(&entries, helpers.timezone);
            emit(&args, &posts, || LastPostsTemplate {
                posts: posts.clone(),
            })
        }
        Command::Migrate(_) => Ok(()),
    }
}

struct Helpers {
    archive: ArchiveService,
    navigation: NavigationService,
    tags: TagLinksService,
    authors: AuthorLinksService,
    recent: RecentPostsService,
    resolver: LanguageResolver,
    timezone: Tz,
}

impl Helpers {
    fn new(repositories: Arc<PostgresRepositories>, settings: &config::Settings) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache_config = CacheConfig::from(&settings.cache);
        let cache: Arc<ArchiveCache> = Arc::new(MemoryCache::<Arc<MonthLinks>>::new(
            &cache_config,
            Arc::clone(&clock),
        ));

        Self {
            archive: ArchiveService::new(
                repositories.clone(),
                cache,
                clock.clone(),
                &cache_config,
            ),
            navigation: NavigationService::new(repositories.clone(), clock.clone()),
            tags: TagLinksService::new(repositories.clone(), clock.clone()),
            authors: AuthorLinksService::new(repositories.clone(), clock.clone()),
            recent: RecentPostsService::new(repositories, clock, settings.recent.limit),
            resolver: LanguageResolver::new(
                settings.languages.default.clone(),
                settings.languages.available.clone(),
            ),
            timezone: settings.archive.timezone,
        }
    }

    fn language_for(&self, args: &HelperArgs) -> LanguageTag {
        self.resolver
            .resolve(args.language.as_deref(), args.accept_language.as_deref())
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;

    Ok(Arc::new(PostgresRepositories::new(
        pool,
        settings.archive.timezone,
    )))
}

async fn run_migrations(settings: &config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(settings).await?;
    PostgresRepositories::run_migrations(repositories.pool())
        .await
        .map_err(InfraError::from)?;

    info!(target = "blogtags::migrate", "Database migrations applied");
    Ok(())
}

/// Writes `view` as JSON, or the fragment built by `template` as HTML.
fn emit<V, T, F>(args: &HelperArgs, view: &V, template: F) -> Result<(), AppError>
where
    V: Serialize,
    T: askama::Template,
    F: FnOnce() -> T,
{
    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(view)
            .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?,
        OutputFormat::Html => render_fragment(template())?,
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}").map_err(InfraError::from)?;
    Ok(())
}
