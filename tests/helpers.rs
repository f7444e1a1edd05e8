mod support;

use std::num::NonZeroU32;
use std::sync::Arc;

use blogtags::application::authors::AuthorLinksService;
use blogtags::application::context::LanguageResolver;
use blogtags::application::error::BlogError;
use blogtags::application::navigation::NavigationService;
use blogtags::application::recent::RecentPostsService;
use blogtags::application::tags::TagLinksService;
use blogtags::infra::memory::MemoryRepositories;
use blogtags::util::clock::ManualClock;
use time::macros::datetime;

use support::{NOW, author, draft, entry, tag};

struct Blog {
    repos: Arc<MemoryRepositories>,
    clock: Arc<ManualClock>,
}

impl Blog {
    fn seeded() -> Self {
        let repos = Arc::new(MemoryRepositories::default());
        let ada = author("ada", "Ada", "Lovelace");
        let grace = author("grace", "Grace", "Hopper");
        let ghost = author("ghost", "", "");

        let mut intro = entry("intro", "en", datetime!(2021-03-05 09:00 UTC));
        intro.author_id = ada.id;
        intro.tags = vec!["rust".into(), "meta".into()];
        let mut follow_up = entry("follow-up", "en", datetime!(2021-03-20 09:00 UTC));
        follow_up.author_id = grace.id;
        follow_up.tags = vec!["rust".into()];
        let mut summer = entry("summer", "en", datetime!(2021-07-01 09:00 UTC));
        summer.author_id = ada.id;
        let mut unfinished = draft("unfinished", "en", datetime!(2021-08-01 09:00 UTC));
        unfinished.author_id = ghost.id;
        unfinished.tags = vec!["draft".into()];
        let mut bonjour = entry("bonjour", "fr", datetime!(2021-04-01 09:00 UTC));
        bonjour.author_id = ghost.id;
        bonjour.tags = vec!["rust".into()];

        for record in [intro, follow_up, summer, unfinished, bonjour] {
            repos.insert_entry(record);
        }
        for person in [ada, grace, ghost] {
            repos.insert_author(person);
        }

        Self {
            repos,
            clock: Arc::new(ManualClock::new(NOW)),
        }
    }

    fn navigation(&self) -> NavigationService {
        NavigationService::new(self.repos.clone(), self.clock.clone())
    }
}

#[tokio::test]
async fn navigation_walks_published_entries_in_order() {
    let blog = Blog::seeded();
    let navigation = blog.navigation();
    let language = tag("en");

    let follow_up = navigation
        .entry_by_slug(&language, "follow-up")
        .await
        .expect("entry");
    let nav = navigation
        .blog_nav(&follow_up, &language)
        .await
        .expect("navigation");
    assert_eq!(nav.previous.map(|e| e.slug).as_deref(), Some("intro"));
    assert_eq!(nav.next.map(|e| e.slug).as_deref(), Some("summer"));

    let summer = navigation
        .entry_by_slug(&language, "summer")
        .await
        .expect("entry");
    let nav = navigation
        .blog_nav(&summer, &language)
        .await
        .expect("navigation");
    assert_eq!(nav.next, None);
}

#[tokio::test]
async fn navigation_reports_unknown_slugs_per_language() {
    let blog = Blog::seeded();

    let err = blog
        .navigation()
        .entry_by_slug(&tag("en"), "bonjour")
        .await
        .expect_err("french entry is not english");

    assert!(matches!(err, BlogError::UnknownEntry { .. }));
}

#[tokio::test]
async fn tag_links_count_published_entries_of_the_language() {
    let blog = Blog::seeded();
    let service = TagLinksService::new(blog.repos.clone(), blog.clock.clone());

    let tags = service.tag_links(&tag("en")).await.expect("tags");
    let summary: Vec<(&str, u64)> = tags.iter().map(|t| (t.name.as_str(), t.count)).collect();

    assert_eq!(summary, vec![("meta", 1), ("rust", 2)]);
}

#[tokio::test]
async fn author_links_list_each_author_once() {
    let blog = Blog::seeded();
    let service = AuthorLinksService::new(blog.repos.clone(), blog.clock.clone());

    let authors = service
        .author_links(&tag("en"), "-last_name")
        .await
        .expect("authors");
    let names: Vec<String> = authors.iter().map(|a| a.display_name()).collect();

    assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);
}

#[tokio::test]
async fn recent_posts_respect_limit_and_clock() {
    let blog = Blog::seeded();
    let service =
        RecentPostsService::new(blog.repos.clone(), blog.clock.clone(), NonZeroU32::new(2));

    let posts = service.last_posts(&tag("en")).await.expect("posts");
    let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["summer", "follow-up"]);

    blog.clock.set(datetime!(2021-03-10 00:00 UTC));
    let posts = service.last_posts(&tag("en")).await.expect("posts");
    let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["intro"]);
}

#[test]
fn resolver_prefers_explicit_then_header_then_default() {
    let resolver = LanguageResolver::new(tag("en"), vec![tag("en"), tag("fr")]);

    assert_eq!(resolver.resolve(Some("fr"), Some("en")), tag("fr"));
    assert_eq!(resolver.resolve(None, Some("fr-CH, en;q=0.9")), tag("fr"));
    assert_eq!(resolver.resolve(None, Some("es")), tag("en"));
}
