//! HTML fragments rendered from the helper view models.

use askama::Template;

use super::views::{
    AuthorLinkView, BlogNavView, EntryLinkView, MonthLinksView, TagLinkView, TemplateRenderError,
};

#[derive(Template)]
#[template(path = "fragments/month_links.html")]
pub struct MonthLinksTemplate {
    pub view: MonthLinksView,
}

#[derive(Template)]
#[template(path = "fragments/blog_nav.html")]
pub struct BlogNavTemplate {
    pub view: BlogNavView,
}

#[derive(Template)]
#[template(path = "fragments/tag_links.html")]
pub struct TagLinksTemplate {
    pub tags: Vec<TagLinkView>,
}

#[derive(Template)]
#[template(path = "fragments/author_links.html")]
pub struct AuthorLinksTemplate {
    pub authors: Vec<AuthorLinkView>,
}

#[derive(Template)]
#[template(path = "fragments/last_posts.html")]
pub struct LastPostsTemplate {
    pub posts: Vec<EntryLinkView>,
}

pub fn render_fragment<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new("Template rendering failed", err))
}
