//! Producing the site's pages: one per post, the paginated blog listing,
//! paginated listings per tag, and the hand-written content pages.
//!
//! Everything here is pure: inputs are already loaded, and the result is a
//! list of [`ProcessingPage`]s for the pipeline to lay out and write.

use std::path::{Path, PathBuf};

use super::document::{PageFrontMatter, parse_front_matter, yaml_scalar_to_string};
use super::html::{
    Document, Selector, escape_text, inner_html, outer_html, select_first, set_inner_html,
};
use super::paginate::{Collection, paginate};
use super::paths::relative_link;
use super::pipeline::ProcessingPage;
use super::post::{ContentError, Post};
use super::render::{
    PostItem, TagLink, Template, TemplateError, TemplateValues, render_listing, render_post_page,
};
use super::tags::TagIndex;
use super::templates::{BLOG_ROOT, Templates};
use crate::config::BlogConfig;
use crate::util::tag_slug;

/// Region of a content page (and of its specific template) that holds the
/// page body.
const MAIN_REGION: &str = "#main";

/// Where a post's page is written.
pub fn post_output_path(blog: &BlogConfig, post: &Post) -> PathBuf {
    blog.posts_dir.join(&post.html_file_name)
}

/// Where the first page of a tag listing is written.
pub fn tag_output_path(blog: &BlogConfig, tag: &str) -> PathBuf {
    blog.tags_dir.join(Collection::tag(&tag_slug(tag)).file_name(0))
}

fn blog_index_path(blog: &BlogConfig) -> PathBuf {
    blog.output_dir.join(Collection::blog().file_name(0))
}

/// Links to the tag pages of `post`, relative to the page at `from`.
fn tag_links(blog: &BlogConfig, post: &Post, from: &Path) -> Vec<TagLink> {
    post.tags
        .iter()
        .map(|tag| TagLink {
            name: tag.clone(),
            href: relative_link(from, &tag_output_path(blog, tag)),
        })
        .collect()
}

/// A post as it appears in a listing written to `from`.
fn listing_item<'a>(blog: &BlogConfig, post: &'a Post, from: &Path) -> PostItem<'a> {
    PostItem {
        title: &post.title,
        href: Some(relative_link(from, &post_output_path(blog, post))),
        date: post.formatted_date(),
        body: &post.preview_content,
        tags: tag_links(blog, post, from),
    }
}

// =============================================================================
// Post pages
// =============================================================================

/// One page per post, carrying the full rendered body.
pub fn post_pages(
    posts: &[Post],
    templates: &Templates,
    blog: &BlogConfig,
) -> Result<Vec<ProcessingPage>, TemplateError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }
    let template = templates.post()?;
    let blog_index = blog_index_path(blog);

    posts
        .iter()
        .map(|post| {
            let output_path = post_output_path(blog, post);
            let item = PostItem {
                title: &post.title,
                href: None,
                date: post.formatted_date(),
                body: &post.content,
                tags: tag_links(blog, post, &output_path),
            };
            let values = TemplateValues::new()
                .with("title", post.title.as_str())
                .with("date", item.date.as_str())
                .with("content", post.content.as_str());

            let content = render_post_page(template, &values, &item)?;
            let breadcrumb = format!(
                "/ <a href=\"{}\">{}</a> / <em>{}</em>",
                relative_link(&output_path, &blog_index),
                escape_text(&blog.title),
                escape_text(&post.title)
            );

            Ok(ProcessingPage::new(
                output_path,
                format!("post {}", post.source_path.display()),
                post.title.as_str(),
                breadcrumb,
                content,
            ))
        })
        .collect()
}

// =============================================================================
// Listings
// =============================================================================

/// The paginated blog listing: `index.html`, `blog-page-2.html`, ...
pub fn blog_pages(
    posts: &[Post],
    templates: &Templates,
    blog: &BlogConfig,
) -> Result<Vec<ProcessingPage>, TemplateError> {
    let pages = paginate(posts, blog.posts_per_page);
    if pages.is_empty() {
        return Ok(Vec::new());
    }
    let template = templates.blog()?;
    let collection = Collection::blog();

    pages
        .iter()
        .map(|page| {
            let output_path = blog.output_dir.join(collection.file_name(page.index));
            let items: Vec<PostItem> = page
                .items
                .iter()
                .map(|post| listing_item(blog, post, &output_path))
                .collect();
            let values = TemplateValues::new()
                .with("title", blog.title.as_str())
                .with("pageNumber", page.number().to_string())
                .with("totalPages", page.total.to_string());

            let content = render_listing(
                template,
                BLOG_ROOT,
                &values,
                &items,
                &collection.page_links(page),
            )?;

            Ok(ProcessingPage::new(
                output_path,
                format!("blog page {}", page.number()),
                blog.title.as_str(),
                format!("<em>{}</em>", escape_text(&blog.title)),
                content,
            ))
        })
        .collect()
}

/// A paginated listing per tag: `<slug>.html`, `<slug>-page-2.html`, ...
pub fn tag_pages(
    tags: &TagIndex<'_>,
    templates: &Templates,
    blog: &BlogConfig,
) -> Result<Vec<ProcessingPage>, TemplateError> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }
    let (template, root) = templates.tags()?;
    let blog_index = blog_index_path(blog);

    let mut out = Vec::new();
    for bucket in tags.iter() {
        let collection = Collection::tag(&bucket.slug());
        let title = format!("Posts tagged with \"{}\"", bucket.name);

        for page in paginate(&bucket.posts, blog.posts_per_page) {
            let output_path = blog.tags_dir.join(collection.file_name(page.index));
            let items: Vec<PostItem> = page
                .items
                .iter()
                .map(|post| listing_item(blog, post, &output_path))
                .collect();
            let values = TemplateValues::new()
                .with("title", title.as_str())
                .with("tag", bucket.name.as_str())
                .with("pageNumber", page.number().to_string())
                .with("totalPages", page.total.to_string());

            let content = render_listing(
                template,
                root,
                &values,
                &items,
                &collection.page_links(&page),
            )?;
            let breadcrumb = format!(
                "<a href=\"{}\">{}</a> / <em>{}</em>",
                relative_link(&output_path, &blog_index),
                escape_text(&blog.title),
                escape_text(&bucket.name)
            );

            out.push(ProcessingPage::new(
                output_path,
                format!("tag '{}' page {}", bucket.name, page.number()),
                title.as_str(),
                breadcrumb,
                content,
            ));
        }
    }

    Ok(out)
}

// =============================================================================
// Content pages
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Turn one hand-written HTML page into a pipeline page.
///
/// `relative` is the page's path inside the content tree, which is also its
/// output path. With a page-specific template, the template's `#main`
/// receives the page's own `#main` content (or its whole body); without
/// one, the page's `#main` element (or whole body) is used as is.
pub fn content_page(
    source: &Path,
    relative: &Path,
    raw: &str,
    specific: Option<&Template>,
) -> Result<ProcessingPage, PageError> {
    let parsed = parse_front_matter::<PageFrontMatter>(raw).map_err(|source_err| {
        ContentError::FrontMatter {
            path: source.to_path_buf(),
            source: source_err,
        }
    })?;
    let front_matter = parsed.front_matter;

    let title = front_matter.title.clone().unwrap_or_else(|| {
        relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let page_doc = Document::parse(&parsed.body);
    let main = select_first(&page_doc.root(), &main_selector()?);

    let content = match specific {
        Some(template) => {
            let mut values = TemplateValues::new().with("title", title.as_str());
            for (key, value) in &front_matter.extra {
                if let Some(text) = yaml_scalar_to_string(value) {
                    values.insert(key.as_str(), text);
                }
            }
            if let Some(page) = &front_matter.page {
                values.insert("page", page.as_str());
            }

            let tree = template.instantiate(&values);
            let slot = tree.require(&tree.root(), MAIN_REGION)?;
            let inner = match main {
                Some(main) => inner_html(&main),
                None => page_doc.body_html(),
            };
            set_inner_html(&slot, &inner);
            tree.doc.body_html()
        }
        None => match main {
            Some(main) => outer_html(&main),
            None => page_doc.body_html(),
        },
    };

    Ok(ProcessingPage::new(
        relative.to_path_buf(),
        format!("content {}", source.display()),
        title,
        front_matter.page.unwrap_or_default(),
        content,
    ))
}

fn main_selector() -> Result<Selector, TemplateError> {
    Selector::parse(MAIN_REGION).map_err(|source| TemplateError::InvalidSelector {
        template: MAIN_REGION.to_string(),
        source,
    })
}
