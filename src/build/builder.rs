use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;

use super::layout::TagMenuEntry;
use super::markdown::{MarkdownError, MarkdownOptions};
use super::pages::{self, PageError, tag_output_path};
use super::pipeline::{Pipeline, PipelineContext, PipelineError, ProcessingPage, StaticFile};
use super::post::{ContentError, load_posts, sort_posts};
use super::render::TemplateError;
use super::tags::TagIndex;
use super::templates::Templates;
use super::walk::{EntryKind, discover_assets, discover_content};

/// Output directory that receives the assets directory.
const ASSETS_OUTPUT_DIR: &str = "assets";

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("failed to scan input directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} would be written twice: by {first} and by {second}")]
    OutputCollision {
        path: PathBuf,
        first: String,
        second: String,
    },
}

impl From<PageError> for BuildError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Content(err) => BuildError::Content(err),
            PageError::Template(err) => BuildError::Template(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub posts: usize,
    pub tags: usize,
    pub blog_pages: usize,
    pub tag_pages: usize,
    pub content_pages: usize,
    pub static_files: usize,
}

pub struct Builder {
    config: SiteConfig,
}

impl Builder {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.site.output
    }

    /// Run one complete build.
    ///
    /// Every input is loaded and every page rendered before anything is
    /// written, so a content or template error leaves the output untouched.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        // Build pipeline:
        // 1. Load posts, sort them, index tags
        // 2. Generate post, blog and tag pages
        // 3. Discover content pages and static files
        // 4. Check that no two inputs target the same output
        // 5. Lay out and write pages, copy static files
        let paths = &self.config.paths;
        let blog = &self.config.blog;

        // Step 1: Posts and tags
        let markdown = MarkdownOptions::load(&paths.markdown_options)?;
        let posts = sort_posts(load_posts(&paths.posts, blog.preview_length, &markdown)?);
        let tags = TagIndex::build(&posts);
        tracing::info!(posts = posts.len(), tags = tags.len(), "loaded posts");

        // Step 2: Generated pages
        let templates = Templates::load(&paths.templates)?;
        let mut pages = pages::post_pages(&posts, &templates, blog)?;
        let blog_pages = pages::blog_pages(&posts, &templates, blog)?;
        let tag_pages = pages::tag_pages(&tags, &templates, blog)?;
        let blog_page_count = blog_pages.len();
        let tag_page_count = tag_pages.len();
        pages.extend(blog_pages);
        pages.extend(tag_pages);

        // Step 3: Content tree and assets
        let mut static_files = Vec::new();
        let mut content_pages = 0;
        for entry in discover_content(&paths.content)? {
            match entry.kind {
                EntryKind::Page => {
                    let raw = std::fs::read_to_string(&entry.source).map_err(|source| {
                        BuildError::Io {
                            path: entry.source.clone(),
                            source,
                        }
                    })?;
                    let specific = templates.specific_for(&entry.relative)?;
                    pages.push(pages::content_page(
                        &entry.source,
                        &entry.relative,
                        &raw,
                        specific.as_ref(),
                    )?);
                    content_pages += 1;
                }
                EntryKind::Static | EntryKind::Directory => static_files.push(StaticFile {
                    source: entry.source,
                    output_path: entry.relative,
                    is_dir: entry.kind == EntryKind::Directory,
                }),
            }
        }

        if let Some(assets_dir) = &paths.assets {
            if assets_dir.is_dir() {
                for entry in discover_assets(assets_dir)? {
                    static_files.push(StaticFile {
                        output_path: Path::new(ASSETS_OUTPUT_DIR).join(&entry.relative),
                        is_dir: entry.kind == EntryKind::Directory,
                        source: entry.source,
                    });
                }
            } else {
                tracing::debug!(dir = %assets_dir.display(), "no assets directory");
            }
        }
        let static_count = static_files.iter().filter(|f| !f.is_dir).count();
        tracing::info!(
            pages = pages.len(),
            content_pages,
            static_files = static_count,
            "collected site content"
        );

        // Step 4: Collisions
        check_collisions(&pages, &static_files)?;

        // Step 5: Layout, write, copy
        let output_dir = self.output_dir();
        std::fs::create_dir_all(output_dir).map_err(|source| BuildError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let tag_menu: Vec<TagMenuEntry> = tags
            .iter()
            .map(|bucket| TagMenuEntry {
                name: bucket.name.clone(),
                target: tag_output_path(blog, &bucket.name),
            })
            .collect();
        let ctx = PipelineContext::new(
            output_dir,
            &templates.layout,
            &self.config.assets,
            &tag_menu,
            &static_files,
        );
        Pipeline::default_pipeline().run(&mut pages, &ctx)?;

        tracing::info!(
            output = %output_dir.display(),
            files = pages.len() + static_count,
            "site written"
        );

        Ok(BuildResult {
            output_dir: output_dir.to_path_buf(),
            posts: posts.len(),
            tags: tags.len(),
            blog_pages: blog_page_count,
            tag_pages: tag_page_count,
            content_pages,
            static_files: static_count,
        })
    }
}

/// Fail if two pages, or a page and a static file, target the same output.
fn check_collisions(pages: &[ProcessingPage], statics: &[StaticFile]) -> Result<(), BuildError> {
    let mut seen: HashMap<&Path, String> = HashMap::new();

    let targets = pages
        .iter()
        .map(|page| (page.output_path.as_path(), page.origin.clone()))
        .chain(
            statics
                .iter()
                .filter(|file| !file.is_dir)
                .map(|file| (file.output_path.as_path(), format!("file {}", file.source.display()))),
        );

    for (path, origin) in targets {
        if let Some(first) = seen.insert(path, origin.clone()) {
            return Err(BuildError::OutputCollision {
                path: path.to_path_buf(),
                first,
                second: origin,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LAYOUT: &str = "<!DOCTYPE html><html><head><title>{{title}}</title>\
        <link rel=\"stylesheet\" href=\"{{stylesPath}}\"></head><body>\
        <ul id=\"tagsDropdownMenu\"></ul><nav>{{page}}</nav>{{children}}\
        <script src=\"{{scriptPath}}\"></script></body></html>";

    const POST_TEMPLATE: &str = "<article id=\"post-content\"><h1 class=\"post-title\"></h1>\
        <span class=\"post-date\"></span><span id=\"tag-divider\">|</span>\
        <span class=\"tags\"></span><div class=\"content\"></div></article>";

    const BLOG_TEMPLATE: &str = "<div id=\"blog\"><ul id=\"post-links-div\">\
        <li class=\"post-item-template\"><h2 class=\"post-title\"></h2>\
        <span class=\"post-date\"></span><span id=\"tag-divider\">|</span>\
        <span class=\"tags\"></span><div class=\"content\"></div></li></ul>\
        <div class=\"pagination\"><a class=\"previous-page\">&lt;</a>\
        <a id=\"page-link-1\" class=\"p\"></a><a id=\"page-link-2\" class=\"p\"></a>\
        <a id=\"page-link-3\" class=\"p on\"></a><a id=\"page-link-4\" class=\"p\"></a>\
        <a id=\"page-link-5\" class=\"p\"></a><a class=\"next-page\">&gt;</a></div></div>";

    /// Lay out a small site: posts, templates, content pages and assets.
    fn site(root: &Path, post_count: usize) -> SiteConfig {
        let templates = root.join("src/templates");
        let posts = root.join("src/posts");
        let content = root.join("src/content");
        let assets = root.join("src/assets");
        for dir in [&templates, &posts, &content, &assets] {
            fs::create_dir_all(dir).unwrap();
        }

        fs::write(templates.join("layout-template.html"), LAYOUT).unwrap();
        fs::write(templates.join("post-template.html"), POST_TEMPLATE).unwrap();
        fs::write(templates.join("blog-template.html"), BLOG_TEMPLATE).unwrap();

        for i in 1..=post_count {
            let tags = if i % 2 == 0 { "[even, all]" } else { "[all]" };
            fs::write(
                posts.join(format!("post {}.md", i)),
                format!(
                    "---\ntitle: Post {i}\ndate: {i:02}.01.2024\ntags: {tags}\n---\n# Heading {i}\n\nBody of post {i}.\n"
                ),
            )
            .unwrap();
        }

        fs::write(
            content.join("index.html"),
            "---\ntitle: Home\n---\n<div id=\"main\"><p>Welcome</p></div>",
        )
        .unwrap();
        fs::create_dir_all(content.join("docs")).unwrap();
        fs::write(content.join("docs/guide.html"), "<p>Guide</p>").unwrap();
        fs::write(content.join("docs/data.json"), "{}").unwrap();
        fs::write(assets.join("favicon.webp"), [1u8, 2, 3]).unwrap();

        let mut config = SiteConfig::with_name("Test");
        config.resolve_paths(root);
        config
    }

    fn read(root: &Path, path: &str) -> String {
        fs::read_to_string(root.join("public").join(path)).unwrap()
    }

    #[test]
    fn test_build_full_site() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let result = Builder::new(site(root, 7)).build().unwrap();

        assert_eq!(result.posts, 7);
        assert_eq!(result.tags, 2);
        assert_eq!(result.blog_pages, 2);
        // "all" has 7 posts (2 pages), "even" has 3 (1 page)
        assert_eq!(result.tag_pages, 3);
        assert_eq!(result.content_pages, 2);
        assert_eq!(result.static_files, 2);

        let index = read(root, "blog/index.html");
        assert!(index.starts_with("<!DOCTYPE html>"));
        assert!(index.contains("href=\"../styles/styles.css\""));
        assert!(index.contains("<a href=\"posts/post-7.html\">Post 7</a>"));
        assert!(index.contains("<a class=\"next-page\" href=\"blog-page-2.html\">&gt;</a>"));

        let second = read(root, "blog/blog-page-2.html");
        assert!(second.contains("<a class=\"previous-page\" href=\"index.html\">&lt;</a>"));
        assert!(second.contains("<a class=\"next-page hidden\">&gt;</a>"));
        assert!(second.contains("Post 1"));
        assert!(second.contains("Post 2"));
        assert!(!second.contains("Post 3<"));

        let post = read(root, "blog/posts/post-7.html");
        assert!(post.contains("<h1 id=\"heading-7\">Heading 7</h1>"));
        assert!(post.contains("<title>Post 7</title>"));
        assert!(post.contains("<a href=\"../tags/all.html\">all</a>"));
        // Newest post is tagged [all], so "all" is seen first
        assert!(post.contains(
            "<ul id=\"tagsDropdownMenu\"><a href=\"../tags/all.html\">all</a>\
             <a href=\"../tags/even.html\">even</a></ul>"
        ));

        assert!(root.join("public/blog/tags/all.html").exists());
        assert!(root.join("public/blog/tags/all-page-2.html").exists());
        assert!(root.join("public/blog/tags/even.html").exists());

        let home = read(root, "index.html");
        assert!(home.contains("<title>Home</title>"));
        assert!(home.contains("<div id=\"main\"><p>Welcome</p></div>"));
        assert!(home.contains("href=\"styles/styles.css\""));

        let guide = read(root, "docs/guide.html");
        assert!(guide.contains("<title>guide</title>"));
        assert!(guide.contains("href=\"../styles/styles.css\""));

        assert_eq!(read(root, "docs/data.json"), "{}");
        assert_eq!(
            fs::read(root.join("public/assets/favicon.webp")).unwrap(),
            vec![1u8, 2, 3]
        );
    }

    #[test]
    fn test_tag_pages_render_from_blog_template() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = site(root, 0);
        fs::write(
            root.join("src/posts/only.md"),
            "---\ntitle: Only\ndate: 01.01.2024\ntags: [rust]\n---\nBody\n",
        )
        .unwrap();
        assert!(!root.join("src/templates/tags-template.html").exists());

        let result = Builder::new(config).build().unwrap();
        assert_eq!(result.tag_pages, 1);

        let tag_page = read(root, "blog/tags/rust.html");
        assert!(tag_page.contains("<div id=\"blog\">"));
        assert!(tag_page.contains("<title>Posts tagged with \"rust\"</title>"));
        assert!(tag_page.contains("<a href=\"../posts/only.html\">Only</a>"));
    }

    #[test]
    fn test_tag_outside_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = site(root, 1);
        fs::write(
            root.join("src/posts/sneaky.md"),
            "---\ntitle: Sneaky\ndate: 01.01.2024\ntags: [\"../../../escaped\"]\n---\n",
        )
        .unwrap();

        let err = Builder::new(config).build().unwrap_err();
        match err {
            BuildError::Content(ContentError::InvalidTag { path, tag }) => {
                assert!(path.ends_with("sneaky.md"));
                assert_eq!(tag, "../../../escaped");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!root.join("public").exists());
        assert!(!root.join("escaped.html").exists());
    }

    #[test]
    fn test_build_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let builder = Builder::new(site(root, 6));

        builder.build().unwrap();
        let first = read(root, "blog/index.html");
        let first_tag = read(root, "blog/tags/all.html");
        builder.build().unwrap();
        assert_eq!(read(root, "blog/index.html"), first);
        assert_eq!(read(root, "blog/tags/all.html"), first_tag);
    }

    #[test]
    fn test_site_without_posts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = site(root, 0);
        fs::remove_file(root.join("src/templates/blog-template.html")).unwrap();
        fs::remove_file(root.join("src/templates/post-template.html")).unwrap();

        let result = Builder::new(config).build().unwrap();
        assert_eq!(result.posts, 0);
        assert_eq!(result.blog_pages, 0);
        assert!(!root.join("public/blog/index.html").exists());
        assert!(root.join("public/index.html").exists());
    }

    #[test]
    fn test_collision_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = site(root, 1);
        fs::create_dir_all(root.join("src/content/blog")).unwrap();
        fs::write(root.join("src/content/blog/index.html"), "<p>clash</p>").unwrap();

        let err = Builder::new(config).build().unwrap_err();
        assert!(matches!(err, BuildError::OutputCollision { .. }));
        assert!(!root.join("public").exists());
    }

    #[test]
    fn test_content_error_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = site(root, 1);
        fs::write(root.join("src/posts/broken.md"), "---\ndate: 01.01.2024\n---\n").unwrap();

        let err = Builder::new(config).build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Content(ContentError::MissingTitle { .. })
        ));
        assert!(!root.join("public").exists());
    }
}
