//! The set of HTML templates a build works with.

use std::path::{Path, PathBuf};

use super::render::{Template, TemplateError};

pub const LAYOUT_TEMPLATE: &str = "layout-template.html";
pub const POST_TEMPLATE: &str = "post-template.html";
pub const BLOG_TEMPLATE: &str = "blog-template.html";
pub const TAGS_TEMPLATE: &str = "tags-template.html";

/// Root element of the blog listing template.
pub const BLOG_ROOT: &str = "#blog";
/// Root element of a dedicated tag listing template.
pub const TAG_ROOT: &str = "#tag";

/// Suffix of page-specific templates: `about.html` uses `about-template.html`.
const SPECIFIC_SUFFIX: &str = "-template.html";

/// Templates loaded from the templates directory.
///
/// The layout is always required. The blog templates are only required
/// once there are posts to render, so a site without a blog needs none.
#[derive(Debug)]
pub struct Templates {
    dir: PathBuf,
    pub layout: Template,
    post: Option<Template>,
    blog: Option<Template>,
    tags: Option<Template>,
}

impl Templates {
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let layout_path = dir.join(LAYOUT_TEMPLATE);
        let layout = load_optional(&layout_path)?
            .ok_or(TemplateError::NotFound { path: layout_path })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            layout,
            post: load_optional(&dir.join(POST_TEMPLATE))?,
            blog: load_optional(&dir.join(BLOG_TEMPLATE))?,
            tags: load_optional(&dir.join(TAGS_TEMPLATE))?,
        })
    }

    pub fn post(&self) -> Result<&Template, TemplateError> {
        self.required(self.post.as_ref(), POST_TEMPLATE)
    }

    pub fn blog(&self) -> Result<&Template, TemplateError> {
        self.required(self.blog.as_ref(), BLOG_TEMPLATE)
    }

    /// The tag listing template and the selector of its root element.
    ///
    /// Without a tags template, tag pages are rendered from the blog
    /// template under its own `#blog` root.
    pub fn tags(&self) -> Result<(&Template, &'static str), TemplateError> {
        match &self.tags {
            Some(tags) => Ok((tags, TAG_ROOT)),
            None => self.blog().map(|blog| (blog, BLOG_ROOT)),
        }
    }

    fn required<'a>(
        &self,
        template: Option<&'a Template>,
        name: &str,
    ) -> Result<&'a Template, TemplateError> {
        template.ok_or_else(|| TemplateError::NotFound {
            path: self.dir.join(name),
        })
    }

    /// The page-specific template for a content page, if one exists.
    pub fn specific_for(&self, page: &Path) -> Result<Option<Template>, TemplateError> {
        let Some(stem) = page.file_stem() else {
            return Ok(None);
        };
        let name = format!("{}{}", stem.to_string_lossy(), SPECIFIC_SUFFIX);
        load_optional(&self.dir.join(name))
    }
}

fn load_optional(path: &Path) -> Result<Option<Template>, TemplateError> {
    if path.is_file() {
        Template::load(path).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_layout_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let err = Templates::load(dir.path()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { .. }));
    }

    #[test]
    fn test_blog_templates_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LAYOUT_TEMPLATE), "{{children}}").unwrap();

        let templates = Templates::load(dir.path()).unwrap();
        assert!(matches!(templates.post(), Err(TemplateError::NotFound { .. })));
        assert!(templates.tags().is_err());
    }

    #[test]
    fn test_tags_template_falls_back_to_blog() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LAYOUT_TEMPLATE), "{{children}}").unwrap();
        fs::write(dir.path().join(BLOG_TEMPLATE), "<div id=\"blog\"></div>").unwrap();

        let templates = Templates::load(dir.path()).unwrap();
        let (template, root) = templates.tags().unwrap();
        assert_eq!(template.name(), BLOG_TEMPLATE);
        assert_eq!(root, BLOG_ROOT);

        fs::write(dir.path().join(TAGS_TEMPLATE), "<div id=\"tag\"></div>").unwrap();
        let templates = Templates::load(dir.path()).unwrap();
        let (template, root) = templates.tags().unwrap();
        assert_eq!(template.name(), TAGS_TEMPLATE);
        assert_eq!(root, TAG_ROOT);
    }

    #[test]
    fn test_specific_template_lookup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LAYOUT_TEMPLATE), "{{children}}").unwrap();
        fs::write(dir.path().join("about-template.html"), "<div id=\"main\"></div>").unwrap();

        let templates = Templates::load(dir.path()).unwrap();
        let about = templates.specific_for(Path::new("nested/about.html")).unwrap();
        assert_eq!(about.unwrap().name(), "about-template.html");
        assert!(templates.specific_for(Path::new("contact.html")).unwrap().is_none());
    }
}
