//! Page rendering: placeholder substitution and structural injection into
//! HTML templates.
//!
//! Templates are plain HTML. Two mechanisms fill them:
//!
//! - `{{key}}` placeholders are replaced with values, in one pass, on the
//!   template source. Unknown keys are left as written.
//! - Elements found by selector (`#post-content`, `.post-item-template`,
//!   `.pagination`, ...) are cloned, filled and rearranged in a parsed tree.
//!
//! Substitution runs on the template before injected content arrives, so
//! text inside a post never gets treated as a placeholder.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use kuchikiki::NodeRef;
use regex::{Captures, Regex};

use super::html::{
    Document, Selector, SelectorError, add_class, classes, deep_clone, escape_attr, escape_text,
    outer_html, remove_class, select_first, set_attr, set_classes, set_inner_html,
    set_style_property, set_text,
};
use super::paginate::{PaginationLinks, WINDOW_SIZE};

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("template {template}: required element '{selector}' not found")]
    MissingSelector { template: String, selector: String },

    #[error("template {template}: {source}")]
    InvalidSelector {
        template: String,
        #[source]
        source: SelectorError,
    },

    #[error("required template {path} not found")]
    NotFound { path: PathBuf },

    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex")
});

// =============================================================================
// Placeholder substitution
// =============================================================================

/// Values for `{{key}}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    values: HashMap<String, String>,
}

impl TemplateValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Replace every `{{key}}` whose key has a value. Placeholders without a
/// value stay as they are. Substituted text is not scanned again.
pub fn replace_placeholders(template: &str, values: &TemplateValues) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

// =============================================================================
// Templates
// =============================================================================

/// A template file read into memory.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, source })
    }

    #[cfg(test)]
    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    #[cfg(test)]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute placeholders and parse the result for structural work.
    pub fn instantiate(&self, values: &TemplateValues) -> TemplateTree<'_> {
        TemplateTree {
            name: &self.name,
            doc: Document::parse(&replace_placeholders(&self.source, values)),
        }
    }
}

/// A parsed template instance with selector lookups that report which
/// template was missing what.
pub struct TemplateTree<'t> {
    name: &'t str,
    pub doc: Document,
}

impl TemplateTree<'_> {
    pub fn root(&self) -> NodeRef {
        self.doc.root()
    }

    fn selector(&self, selector: &str) -> Result<Selector, TemplateError> {
        Selector::parse(selector).map_err(|source| TemplateError::InvalidSelector {
            template: self.name.to_string(),
            source,
        })
    }

    /// First match of `selector` under `scope`, if any.
    pub fn find(&self, scope: &NodeRef, selector: &str) -> Result<Option<NodeRef>, TemplateError> {
        Ok(select_first(scope, &self.selector(selector)?))
    }

    /// First match of `selector` under `scope`; absence is an error.
    pub fn require(&self, scope: &NodeRef, selector: &str) -> Result<NodeRef, TemplateError> {
        self.find(scope, selector)?
            .ok_or_else(|| TemplateError::MissingSelector {
                template: self.name.to_string(),
                selector: selector.to_string(),
            })
    }
}

// =============================================================================
// Post items
// =============================================================================

/// A link to a tag page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLink {
    pub name: String,
    pub href: String,
}

impl TagLink {
    pub fn to_html(&self) -> String {
        format!(
            "<a href=\"{}\">{}</a>",
            escape_attr(&self.href),
            escape_text(&self.name)
        )
    }
}

/// What one rendered post item shows.
#[derive(Debug, Clone)]
pub struct PostItem<'a> {
    pub title: &'a str,
    /// Link target for the title; `None` renders plain text
    pub href: Option<String>,
    pub date: String,
    /// HTML body: the preview in listings, the full post on its own page
    pub body: &'a str,
    pub tags: Vec<TagLink>,
}

/// Fill `.post-title`, `.post-date`, `.content` and `.tags` under `item`.
///
/// A post without tags loses its `.tags` element and the `#tag-divider`
/// separating it from the date.
pub fn fill_post_item(
    tree: &TemplateTree<'_>,
    item: &NodeRef,
    post: &PostItem<'_>,
) -> Result<(), TemplateError> {
    let title = tree.require(item, ".post-title")?;
    match &post.href {
        Some(href) => set_inner_html(
            &title,
            &format!(
                "<a href=\"{}\">{}</a>",
                escape_attr(href),
                escape_text(post.title)
            ),
        ),
        None => set_text(&title, post.title),
    }

    let date = tree.require(item, ".post-date")?;
    set_text(&date, &post.date);

    let content = tree.require(item, ".content")?;
    set_inner_html(&content, post.body);

    let tags = tree.find(item, ".tags")?;
    let divider = tree.find(item, "#tag-divider")?;
    if post.tags.is_empty() {
        for node in [tags, divider].into_iter().flatten() {
            node.detach();
        }
    } else if let Some(tags) = tags {
        let links: Vec<String> = post.tags.iter().map(TagLink::to_html).collect();
        set_inner_html(&tags, &links.join(" "));
    }

    Ok(())
}

/// Render a post page: the `#post-content` element of the post template,
/// filled with the full post.
pub fn render_post_page(
    template: &Template,
    values: &TemplateValues,
    post: &PostItem<'_>,
) -> Result<String, TemplateError> {
    let tree = template.instantiate(values);
    let container = tree.require(&tree.root(), "#post-content")?;
    fill_post_item(&tree, &container, post)?;
    Ok(outer_html(&container))
}

// =============================================================================
// Listings
// =============================================================================

/// Render one listing page (a blog page or a tag page).
///
/// Under `root_selector` the template must hold a `.post-item-template`, a
/// `#post-links-div` to receive the cloned items, and a `.pagination` bar.
/// Returns the outer HTML of the root element.
pub fn render_listing(
    template: &Template,
    root_selector: &str,
    values: &TemplateValues,
    items: &[PostItem<'_>],
    pagination: &PaginationLinks,
) -> Result<String, TemplateError> {
    let tree = template.instantiate(values);
    let root = tree.require(&tree.root(), root_selector)?;
    let item_template = tree.require(&root, ".post-item-template")?;
    let container = tree.require(&root, "#post-links-div")?;

    for item in items {
        let node = deep_clone(&item_template);
        set_style_property(&node, "display", "list-item");
        fill_post_item(&tree, &node, item)?;
        container.append(node);
    }
    item_template.detach();

    apply_pagination(&tree, &root, pagination)?;

    Ok(outer_html(&root))
}

/// Fill the `.pagination` bar under `scope`.
///
/// Numbered slots are `#page-link-1` through `#page-link-5`. Filled slots
/// take the classes of `#page-link-1` as written in the template, or those
/// of `#page-link-3` for the current page. Unused slots are hidden.
fn apply_pagination(
    tree: &TemplateTree<'_>,
    scope: &NodeRef,
    links: &PaginationLinks,
) -> Result<(), TemplateError> {
    let bar = tree.require(scope, ".pagination")?;
    let previous = tree.require(&bar, ".previous-page")?;
    let next = tree.require(&bar, ".next-page")?;

    let normal_classes = visible_classes(&tree.require(&bar, "#page-link-1")?);
    let current_classes = visible_classes(&tree.require(&bar, "#page-link-3")?);

    let mut slots = Vec::with_capacity(WINDOW_SIZE);
    for slot in 1..=WINDOW_SIZE {
        slots.push(tree.find(&bar, &format!("#page-link-{}", slot))?);
    }

    for (position, slot) in slots.into_iter().enumerate() {
        let Some(slot) = slot else { continue };
        match links.window.get(position) {
            Some(link) => {
                let classes = if link.is_current {
                    &current_classes
                } else {
                    &normal_classes
                };
                set_classes(&slot, classes);
                set_attr(&slot, "href", &link.href);
                set_text(&slot, &link.number.to_string());
            }
            None => add_class(&slot, "hidden"),
        }
    }

    toggle_link(&previous, links.previous.as_deref());
    toggle_link(&next, links.next.as_deref());

    Ok(())
}

fn visible_classes(node: &NodeRef) -> Vec<String> {
    let mut classes = classes(node);
    classes.retain(|c| c != "hidden");
    classes
}

fn toggle_link(node: &NodeRef, href: Option<&str>) {
    match href {
        Some(href) => {
            remove_class(node, "hidden");
            set_attr(node, "href", href);
        }
        None => add_class(node, "hidden"),
    }
}
