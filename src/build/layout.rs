//! The site-wide layout wrapped around every page.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use super::html::{
    append_html, deep_clone, element_name, escape_text, remove_class, set_attr, set_text,
};
use super::paths::{relative_link, relative_root};
use super::render::{TagLink, Template, TemplateError, TemplateValues, replace_placeholders};
use crate::config::AssetsConfig;

const TAGS_MENU: &str = "#tagsDropdownMenu";
const TAG_LINK_TEMPLATE: &str = ".tag-link-template";

/// A tag entry in the layout's tag menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMenuEntry {
    pub name: String,
    /// First page of the tag listing, relative to the output root
    pub target: PathBuf,
}

/// A page about to be wrapped in the layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutPage<'a> {
    /// Where the page is written, relative to the output root
    pub output_path: &'a Path,
    pub title: &'a str,
    /// Breadcrumb markup; empty for none
    pub breadcrumb: &'a str,
    pub children: &'a str,
}

/// Wrap `page` in the layout.
///
/// The title is escaped; the breadcrumb and children are markup and go in
/// as they are. Asset paths are prefixed with the way back to the output root so the
/// same layout works at any directory depth.
pub fn apply_layout(
    layout: &Template,
    page: &LayoutPage<'_>,
    assets: &AssetsConfig,
    tags: &[TagMenuEntry],
) -> Result<String, TemplateError> {
    let root = relative_root(page.output_path);
    let source = fill_tags_menu(layout, page.output_path, tags)?;

    let values = TemplateValues::new()
        .with("title", escape_text(page.title))
        .with("children", page.children)
        .with("page", page.breadcrumb)
        .with("stylesPath", format!("{}{}", root, assets.stylesheet))
        .with("faviconPath", format!("{}{}", root, assets.favicon))
        .with("scriptPath", format!("{}{}", root, assets.script))
        .with("gitLogoPath", format!("{}{}", root, assets.git_logo))
        .with("rootPath", root);

    Ok(replace_placeholders(&source, &values))
}

/// Fill the `#tagsDropdownMenu` element, if the layout has one, with a link
/// per tag. A `.tag-link-template` child is cloned for each link when
/// present; otherwise bare anchors are appended.
fn fill_tags_menu<'t>(
    layout: &'t Template,
    page: &Path,
    tags: &[TagMenuEntry],
) -> Result<Cow<'t, str>, TemplateError> {
    if !layout.source().contains(&TAGS_MENU[1..]) {
        return Ok(Cow::Borrowed(layout.source()));
    }

    let tree = layout.instantiate(&TemplateValues::new());
    let Some(menu) = tree.find(&tree.root(), TAGS_MENU)? else {
        return Ok(Cow::Borrowed(layout.source()));
    };
    let item_template = tree.find(&menu, TAG_LINK_TEMPLATE)?;

    for tag in tags {
        let href = relative_link(page, &tag.target);
        match &item_template {
            Some(template) => {
                let item = deep_clone(template);
                remove_class(&item, &TAG_LINK_TEMPLATE[1..]);
                remove_class(&item, "hidden");

                let anchor = if element_name(&item).as_deref() == Some("a") {
                    item.clone()
                } else {
                    tree.find(&item, "a")?.unwrap_or_else(|| item.clone())
                };
                set_attr(&anchor, "href", &href);
                set_text(&anchor, &tag.name);
                template.insert_before(item);
            }
            None => {
                let link = TagLink {
                    name: tag.name.clone(),
                    href,
                };
                append_html(&menu, &link.to_html());
            }
        }
    }

    if let Some(template) = item_template {
        template.detach();
    }

    Ok(Cow::Owned(tree.doc.to_html()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = "<html><head><title>{{title}}</title>\
        <link rel=\"stylesheet\" href=\"{{stylesPath}}\"><link rel=\"icon\" href=\"{{faviconPath}}\">\
        </head><body><nav>{{page}}</nav><main>{{children}}</main>\
        <img src=\"{{gitLogoPath}}\"><a href=\"{{rootPath}}index.html\">Home</a>\
        <script src=\"{{scriptPath}}\"></script></body></html>";

    fn page<'a>(output_path: &'a Path, children: &'a str) -> LayoutPage<'a> {
        LayoutPage {
            output_path,
            title: "About",
            breadcrumb: "",
            children,
        }
    }

    #[test]
    fn test_asset_paths_follow_depth() {
        let layout = Template::from_source("layout-template.html", LAYOUT);
        let assets = AssetsConfig::default();

        let top = apply_layout(&layout, &page(Path::new("about.html"), "<p>x</p>"), &assets, &[])
            .unwrap();
        assert!(top.contains("href=\"styles/styles.css\""));
        assert!(top.contains("<a href=\"index.html\">Home</a>"));
        assert!(top.contains("<main><p>x</p></main>"));
        assert!(top.contains("<nav></nav>"));

        let deep = apply_layout(
            &layout,
            &page(Path::new("blog/posts/a.html"), ""),
            &assets,
            &[],
        )
        .unwrap();
        assert!(deep.contains("href=\"../../styles/styles.css\""));
        assert!(deep.contains("href=\"../../assets/favicon.webp\""));
        assert!(deep.contains("src=\"../../js/bundle.js\""));
        assert!(deep.contains("src=\"../../assets/github-icon.svg\""));
        assert!(deep.contains("<a href=\"../../index.html\">Home</a>"));
    }

    #[test]
    fn test_children_are_not_rescanned() {
        let layout = Template::from_source("layout-template.html", LAYOUT);
        let html = apply_layout(
            &layout,
            &page(Path::new("a.html"), "<code>{{title}}</code>"),
            &AssetsConfig::default(),
            &[],
        )
        .unwrap();
        assert!(html.contains("<main><code>{{title}}</code></main>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let layout = Template::from_source("layout-template.html", LAYOUT);
        let mut about = page(Path::new("a.html"), "<p>x</p>");
        about.title = "Q&A <draft>";
        let html = apply_layout(&layout, &about, &AssetsConfig::default(), &[]).unwrap();
        assert!(html.contains("<title>Q&amp;A &lt;draft&gt;</title>"));
        assert!(html.contains("<main><p>x</p></main>"));
    }

    #[test]
    fn test_tags_menu_with_item_template() {
        let layout = Template::from_source(
            "layout-template.html",
            "<ul id=\"tagsDropdownMenu\"><li class=\"tag-link-template hidden\">\
             <a class=\"tag\" href=\"#\"></a></li></ul>{{children}}",
        );
        let tags = vec![
            TagMenuEntry {
                name: "rust".to_string(),
                target: PathBuf::from("blog/tags/rust.html"),
            },
            TagMenuEntry {
                name: "open source".to_string(),
                target: PathBuf::from("blog/tags/open-source.html"),
            },
        ];

        let html = apply_layout(
            &layout,
            &page(Path::new("blog/index.html"), "body"),
            &AssetsConfig::default(),
            &tags,
        )
        .unwrap();
        assert_eq!(
            html,
            "<ul id=\"tagsDropdownMenu\">\
             <li><a class=\"tag\" href=\"tags/rust.html\">rust</a></li>\
             <li><a class=\"tag\" href=\"tags/open-source.html\">open source</a></li>\
             </ul>body"
        );
    }

    #[test]
    fn test_tags_menu_without_item_template() {
        let layout = Template::from_source(
            "layout-template.html",
            "<div id=\"tagsDropdownMenu\"></div>",
        );
        let tags = vec![TagMenuEntry {
            name: "rust".to_string(),
            target: PathBuf::from("blog/tags/rust.html"),
        }];
        let html = apply_layout(
            &layout,
            &page(Path::new("index.html"), ""),
            &AssetsConfig::default(),
            &tags,
        )
        .unwrap();
        assert_eq!(
            html,
            "<div id=\"tagsDropdownMenu\"><a href=\"blog/tags/rust.html\">rust</a></div>"
        );
    }

    #[test]
    fn test_layout_without_menu_is_untouched() {
        let source = "<p   data-x=foo>{{missing}}</p>";
        let layout = Template::from_source("layout-template.html", source);
        let html = apply_layout(
            &layout,
            &page(Path::new("index.html"), ""),
            &AssetsConfig::default(),
            &[],
        )
        .unwrap();
        assert_eq!(html, source);
    }
}
