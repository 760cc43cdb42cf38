//! Path and link conversion utilities.
//!
//! Every page refers to shared assets and other pages with relative links,
//! so the built site works from any base URL or straight off the disk.
//! All paths handled here are relative to the output root.

use std::path::{Component, Path};

/// Prefix leading from a page back to the output root.
///
/// # Examples
/// ```ignore
/// relative_root("index.html") => ""
/// relative_root("blog/index.html") => "../"
/// relative_root("blog/posts/a.html") => "../../"
/// ```
pub fn relative_root(page: &Path) -> String {
    "../".repeat(depth(page))
}

/// Number of directories between the output root and `page`.
fn depth(page: &Path) -> usize {
    normal_components(page).len().saturating_sub(1)
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Relative link from the page at `from` to the file at `to`.
///
/// # Examples
/// ```ignore
/// relative_link("blog/index.html", "blog/posts/a.html") => "posts/a.html"
/// relative_link("blog/tags/rust.html", "blog/posts/a.html") => "../posts/a.html"
/// relative_link("about.html", "blog/index.html") => "blog/index.html"
/// ```
pub fn relative_link(from: &Path, to: &Path) -> String {
    let from = normal_components(from);
    let to = normal_components(to);
    let from_dir = &from[..from.len().saturating_sub(1)];

    let common = from_dir
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    // The file name itself is never a shared directory
    let common = common.min(to.len().saturating_sub(1));

    let mut link = "../".repeat(from_dir.len() - common);
    link.push_str(&to[common..].join("/"));
    link
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_root() {
        assert_eq!(relative_root(Path::new("index.html")), "");
        assert_eq!(relative_root(Path::new("blog/index.html")), "../");
        assert_eq!(relative_root(Path::new("blog/posts/a.html")), "../../");
        assert_eq!(relative_root(Path::new("./about.html")), "");
    }

    #[test]
    fn test_relative_link_within_blog() {
        assert_eq!(
            relative_link(Path::new("blog/index.html"), Path::new("blog/posts/a.html")),
            "posts/a.html"
        );
        assert_eq!(
            relative_link(Path::new("blog/tags/rust.html"), Path::new("blog/posts/a.html")),
            "../posts/a.html"
        );
        assert_eq!(
            relative_link(Path::new("blog/posts/a.html"), Path::new("blog/tags/rust.html")),
            "../tags/rust.html"
        );
        assert_eq!(
            relative_link(Path::new("blog/blog-page-2.html"), Path::new("blog/index.html")),
            "index.html"
        );
    }

    #[test]
    fn test_relative_link_across_levels() {
        assert_eq!(
            relative_link(Path::new("about.html"), Path::new("blog/tags/rust.html")),
            "blog/tags/rust.html"
        );
        assert_eq!(
            relative_link(Path::new("docs/guide/intro.html"), Path::new("index.html")),
            "../../index.html"
        );
    }

    #[test]
    fn test_relative_link_same_named_dir_and_file() {
        assert_eq!(
            relative_link(Path::new("blog/blog/x.html"), Path::new("blog/blog")),
            "../blog"
        );
    }
}
