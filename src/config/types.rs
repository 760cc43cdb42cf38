//! Configuration type definitions.
//!
//! This module contains all the data structures used in quire configuration files.
//! These types are pure data - no I/O or complex logic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// =============================================================================
// Root config
// =============================================================================

/// Site configuration - everything one build needs to know.
///
/// Constructed once at build start and handed to every stage by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteSection,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub blog: BlogConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

impl SiteConfig {
    /// Create a config with defaults for everything except the site name.
    #[cfg(test)]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            site: SiteSection {
                name: name.into(),
                output: default_output(),
            },
            paths: PathsConfig::default(),
            blog: BlogConfig::default(),
            assets: AssetsConfig::default(),
        }
    }

    /// Rebase every relative path in the config onto `base_path`.
    pub fn resolve_paths(&mut self, base_path: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_path.join(&*path);
            }
        };

        resolve(&mut self.site.output);
        resolve(&mut self.paths.posts);
        resolve(&mut self.paths.content);
        resolve(&mut self.paths.templates);
        resolve(&mut self.paths.markdown_options);
        if let Some(assets) = self.paths.assets.as_mut() {
            resolve(assets);
        }
    }
}

// =============================================================================
// Site section
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSection {
    pub name: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("public")
}

// =============================================================================
// Input paths
// =============================================================================

/// Where the build reads its inputs from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory of markdown posts
    #[serde(default = "default_posts")]
    pub posts: PathBuf,
    /// Directory tree of hand-written HTML pages (mirrored into the output)
    #[serde(default = "default_content")]
    pub content: PathBuf,
    /// Directory holding `post-template.html`, `layout-template.html`, etc.
    #[serde(default = "default_templates")]
    pub templates: PathBuf,
    /// Static assets copied to `<output>/assets` (skipped when missing)
    #[serde(default = "default_assets")]
    pub assets: Option<PathBuf>,
    /// JSON file with markdown renderer options
    #[serde(default = "default_markdown_options")]
    pub markdown_options: PathBuf,
}

fn default_posts() -> PathBuf {
    PathBuf::from("src/posts")
}

fn default_content() -> PathBuf {
    PathBuf::from("src/content")
}

fn default_templates() -> PathBuf {
    PathBuf::from("src/templates")
}

fn default_assets() -> Option<PathBuf> {
    Some(PathBuf::from("src/assets"))
}

fn default_markdown_options() -> PathBuf {
    PathBuf::from("marked.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts: default_posts(),
            content: default_content(),
            templates: default_templates(),
            assets: default_assets(),
            markdown_options: default_markdown_options(),
        }
    }
}

// =============================================================================
// Blog settings
// =============================================================================

/// Blog generation settings. Output directories are relative to the site output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
    /// Preview budget in visible characters; `None` keeps the full post
    #[serde(default = "default_preview_length")]
    pub preview_length: Option<usize>,
    #[serde(default = "default_blog_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_blog_posts_dir")]
    pub posts_dir: PathBuf,
    #[serde(default = "default_blog_tags_dir")]
    pub tags_dir: PathBuf,
    #[serde(default = "default_blog_title")]
    pub title: String,
}

fn default_posts_per_page() -> usize {
    5
}

fn default_preview_length() -> Option<usize> {
    Some(250)
}

fn default_blog_output_dir() -> PathBuf {
    PathBuf::from("blog")
}

fn default_blog_posts_dir() -> PathBuf {
    PathBuf::from("blog/posts")
}

fn default_blog_tags_dir() -> PathBuf {
    PathBuf::from("blog/tags")
}

fn default_blog_title() -> String {
    "Blog".to_string()
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            preview_length: default_preview_length(),
            output_dir: default_blog_output_dir(),
            posts_dir: default_blog_posts_dir(),
            tags_dir: default_blog_tags_dir(),
            title: default_blog_title(),
        }
    }
}

// =============================================================================
// Shared asset locations
// =============================================================================

/// Asset paths relative to the output root. Every page links them through a
/// depth-relative prefix so the same layout works at any directory level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    #[serde(default = "default_favicon")]
    pub favicon: String,
    #[serde(default = "default_script")]
    pub script: String,
    #[serde(default = "default_git_logo")]
    pub git_logo: String,
}

fn default_stylesheet() -> String {
    "styles/styles.css".to_string()
}

fn default_favicon() -> String {
    "assets/favicon.webp".to_string()
}

fn default_script() -> String {
    "js/bundle.js".to_string()
}

fn default_git_logo() -> String {
    "assets/github-icon.svg".to_string()
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            stylesheet: default_stylesheet(),
            favicon: default_favicon(),
            script: default_script(),
            git_logo: default_git_logo(),
        }
    }
}
