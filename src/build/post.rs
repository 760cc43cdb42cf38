//! Loading markdown posts into typed records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::document::{PostFrontMatter, parse_front_matter, yaml_scalar_to_string};
use super::markdown::{MarkdownOptions, render_markdown};
use super::truncate::truncate_html;

/// Input format of the `date` front matter field.
pub const DATE_INPUT_FORMAT: &str = "%d.%m.%Y";
/// How dates are shown on pages, e.g. "Mar 5, 2024".
pub const DATE_DISPLAY_FORMAT: &str = "%b %-d, %Y";

#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{path}: missing required `title` in front matter")]
    MissingTitle { path: PathBuf },
    #[error("{path}: missing required `date` in front matter")]
    MissingDate { path: PathBuf },
    #[error("{path}: invalid date '{value}', expected DD.MM.YYYY")]
    InvalidDate { path: PathBuf, value: String },
    #[error("{path}: tag '{tag}' cannot be used in a file name")]
    InvalidTag { path: PathBuf, tag: String },
    #[error("{first} and {second} both produce {file_name}")]
    DuplicateOutput {
        file_name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// A blog post, fully rendered and ready for page generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub date: NaiveDate,
    /// Front matter order, duplicates removed
    pub tags: Vec<String>,
    /// Output file name, e.g. `my-first-post.html`
    pub html_file_name: String,
    /// Full rendered HTML
    pub content: String,
    /// Truncated HTML for listings
    pub preview_content: String,
    pub source_path: PathBuf,
}

impl Post {
    pub fn formatted_date(&self) -> String {
        format_date(self.date)
    }
}

/// Parse a `DD.MM.YYYY` date.
pub fn parse_post_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_INPUT_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_DISPLAY_FORMAT).to_string()
}

/// Output file name for a post source file: the `.md` extension becomes
/// `.html` and spaces become dashes.
pub fn html_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    format!("{}.html", stem.replace(' ', "-"))
}

/// Load every `*.md` file directly inside `dir`, in file name order.
///
/// A missing directory yields no posts. Everything else that goes wrong
/// (unreadable file, bad front matter, missing title or date, two files
/// mapping to the same output name) is an error.
pub fn load_posts(
    dir: &Path,
    preview_length: Option<usize>,
    markdown: &MarkdownOptions,
) -> Result<Vec<Post>, ContentError> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "posts directory not found, building without posts");
        return Ok(Vec::new());
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ContentError::Io { path, source }
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();

    let mut posts = Vec::with_capacity(files.len());
    let mut outputs: HashMap<String, PathBuf> = HashMap::new();

    for path in files {
        let raw = std::fs::read_to_string(&path).map_err(io_err(&path))?;
        let post = parse_post(&path, &raw, preview_length, markdown)?;

        if let Some(first) = outputs.insert(post.html_file_name.clone(), path.clone()) {
            return Err(ContentError::DuplicateOutput {
                file_name: post.html_file_name,
                first,
                second: path,
            });
        }

        tracing::debug!(post = %post.html_file_name, date = %post.date, "loaded post");
        posts.push(post);
    }

    Ok(posts)
}

/// Build a [`Post`] from the raw text of one markdown file.
pub fn parse_post(
    path: &Path,
    raw: &str,
    preview_length: Option<usize>,
    markdown: &MarkdownOptions,
) -> Result<Post, ContentError> {
    let parsed = parse_front_matter::<PostFrontMatter>(raw).map_err(|source| {
        ContentError::FrontMatter {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let front_matter = parsed.front_matter;

    let title = front_matter
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ContentError::MissingTitle {
            path: path.to_path_buf(),
        })?;

    let date_value = front_matter
        .date
        .as_ref()
        .and_then(yaml_scalar_to_string)
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ContentError::MissingDate {
            path: path.to_path_buf(),
        })?;
    let date = parse_post_date(&date_value).ok_or_else(|| ContentError::InvalidDate {
        path: path.to_path_buf(),
        value: date_value.clone(),
    })?;

    let mut tags: Vec<String> = Vec::new();
    for tag in front_matter.tags.map(|t| t.into_vec()).unwrap_or_default() {
        if !is_file_name_safe(&tag) {
            return Err(ContentError::InvalidTag {
                path: path.to_path_buf(),
                tag,
            });
        }
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let content = render_markdown(&parsed.body, markdown);
    let preview_content = match preview_length {
        Some(limit) => truncate_html(&content, limit),
        None => content.clone(),
    };

    Ok(Post {
        title,
        date,
        tags,
        html_file_name: html_file_name(&file_name),
        content,
        preview_content,
        source_path: path.to_path_buf(),
    })
}

/// Tags name their listing files, so they must stay inside the tags directory.
fn is_file_name_safe(tag: &str) -> bool {
    !tag.is_empty() && !tag.contains(['/', '\\'])
}

/// Newest first. Posts sharing a date keep their load order.
pub fn sort_posts(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}
