//! Page and file types for pipeline processing.

use std::path::PathBuf;

/// A page being processed through the pipeline.
///
/// Pages enter with their `content` already rendered (post bodies, listing
/// markup, content page regions) and evolve through the stages:
///
/// 1. Initially: `output_html` = None
/// 2. After layout: `output_html` = the full page
/// 3. After write: the page is on disk
#[derive(Debug, Clone)]
pub struct ProcessingPage {
    /// Where the page is written, relative to the output root
    pub output_path: PathBuf,

    /// What produced this page, for error messages
    pub origin: String,

    pub title: String,

    /// Breadcrumb markup for the layout; empty for none
    pub breadcrumb: String,

    /// The page body that goes into the layout's `{{children}}`.
    pub content: String,

    /// Final HTML output after layout application.
    ///
    /// None until the layout stage populates it.
    pub output_html: Option<String>,
}

impl ProcessingPage {
    pub fn new(
        output_path: PathBuf,
        origin: impl Into<String>,
        title: impl Into<String>,
        breadcrumb: impl Into<String>,
        content: String,
    ) -> Self {
        Self {
            output_path,
            origin: origin.into(),
            title: title.into(),
            breadcrumb: breadcrumb.into(),
            content,
            output_html: None,
        }
    }
}

/// A file or directory mirrored into the output without processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    pub source: PathBuf,
    /// Target relative to the output root
    pub output_path: PathBuf,
    /// Directories are created rather than copied
    pub is_dir: bool,
}
