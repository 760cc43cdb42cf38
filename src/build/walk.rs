//! Discovery of the hand-written content tree.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Directory name inside the content tree that holds posts; never mirrored.
pub const RESERVED_POSTS_DIR: &str = "posts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// An `.html` page that gets the layout applied
    Page,
    /// Any other file, copied verbatim
    Static,
    /// A directory, mirrored even when empty
    Directory,
}

/// One item of the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub source: PathBuf,
    /// Path relative to the content root; also the output path
    pub relative: PathBuf,
    pub kind: EntryKind,
}

/// Walk `root` in file name order and classify everything below it.
///
/// Any directory named `posts` is skipped with its contents. A missing
/// root yields nothing.
pub fn discover_content(root: &Path) -> Result<Vec<ContentEntry>, walkdir::Error> {
    if !root.is_dir() {
        tracing::warn!(dir = %root.display(), "content directory not found");
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && entry.file_name() == RESERVED_POSTS_DIR)
        });

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else if is_html(entry.path()) {
            EntryKind::Page
        } else {
            EntryKind::Static
        };

        entries.push(ContentEntry {
            source: entry.path().to_path_buf(),
            relative: relative.to_path_buf(),
            kind,
        });
    }

    Ok(entries)
}

/// Every file below `root`, for verbatim copying under another directory.
pub fn discover_assets(root: &Path) -> Result<Vec<ContentEntry>, walkdir::Error> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Static
        };
        entries.push(ContentEntry {
            source: entry.path().to_path_buf(),
            relative: relative.to_path_buf(),
            kind,
        });
    }
    Ok(entries)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}
