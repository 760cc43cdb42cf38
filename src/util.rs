//! Shared utility functions.

/// File-name slug of a tag: spaces become dashes, nothing else changes.
/// "open source" -> "open-source"
pub fn tag_slug(tag: &str) -> String {
    tag.replace(' ', "-")
}
