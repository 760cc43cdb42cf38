//! Pipeline context for sharing state across stages.

use std::path::Path;

use super::document::StaticFile;
use crate::build::layout::TagMenuEntry;
use crate::build::render::Template;
use crate::config::AssetsConfig;

/// Shared context for pipeline stages.
///
/// Everything in here is decided before the pipeline starts; stages only
/// read it.
pub struct PipelineContext<'a> {
    // === Output configuration ===
    /// Directory where output files are written
    pub output_dir: &'a Path,

    // === Layout ===
    /// The site-wide layout template
    pub layout: &'a Template,

    /// Asset locations linked from every page
    pub assets: &'a AssetsConfig,

    /// Entries of the layout's tag menu, in first-seen order
    pub tag_menu: &'a [TagMenuEntry],

    // === Files copied as-is ===
    pub static_files: &'a [StaticFile],
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        output_dir: &'a Path,
        layout: &'a Template,
        assets: &'a AssetsConfig,
        tag_menu: &'a [TagMenuEntry],
        static_files: &'a [StaticFile],
    ) -> Self {
        Self {
            output_dir,
            layout,
            assets,
            tag_menu,
            static_files,
        }
    }
}
