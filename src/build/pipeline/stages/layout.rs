//! Layout application stage.
//!
//! Wraps each page body in the site-wide layout template.

use crate::build::layout::{LayoutPage, apply_layout};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingPage, Stage};

/// Stage that applies the layout to every page.
///
/// The layout receives the page title, breadcrumb and body, asset paths
/// relative to the page's depth, and the tag menu.
///
/// After this stage, `page.output_html` contains the complete HTML page.
pub struct LayoutStage;

impl Stage for LayoutStage {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn process(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for page in pages {
            let layout_page = LayoutPage {
                output_path: &page.output_path,
                title: &page.title,
                breadcrumb: &page.breadcrumb,
                children: &page.content,
            };
            let html = apply_layout(ctx.layout, &layout_page, ctx.assets, ctx.tag_menu)?;
            page.output_html = Some(html);
        }

        Ok(())
    }
}
