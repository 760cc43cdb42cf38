//! File writing stage.
//!
//! Writes the final HTML output to the filesystem.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingPage, Stage};

/// Stage that writes laid-out pages to the output directory.
///
/// This stage takes the final HTML from `page.output_html` and writes
/// it to the page's location in the output directory, creating any
/// necessary parent directories.
pub struct WriteStage;

impl Stage for WriteStage {
    fn name(&self) -> &'static str {
        "write"
    }

    fn process(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for page in pages {
            let html = page.output_html.as_ref().ok_or_else(|| {
                PipelineError::stage(
                    "write",
                    format!(
                        "page '{}' has no output HTML (was the layout stage run?)",
                        page.output_path.display()
                    ),
                )
            })?;

            let output_path = ctx.output_dir.join(&page.output_path);
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent).map_err(PipelineError::io(parent))?;
            }

            std::fs::write(&output_path, html).map_err(PipelineError::io(&output_path))?;
            tracing::debug!(path = %page.output_path.display(), "wrote page");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::render::Template;
    use crate::config::AssetsConfig;
    use std::path::PathBuf;

    #[test]
    fn test_unrendered_page_is_an_error() {
        let out = tempfile::tempdir().unwrap();
        let layout = Template::from_source("layout-template.html", "");
        let assets = AssetsConfig::default();
        let ctx = PipelineContext::new(out.path(), &layout, &assets, &[], &[]);

        let mut pages = vec![ProcessingPage::new(
            PathBuf::from("a.html"),
            "test",
            "A",
            "",
            String::new(),
        )];
        let err = WriteStage.process(&mut pages, &ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Stage { .. }));
    }
}
