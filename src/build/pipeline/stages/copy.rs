//! Static file copying stage.

use crate::build::pipeline::{FinalizeStage, PipelineContext, PipelineError};

/// Finalize stage that mirrors static files and directories into the
/// output directory byte for byte.
pub struct CopyStaticStage;

impl FinalizeStage for CopyStaticStage {
    fn name(&self) -> &'static str {
        "copy-static"
    }

    fn finalize(&self, ctx: &PipelineContext) -> Result<(), PipelineError> {
        for file in ctx.static_files {
            let target = ctx.output_dir.join(&file.output_path);
            if file.is_dir {
                std::fs::create_dir_all(&target).map_err(PipelineError::io(&target))?;
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(PipelineError::io(parent))?;
            }
            std::fs::copy(&file.source, &target).map_err(PipelineError::io(&file.source))?;
            tracing::debug!(path = %file.output_path.display(), "copied static file");
        }

        Ok(())
    }
}
