//! Build pipeline for generated pages.
//!
//! Every page the build produces (posts, blog listings, tag listings and
//! content pages) goes through the same stages:
//! 1. Layout (wrap the page body in the site layout)
//! 2. Write (output to disk)
//!
//! Finalize stages run once after all pages are written; the default one
//! copies static files and assets.

mod context;
mod document;
mod error;
mod stages;

pub use context::PipelineContext;
pub use document::{ProcessingPage, StaticFile};
pub use error::PipelineError;

use stages::{CopyStaticStage, LayoutStage, WriteStage};

/// A stage in the page processing pipeline.
///
/// Stages transform pages sequentially. Each stage receives all pages
/// and can modify them in place before passing to the next stage.
pub trait Stage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Process pages through this stage.
    fn process(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// A stage that runs once after all pages are processed.
pub trait FinalizeStage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Run finalization after all pages are processed and written.
    fn finalize(&self, ctx: &PipelineContext) -> Result<(), PipelineError>;
}

/// The page processing pipeline.
///
/// The default pipeline is: layout → write, then copy-static.
pub struct Pipeline {
    /// Page processing stages
    stages: Vec<Box<dyn Stage>>,
    /// Build-wide stages (run once after all pages)
    finalize_stages: Vec<Box<dyn FinalizeStage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            finalize_stages: Vec::new(),
        }
    }

    /// Create the default pipeline with standard stages.
    pub fn default_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(LayoutStage);
        pipeline.add_stage(WriteStage);
        pipeline.add_finalize_stage(CopyStaticStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a finalize stage (runs after all pages are processed).
    pub fn add_finalize_stage<S: FinalizeStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.finalize_stages.push(Box::new(stage));
        self
    }

    /// Run the pipeline on a set of pages.
    pub fn run(
        &self,
        pages: &mut [ProcessingPage],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for stage in &self.stages {
            tracing::debug!(stage = stage.name(), pages = pages.len(), "running stage");
            stage.process(pages, ctx)?;
        }

        for stage in &self.finalize_stages {
            tracing::debug!(stage = stage.name(), "running finalize stage");
            stage.finalize(ctx)?;
        }

        Ok(())
    }

    /// Get the names of all stages in order.
    #[cfg(test)]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .map(|s| s.name())
            .chain(self.finalize_stages.iter().map(|s| s.name()))
            .collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}
