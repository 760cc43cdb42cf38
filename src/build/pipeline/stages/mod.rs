//! Default pipeline stages.
//!
//! The standard page processing pipeline consists of:
//!
//! 1. **LayoutStage** - Wrap page bodies in the site layout
//! 2. **WriteStage** - Write final HTML to output directory
//!
//! followed by the **CopyStaticStage** finalize stage, which mirrors static
//! files into the output.

mod copy;
mod layout;
mod write;

pub use copy::CopyStaticStage;
pub use layout::LayoutStage;
pub use write::WriteStage;
