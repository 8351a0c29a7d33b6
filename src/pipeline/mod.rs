//! Pipeline components: stage contract, the three stages, and the per-item composer.

pub mod composer;
pub mod context;
pub mod external;
pub mod optimize;
pub mod stage;
pub mod substitute;

pub use composer::{PipelineConfig, compose};
pub use context::{Chunk, PipelineContext, chunk_link, send_chunk};
pub use external::{ExternalCommand, ExternalStage};
pub use optimize::{Optimize, OptimizeError, optimize_svg};
pub use stage::{Stage, Transform, TransformStage};
pub use substitute::{SVG_NAMESPACE_MARKER, SVG_NAMESPACE_NO_FILL, Substitute, SubstitutionRule};
