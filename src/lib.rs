//! strokes2font: turn a directory of SVG strokes into an icon font.
//!
//! Each file goes through a fixed chain (namespace substitution → external vector tool →
//! SVG optimizer) with at most `concurrency` files in flight. Once every file has a result,
//! the finished documents are handed to a font packager.

pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod package;
pub mod pipeline;
pub mod queue;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::{ItemError, QueueError};
pub use orchestrator::{RunState, build_font};
pub use types::*;

/// Result alias used by public strokes2font API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
