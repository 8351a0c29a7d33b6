//! Error types for per-item processing and the work queue.

use std::path::PathBuf;

use thiserror::Error;

/// Why one item failed. Every variant is fatal to that item only.
#[derive(Error, Debug)]
pub enum ItemError {
    /// Source file missing or unreadable.
    #[error("cannot read source {path}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An in-process stage rejected the data.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// External tool could not run, exited non-zero, broke its pipe or timed out.
    #[error("external process '{program}' failed: {message}")]
    External { program: String, message: String },

    /// Destination could not be created or written.
    #[error("cannot write destination {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker panicked while processing the item.
    #[error("pipeline panicked: {0}")]
    Panicked(String),
}

/// Errors from building the work queue.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("item '{0}' was already submitted")]
    DuplicateItem(String),
}
