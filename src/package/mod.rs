//! Packaging collaborator: turns the directory of finished glyphs into a font.

pub mod command;
pub mod config;

pub use command::{CommandPackager, PACKAGER_RC_FILENAME};
pub use config::{Link, PackageConfig, WebsiteConfig};

use std::path::Path;

/// One packaging invocation, made once after every item has finished.
#[derive(Debug)]
pub struct PackageRequest<'a> {
    /// Directory holding the successfully processed documents. May be empty.
    pub input_dir: &'a Path,
    /// Final output directory.
    pub output_dir: &'a Path,
    /// Ids of the items whose outputs are in `input_dir`.
    pub items: Vec<String>,
    pub config: &'a PackageConfig,
}

/// Assembles processed documents into the packaged artifact.
pub trait Packager {
    fn package(&self, request: &PackageRequest) -> anyhow::Result<()>;
}
