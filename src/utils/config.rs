//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!("{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    /// Config file looked up in the working directory (e.g. `strokes2font.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable for `key`, e.g. `STROKES2FONT_INKSCAPE`.
    pub fn env_var(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix, key.to_uppercase())
    }
}

// ---- Run defaults ----

/// Defaults shared by the CLI, the config file and the lib.
pub struct Defaults;

impl Defaults {
    pub const DESTINATION: &'static str = "./dist/font";
    pub const TEMP: &'static str = "./dist/temp";
    pub const CONCURRENCY: usize = 1;
    pub const EXTENSION: &'static str = "svg";
    pub const INKSCAPE: &'static str = "inkscape";
    pub const PACKAGER: &'static str = "svgtofont";
}

// ---- Pipeline ----

/// Chunking and link sizes for one pipeline instance.
pub struct PipelineConsts;

impl PipelineConsts {
    /// Bytes per chunk read from the source or the external tool. 64 KB.
    pub const CHUNK_SIZE: usize = 64 * 1024;
    /// Chunks buffered between two steps before the sender blocks.
    pub const CHANNEL_CAP: usize = 4;
    /// How often a finished-reading external stage polls for the child's exit.
    pub const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(10);
}

/// Tail of a child's stderr kept for error messages (bytes).
pub const STDERR_TAIL_BYTES: usize = 2 * 1024;
