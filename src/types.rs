//! Public and internal types for the strokes2font API and pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ItemError;
use crate::package::PackageConfig;
use crate::utils::config::Defaults;

/// One input file carried through the full pipeline. Immutable once queued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// File name relative to the source root (e.g. `a.svg`). Unique within a run.
    pub id: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl Item {
    /// Derive source and destination paths from `id` under the two roots.
    pub fn new(id: impl Into<String>, source_root: &Path, destination_root: &Path) -> Self {
        let id = id.into();
        Self {
            source: source_root.join(&id),
            destination: destination_root.join(&id),
            id,
        }
    }
}

/// Per-item result collected by the completion gate.
#[derive(Debug)]
pub struct CompletionRecord {
    pub item: Item,
    pub result: Result<(), ItemError>,
}

impl CompletionRecord {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a whole run: one record per submitted item, in completion order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub records: Vec<CompletionRecord>,
}

impl RunSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &Item> {
        self.records
            .iter()
            .filter(|r| r.is_success())
            .map(|r| &r.item)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Item, &ItemError)> {
        self.records
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (&r.item, e)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.records.iter().all(CompletionRecord::is_success)
    }
}

/// Which vector operation the external tool applies to each item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeMode {
    /// Ungroup everything, then convert strokes to filled outlines.
    #[default]
    StrokeToPath,
    /// Break paths apart, then fill the area between them.
    FillBetweenPaths,
}

impl StrokeMode {
    /// Action list passed to the external tool's `--actions` flag.
    pub fn actions(self) -> &'static str {
        match self {
            StrokeMode::StrokeToPath => {
                "select-all;selection-ungroup;select-all;object-stroke-to-path;"
            }
            StrokeMode::FillBetweenPaths => {
                "select-all;path-break-apart;select-all;path-fill-between-paths;"
            }
        }
    }
}

/// What to do with the packaging step when some items failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Package whatever succeeded and warn about the rest.
    #[default]
    Proceed,
    /// Skip packaging and fail the run.
    Abort,
}

/// Full options for a run (CLI, config file and lib).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Directory containing the input files. Required.
    pub source: Option<PathBuf>,
    /// Final packaged output directory.
    pub destination: PathBuf,
    /// Directory for per-item intermediate outputs handed to the packager.
    pub temp: PathBuf,
    /// Max pipelines in flight. Minimum 1.
    pub concurrency: usize,
    /// Only files ending in `.<extension>` are selected.
    pub extension: String,
    pub mode: StrokeMode,
    /// External vector tool binary.
    pub inkscape: PathBuf,
    /// Font packager binary.
    pub packager: PathBuf,
    /// Kill the external tool if one item takes longer than this.
    pub timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
    /// Show progress bar and debug logs.
    pub verbose: bool,
    /// Remove leftover `*.<extension>` files from temp before the run so stale outputs are
    /// not packaged.
    pub clean_temp: bool,
    pub package: PackageConfig,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            source: None,
            destination: PathBuf::from(Defaults::DESTINATION),
            temp: PathBuf::from(Defaults::TEMP),
            concurrency: Defaults::CONCURRENCY,
            extension: Defaults::EXTENSION.to_string(),
            mode: StrokeMode::default(),
            inkscape: PathBuf::from(Defaults::INKSCAPE),
            packager: PathBuf::from(Defaults::PACKAGER),
            timeout: None,
            failure_policy: FailurePolicy::default(),
            verbose: false,
            clean_temp: true,
            package: PackageConfig::default(),
        }
    }
}

impl Opts {
    /// Reject settings the run cannot honor. Returns the source directory on success.
    pub fn validate(&self) -> anyhow::Result<&Path> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.extension.trim_start_matches('.').is_empty() {
            anyhow::bail!("extension must not be empty");
        }
        self.source
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no source directory given (use --source or [settings].source)"))
    }
}
