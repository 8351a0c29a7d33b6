//! Load `strokes2font.toml` (CLI only). Lib callers build [`Opts`] directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::package::PackageConfig;
use crate::{FailurePolicy, Opts, StrokeMode};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsToml {
    #[serde(default)]
    settings: RunSection,
    package: Option<PackageConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunSection {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    temp: Option<PathBuf>,
    concurrency: Option<usize>,
    extension: Option<String>,
    mode: Option<StrokeMode>,
    inkscape: Option<PathBuf>,
    packager: Option<PathBuf>,
    timeout_secs: Option<u64>,
    on_item_failure: Option<FailurePolicy>,
    verbose: Option<bool>,
    clean_temp: Option<bool>,
}

/// Parse settings from TOML text.
pub fn parse_settings_toml(s: &str) -> Result<SettingsToml> {
    Ok(toml::from_str(s)?)
}

/// Load settings from `path`. A missing file is `None` unless `required`.
pub fn load_settings_toml(path: &Path, required: bool) -> Result<Option<SettingsToml>> {
    if !required && !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    parse_settings_toml(&s)
        .with_context(|| format!("parse config {}", path.display()))
        .map(Some)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying env and CLI.
pub fn apply_file_to_opts(file: &SettingsToml, opts: &mut Opts) {
    let sec = &file.settings;
    if let Some(ref p) = sec.source {
        opts.source = Some(p.clone());
    }
    apply_file_opt!(sec, opts, destination => destination);
    apply_file_opt!(sec, opts, temp => temp);
    apply_file_opt!(sec, opts, concurrency => concurrency);
    apply_file_opt!(sec, opts, extension => extension);
    apply_file_opt!(sec, opts, mode => mode);
    apply_file_opt!(sec, opts, inkscape => inkscape);
    apply_file_opt!(sec, opts, packager => packager);
    if let Some(secs) = sec.timeout_secs {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    apply_file_opt!(sec, opts, on_item_failure => failure_policy);
    apply_file_opt!(sec, opts, verbose => verbose);
    apply_file_opt!(sec, opts, clean_temp => clean_temp);
    if let Some(ref package) = file.package {
        opts.package = package.clone();
    }
}
