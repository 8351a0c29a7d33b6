//! CLI command handler: resolve options (defaults < config file < env < flags) and run.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::orchestrator::build_font;
use crate::package::CommandPackager;
use crate::utils::config::PackagePaths;
use crate::utils::{
    apply_file_to_opts, inkscape_override, load_settings_toml, packager_override, setup_logging,
};
use crate::{FailurePolicy, Opts};

/// Build the run options for `cli`, reading config and `.env` files from `cwd`.
pub fn resolve_opts(cli: &Cli, cwd: &Path) -> Result<Opts> {
    let mut opts = Opts::default();

    let (config_path, required) = match &cli.config {
        Some(p) => (p.clone(), true),
        None => (cwd.join(PackagePaths::get().config_filename()), false),
    };
    if let Some(file) = load_settings_toml(&config_path, required)? {
        apply_file_to_opts(&file, &mut opts);
    }

    if let Some(p) = inkscape_override(cwd) {
        opts.inkscape = p;
    }
    if let Some(p) = packager_override(cwd) {
        opts.packager = p;
    }

    if let Some(ref p) = cli.source {
        opts.source = Some(p.clone());
    }
    if let Some(ref p) = cli.destination {
        opts.destination = p.clone();
    }
    if let Some(ref p) = cli.temp {
        opts.temp = p.clone();
    }
    if let Some(n) = cli.concurrency {
        opts.concurrency = n as usize;
    }
    if let Some(mode) = cli.mode {
        opts.mode = mode;
    }
    if let Some(ref ext) = cli.extension {
        opts.extension = ext.trim_start_matches('.').to_string();
    }
    if let Some(ref p) = cli.inkscape {
        opts.inkscape = p.clone();
    }
    if let Some(ref p) = cli.packager {
        opts.packager = p.clone();
    }
    if let Some(secs) = cli.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    if let Some(strict) = cli.strict {
        opts.failure_policy = if strict {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Proceed
        };
    }
    if let Some(verbose) = cli.verbose {
        opts.verbose = verbose;
    }
    if cli.keep_temp {
        opts.clean_temp = false;
    }
    anchor_paths(&mut opts, cwd);
    Ok(opts)
}

/// Make relative paths absolute against `cwd`. The packager runs in another directory, so
/// directories and programs given as `./x` must not depend on the process working dir.
fn anchor_paths(opts: &mut Opts, cwd: &Path) {
    let anchor = |p: &Path| {
        if p.is_relative() {
            cwd.join(p)
        } else {
            p.to_path_buf()
        }
    };
    opts.source = opts.source.as_deref().map(anchor);
    opts.destination = anchor(&opts.destination);
    opts.temp = anchor(&opts.temp);
    // Bare names like `inkscape` are looked up on PATH.
    for program in [&mut opts.inkscape, &mut opts.packager] {
        if program.components().count() > 1 {
            *program = anchor(program);
        }
    }
}

/// Directory the packager runs in: the parent of the temp directory.
fn packager_work_dir(temp: &Path) -> PathBuf {
    temp.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Run the whole conversion. Per-file failures only fail the run in strict mode.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let opts = resolve_opts(cli, &cwd)?;
    setup_logging(opts.verbose);
    debug!("Using external tool {}", opts.inkscape.display());

    let packager = CommandPackager::new(&opts.packager, packager_work_dir(&opts.temp));
    build_font(&opts, &packager)?;
    Ok(())
}
