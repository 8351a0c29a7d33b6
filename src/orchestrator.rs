//! Whole-run orchestration: enumerate, queue, drain, package.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use crate::engine::progress::{item_progress, update_progress_bar};
use crate::engine::{list_items, prepare_dirs, remove_failed_outputs};
use crate::package::{PackageRequest, Packager};
use crate::pipeline::PipelineConfig;
use crate::queue::WorkQueue;
use crate::utils::{Colors, cap_concurrency};
use crate::{FailurePolicy, Opts, RunSummary};

/// Where a run is. `Failed` is reachable from any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Submitting,
    Draining,
    Drained,
    Packaging,
    Done,
    Failed,
}

struct RunTracker {
    state: RunState,
}

impl RunTracker {
    fn advance(&mut self, next: RunState) {
        debug!("run: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Process every matching file under `opts.source` and package the results with `packager`.
///
/// Per-file failures are logged with the file name and never stop the other files. With
/// [`FailurePolicy::Proceed`] the packager still runs on whatever succeeded; with
/// [`FailurePolicy::Abort`] any failure skips packaging and returns an error. A packaging
/// failure is always an error.
pub fn build_font(opts: &Opts, packager: &dyn Packager) -> Result<RunSummary> {
    let mut run = RunTracker {
        state: RunState::Idle,
    };
    let result = run_to_completion(opts, packager, &mut run);
    if result.is_err() {
        run.advance(RunState::Failed);
    }
    result
}

fn run_to_completion(opts: &Opts, packager: &dyn Packager, run: &mut RunTracker) -> Result<RunSummary> {
    let source = opts.validate()?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    prepare_dirs(opts, source)?;
    let items = list_items(source, &opts.temp, &opts.extension)?;

    run.advance(RunState::Submitting);
    let mut queue = WorkQueue::new(cap_concurrency(opts.concurrency));
    for item in items {
        queue.submit(item)?;
    }
    let total = queue.pending();
    info!(
        "Processing {} files ({} at a time)",
        total,
        queue.concurrency()
    );

    run.advance(RunState::Draining);
    let pipeline = PipelineConfig::from_opts(opts);
    let bar = item_progress(opts.verbose, total);
    let drained = queue.run(
        |item| pipeline.process(item),
        |record| {
            match &record.result {
                Ok(()) => debug!("{}: done", record.item.id),
                Err(e) => error!("{}: {}", record.item.id, e),
            }
            if let Some(bar) = &bar {
                update_progress_bar(bar, 1);
            }
        },
    );
    run.advance(RunState::Drained);

    let summary = RunSummary {
        records: drained.records,
    };
    print_summary(&summary);
    remove_failed_outputs(&summary.records);

    let failed = summary.failed().count();
    if failed > 0 {
        if opts.failure_policy == FailurePolicy::Abort {
            anyhow::bail!(
                "{} of {} files failed; packaging skipped (strict mode)",
                failed,
                summary.records.len()
            );
        }
        warn!(
            "{} of {} files failed; packaging the rest",
            failed,
            summary.records.len()
        );
    } else {
        info!("All files processed successfully");
    }

    run.advance(RunState::Packaging);
    let request = PackageRequest {
        input_dir: &opts.temp,
        output_dir: &opts.destination,
        items: summary.succeeded().map(|item| item.id.clone()).collect(),
        config: &opts.package,
    };
    packager
        .package(&request)
        .with_context(|| format!("packaging into {}", opts.destination.display()))?;
    run.advance(RunState::Done);
    info!("Done! Font written to {}", opts.destination.display());
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    let succeeded = summary.succeeded().count();
    let failed = summary.failed().count();
    info!(
        "{} | {}",
        Colors::colorize(Colors::SUCCEEDED, &format!("Succeeded: {}", succeeded)),
        Colors::colorize(Colors::FAILED, &format!("Failed: {}", failed))
    );
}
