//! Pipeline composer: one item through source reader → stages → destination writer.
//!
//! Every step runs on its own scoped thread, linked by bounded channels:
//!
//! ```text
//! source ──▶ substitute ──▶ external ──▶ optimize ──▶ sink
//! ```
//!
//! The first error from any step is recorded in the [`PipelineContext`]; the steps after it
//! see their input close, notice the failure and stop without flushing. Exactly one
//! `Result` comes back per item. Partial destination files may remain after a failure.

use crossbeam_channel::{Receiver, Sender};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::thread;

use crate::error::ItemError;
use crate::utils::config::PipelineConsts;
use crate::{Item, Opts};

use super::context::{Chunk, PipelineContext, chunk_link, send_chunk};
use super::external::{ExternalCommand, ExternalStage};
use super::optimize::Optimize;
use super::stage::{Stage, TransformStage};
use super::substitute::{Substitute, SubstitutionRule};

/// Recipe for the stage chain. Fresh stages are built from it for every item.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Stage 1; skipped when `None`.
    pub substitution: Option<SubstitutionRule>,
    /// Stage 2; skipped when `None`.
    pub external: Option<ExternalCommand>,
    /// Stage 3.
    pub optimize: bool,
    /// Chunks buffered between two steps.
    pub channel_cap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            substitution: Some(SubstitutionRule::default()),
            external: None,
            optimize: true,
            channel_cap: PipelineConsts::CHANNEL_CAP,
        }
    }
}

impl PipelineConfig {
    /// Full three-stage chain: substitution, external tool in `opts.mode`, optimizer.
    pub fn from_opts(opts: &Opts) -> Self {
        Self {
            external: Some(
                ExternalCommand::inkscape(&opts.inkscape, opts.mode).with_timeout(opts.timeout),
            ),
            ..Self::default()
        }
    }

    pub fn build_stages(&self) -> Result<Vec<Box<dyn Stage>>, ItemError> {
        let mut stages: Vec<Box<dyn Stage>> = Vec::new();
        if let Some(rule) = &self.substitution {
            let sub = Substitute::from_rule(rule).map_err(|e| ItemError::Stage {
                stage: "substitute".to_string(),
                message: e.to_string(),
            })?;
            stages.push(Box::new(TransformStage::new(sub)));
        }
        if let Some(command) = &self.external {
            stages.push(Box::new(ExternalStage::new(command.clone())));
        }
        if self.optimize {
            stages.push(Box::new(TransformStage::new(Optimize::new())));
        }
        Ok(stages)
    }

    /// Run one item through a freshly built chain.
    pub fn process(&self, item: &Item) -> Result<(), ItemError> {
        let stages = self.build_stages()?;
        compose(item, stages, self.channel_cap)
    }
}

fn read_source(path: &Path, output: &Sender<Chunk>, ctx: &PipelineContext) -> Result<(), ItemError> {
    let source_err = |source| ItemError::SourceOpen {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(source_err)?;
    loop {
        if ctx.is_failed() {
            return Ok(());
        }
        let mut buf = vec![0u8; PipelineConsts::CHUNK_SIZE];
        let n = match file.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(source_err(e)),
        };
        buf.truncate(n);
        if !send_chunk(output, buf) {
            return Ok(());
        }
    }
}

fn write_sink(path: &Path, input: &Receiver<Chunk>, ctx: &PipelineContext) -> Result<(), ItemError> {
    let write_err = |source| ItemError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
    while let Ok(chunk) = input.recv() {
        writer.write_all(&chunk).map_err(write_err)?;
    }
    if ctx.is_failed() {
        return Ok(());
    }
    writer
        .into_inner()
        .map_err(|e| write_err(e.into_error()))?
        .sync_data()
        .map_err(write_err)
}

/// Drive `item` through `stages` in order and return its single terminal result.
pub fn compose(item: &Item, mut stages: Vec<Box<dyn Stage>>, channel_cap: usize) -> Result<(), ItemError> {
    let ctx = PipelineContext::new(&item.id);
    let cap = channel_cap.max(1);

    thread::scope(|s| {
        let ctx = &ctx;
        let (tx, mut rx) = chunk_link(cap);
        let source = item.source.as_path();
        s.spawn(move || {
            if let Err(e) = read_source(source, &tx, ctx) {
                ctx.fail(e);
            }
        });

        for stage in stages.iter_mut() {
            let (tx, next_rx) = chunk_link(cap);
            let input = rx;
            s.spawn(move || {
                log::trace!("{}: stage '{}' started", ctx.item_id, stage.name());
                if let Err(e) = stage.run(&input, &tx, ctx) {
                    ctx.fail(e);
                }
            });
            rx = next_rx;
        }

        let destination = item.destination.as_path();
        s.spawn(move || {
            if let Err(e) = write_sink(destination, &rx, ctx) {
                ctx.fail(e);
            }
        });
    });

    match ctx.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
