//! Stage contract: every step between source and sink consumes an input link and feeds an
//! output link. In-process steps implement the simpler [`Transform`] and get wrapped.

use crossbeam_channel::{Receiver, Sender};

use crate::error::ItemError;

use super::context::{Chunk, PipelineContext, send_chunk};

/// One ordered step of a pipeline instance. A fresh value is built per item.
pub trait Stage: Send {
    fn name(&self) -> &str;

    /// Pull from `input` until it closes, push results to `output`.
    ///
    /// Return `Ok(())` without flushing when `ctx.is_failed()` or when `output` is closed;
    /// another step already owns the error in that case.
    fn run(
        &mut self,
        input: &Receiver<Chunk>,
        output: &Sender<Chunk>,
        ctx: &PipelineContext,
    ) -> Result<(), ItemError>;
}

/// In-process, synchronous chunk transform. May buffer within one item.
pub trait Transform: Send {
    fn name(&self) -> &str;

    /// Consume one chunk; return whatever is ready to go downstream.
    fn transform(&mut self, chunk: Chunk) -> Result<Vec<Chunk>, String>;

    /// Input ended; return anything still buffered.
    fn finish(&mut self) -> Result<Vec<Chunk>, String>;
}

/// Runs a [`Transform`] as a [`Stage`].
pub struct TransformStage<T: Transform> {
    inner: T,
}

impl<T: Transform> TransformStage<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Transform> Stage for TransformStage<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn run(
        &mut self,
        input: &Receiver<Chunk>,
        output: &Sender<Chunk>,
        ctx: &PipelineContext,
    ) -> Result<(), ItemError> {
        let name = self.inner.name().to_string();
        let stage_err = |message: String| ItemError::Stage {
            stage: name.clone(),
            message,
        };
        while let Ok(chunk) = input.recv() {
            let ready = self.inner.transform(chunk).map_err(stage_err)?;
            for out in ready {
                if !send_chunk(output, out) {
                    return Ok(());
                }
            }
        }
        if ctx.is_failed() {
            return Ok(());
        }
        let rest = self.inner.finish().map_err(stage_err)?;
        for out in rest {
            if !send_chunk(output, out) {
                break;
            }
        }
        Ok(())
    }
}
