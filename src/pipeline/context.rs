//! Per-item pipeline context: the item being processed and the first error any step hit.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ItemError;

/// One piece of an item's data flowing between steps.
pub type Chunk = Vec<u8>;

/// Shared by every step of one pipeline instance. The first recorded error wins and
/// tells the remaining steps to stop without flushing.
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub item_id: String,
    first_error: Arc<Mutex<Option<ItemError>>>,
}

impl PipelineContext {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            first_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Record `err` unless an earlier step already failed.
    pub fn fail(&self, err: ItemError) {
        let mut slot = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            log::debug!("{}: {}", self.item_id, err);
            *slot = Some(err);
        }
    }

    pub fn is_failed(&self) -> bool {
        self.first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Take the recorded error, leaving the context clean.
    pub fn take_error(&self) -> Option<ItemError> {
        self.first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Bounded link between two steps. A full link blocks the sender, which is how a slow
/// writer throttles the whole chain.
pub fn chunk_link(cap: usize) -> (Sender<Chunk>, Receiver<Chunk>) {
    bounded::<Chunk>(cap)
}

/// Send downstream. Returns false when the receiver is gone (a later step stopped).
pub fn send_chunk(output: &Sender<Chunk>, chunk: Chunk) -> bool {
    if chunk.is_empty() {
        return true;
    }
    output.send(chunk).is_ok()
}
