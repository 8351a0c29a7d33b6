//! Scheduling: bounded work queue and the completion gate it drains into.

pub mod gate;
pub mod work_queue;

pub use gate::{CompletionGate, Drained, OutcomeSignal};
pub use work_queue::{QueueStats, WorkQueue};
