//! Bounded work queue: FIFO over submitted items, at most `concurrency` in flight.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::error::{ItemError, QueueError};
use crate::{CompletionRecord, Item};

use super::gate::{CompletionGate, Drained};

/// Live counters, readable while the queue runs.
#[derive(Debug, Default)]
pub struct QueueStats {
    running: AtomicUsize,
    peak: AtomicUsize,
    completed: AtomicUsize,
}

impl QueueStats {
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Highest number of items observed in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

pub struct WorkQueue {
    concurrency: usize,
    pending: VecDeque<Item>,
    ids: HashSet<String>,
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// `concurrency` below 1 is raised to 1.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            pending: VecDeque::new(),
            ids: HashSet::new(),
            stats: Arc::new(QueueStats::default()),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Enqueue `item`. The same id twice is rejected.
    pub fn submit(&mut self, item: Item) -> Result<(), QueueError> {
        if !self.ids.insert(item.id.clone()) {
            return Err(QueueError::DuplicateItem(item.id));
        }
        self.pending.push_back(item);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Process every pending item with `worker` and block until all have a record.
    ///
    /// `on_complete` runs on the calling thread once per item, in completion order. A failing
    /// or panicking worker still produces a record, so the queue always drains. Zero items
    /// drain immediately.
    pub fn run<W, C>(self, worker: W, mut on_complete: C) -> Drained
    where
        W: Fn(&Item) -> Result<(), ItemError> + Sync,
        C: FnMut(&CompletionRecord),
    {
        let WorkQueue {
            concurrency,
            pending,
            stats,
            ..
        } = self;

        let mut gate = CompletionGate::new();
        for _ in &pending {
            gate.expect_one();
        }
        if let Some(drained) = gate.seal() {
            debug!("queue: nothing submitted, drained");
            return drained;
        }

        let workers = concurrency.min(pending.len());
        debug!(
            "queue: {} items, {} workers (concurrency {})",
            pending.len(),
            workers,
            concurrency
        );
        let (item_tx, item_rx) = unbounded::<Item>();
        for item in pending {
            let _ = item_tx.send(item);
        }
        drop(item_tx);
        let (record_tx, record_rx) = unbounded::<CompletionRecord>();

        let drained = thread::scope(|s| {
            for _ in 0..workers {
                let item_rx = item_rx.clone();
                let record_tx = record_tx.clone();
                let worker = &worker;
                let stats = &stats;
                s.spawn(move || worker_loop(&item_rx, &record_tx, worker, stats));
            }
            drop(record_tx);

            while let Ok(record) = record_rx.recv() {
                stats.completed.fetch_add(1, Ordering::SeqCst);
                on_complete(&record);
                if let Some(drained) = gate.record(record) {
                    return Some(drained);
                }
            }
            None
        });

        drained.unwrap_or_else(|| {
            log::error!("queue: workers exited before every item reported");
            gate.force_open()
        })
    }
}

fn worker_loop<W>(
    item_rx: &Receiver<Item>,
    record_tx: &Sender<CompletionRecord>,
    worker: &W,
    stats: &QueueStats,
) where
    W: Fn(&Item) -> Result<(), ItemError> + Sync,
{
    while let Ok(item) = item_rx.recv() {
        let now = stats.running.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak.fetch_max(now, Ordering::SeqCst);
        debug!("{}: started", item.id);
        let result = panic::catch_unwind(AssertUnwindSafe(|| worker(&item)))
            .unwrap_or_else(|payload| Err(ItemError::Panicked(panic_message(payload))));
        stats.running.fetch_sub(1, Ordering::SeqCst);
        if record_tx.send(CompletionRecord { item, result }).is_err() {
            break;
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
