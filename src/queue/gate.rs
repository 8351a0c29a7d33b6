//! Completion gate: collects one record per submitted item and opens exactly once.

use crate::CompletionRecord;

/// Run-wide progress of the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeSignal {
    /// Items may still be submitted.
    Pending,
    /// Submission closed, some items still running.
    Draining,
    /// Every submitted item has a record.
    Drained,
}

/// Every record of the run, handed out once when the gate opens.
#[derive(Debug)]
pub struct Drained {
    pub records: Vec<CompletionRecord>,
}

#[derive(Debug)]
pub struct CompletionGate {
    expected: usize,
    records: Vec<CompletionRecord>,
    signal: OutcomeSignal,
    fired: bool,
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionGate {
    pub fn new() -> Self {
        Self {
            expected: 0,
            records: Vec::new(),
            signal: OutcomeSignal::Pending,
            fired: false,
        }
    }

    pub fn signal(&self) -> OutcomeSignal {
        self.signal
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Count one more submitted item. Ignored once submission is sealed.
    pub fn expect_one(&mut self) {
        if self.signal == OutcomeSignal::Pending {
            self.expected += 1;
        }
    }

    /// Close submission. With nothing outstanding (including zero items) the gate opens here.
    pub fn seal(&mut self) -> Option<Drained> {
        if self.signal != OutcomeSignal::Pending {
            return None;
        }
        self.signal = OutcomeSignal::Draining;
        self.try_open()
    }

    /// Add one item's record. Returns the full set exactly once, on the last record.
    pub fn record(&mut self, record: CompletionRecord) -> Option<Drained> {
        if self.fired {
            log::warn!("record for '{}' arrived after drain; ignored", record.item.id);
            return None;
        }
        self.records.push(record);
        self.try_open()
    }

    /// Open with whatever arrived. Only for a queue whose workers vanished without reporting.
    pub fn force_open(&mut self) -> Drained {
        self.signal = OutcomeSignal::Drained;
        self.fired = true;
        Drained {
            records: std::mem::take(&mut self.records),
        }
    }

    fn try_open(&mut self) -> Option<Drained> {
        if self.fired || self.signal != OutcomeSignal::Draining || self.records.len() < self.expected
        {
            return None;
        }
        self.signal = OutcomeSignal::Drained;
        self.fired = true;
        Some(Drained {
            records: std::mem::take(&mut self.records),
        })
    }
}
