use chrono::Utc;
use parking_lot::RwLock;
use std::collections::VecDeque;

use super::record::Record;

/// Bounded, insertion-ordered buffer of recent records.
///
/// Every operation holds the lock for its full duration, so readers observe
/// either the state before an append or the state after it.
pub struct HistoryStore {
    records: RwLock<VecDeque<Record>>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&self, record: Record) {
        let mut records = self.records.write();
        records.push_back(record);
        if records.len() > self.capacity {
            let excess = records.len() - self.capacity;
            records.drain(..excess);
        }
    }

    /// Newest record, or a heartbeat stamped now when nothing was recorded yet.
    pub fn latest(&self) -> Record {
        self.records
            .read()
            .back()
            .cloned()
            .unwrap_or_else(|| Record::heartbeat(Utc::now()))
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.records.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
