//! Sliding-window failure accounting keyed by address.
//!
//! Eviction is lazy: it happens on record and on count, never on a
//! timer. Reads are therefore side-effecting with respect to cleanup.

use std::collections::HashMap;

use crate::models::FailureRecord;

#[derive(Debug, Default)]
struct AddressHistory {
    /// Insertion-ordered; out-of-order timestamps are tolerated.
    records: Vec<FailureRecord>,
    /// Largest timestamp seen so far; the eviction baseline. An
    /// out-of-order insert never lowers it.
    latest: f64,
}

/// Per-address recent-failure histories within a trailing time window.
#[derive(Debug)]
pub struct FailureTracker {
    findtime: f64,
    histories: HashMap<String, AddressHistory>,
}

impl FailureTracker {
    pub fn new(findtime: f64) -> Self {
        Self {
            findtime,
            histories: HashMap::new(),
        }
    }

    /// Append a failure for `address`, then evict everything that fell
    /// out of the window. Returns the in-window count after insertion.
    pub fn record_failure(&mut self, address: &str, timestamp: f64, raw_line: &str) -> usize {
        let findtime = self.findtime;
        let history = self.histories.entry(address.to_string()).or_default();

        if history.records.is_empty() || timestamp > history.latest {
            history.latest = timestamp;
        }
        history.records.push(FailureRecord {
            address: address.to_string(),
            timestamp,
            raw_line: raw_line.to_string(),
        });

        let baseline = history.latest;
        evict(history, baseline, findtime);
        history.records.len()
    }

    /// Count of non-evicted records for `address`. Performs the eviction
    /// pass first; the baseline is additionally advanced by `as_of` for
    /// this pass only, so a future-dated probe cannot poison later
    /// recording.
    pub fn current_count(&mut self, address: &str, as_of: f64) -> usize {
        let findtime = self.findtime;
        let Some(history) = self.histories.get_mut(address) else {
            return 0;
        };

        let baseline = if as_of > history.latest {
            as_of
        } else {
            history.latest
        };
        evict(history, baseline, findtime);

        if history.records.is_empty() {
            self.histories.remove(address);
            return 0;
        }
        history.records.len()
    }

    /// Drop the whole history for `address`, so failures that led to a
    /// ban are not double-counted after unban.
    pub fn reset(&mut self, address: &str) {
        self.histories.remove(address);
    }

    /// In-window counts for every tracked address as of `as_of`, sorted
    /// by address. Evicts on the way through.
    pub fn snapshot(&mut self, as_of: f64) -> Vec<(String, usize)> {
        let addresses: Vec<String> = self.histories.keys().cloned().collect();
        let mut tracked = Vec::new();
        for address in addresses {
            let count = self.current_count(&address, as_of);
            if count > 0 {
                tracked.push((address, count));
            }
        }
        tracked.sort();
        tracked
    }
}

/// Records exactly `findtime` old are evicted (exclusive boundary). A
/// non-positive window degenerates to "this instant only": just the
/// newest record survives.
fn evict(history: &mut AddressHistory, baseline: f64, findtime: f64) {
    if findtime <= 0.0 {
        let len = history.records.len();
        if len > 1 {
            history.records.drain(..len - 1);
        }
        return;
    }
    let cutoff = baseline - findtime;
    history.records.retain(|r| r.timestamp > cutoff);
}
