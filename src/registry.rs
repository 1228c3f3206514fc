//! In-memory ban registry: banned address -> expiry bookkeeping.
//!
//! Entries expire passively when queried; there is no background sweep.
//! A "ban" here is pure state, the surrounding system decides whether it
//! turns into a firewall action.

use std::collections::HashMap;

use crate::models::BanEntry;

#[derive(Debug, Default)]
pub struct BanRegistry {
    bans: HashMap<String, BanEntry>,
    /// Lifetime ban totals per address. Survives expiry and explicit
    /// unban so escalation policies have memory.
    ban_counts: HashMap<String, u32>,
}

impl BanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The count the next ban of `address` would carry.
    pub fn next_ban_count(&self, address: &str) -> u32 {
        self.ban_counts.get(address).copied().unwrap_or(0) + 1
    }

    /// Create or refresh the entry for `address`.
    pub fn ban(&mut self, address: &str, banned_at: f64, bantime: f64) -> BanEntry {
        let count = self.ban_counts.entry(address.to_string()).or_insert(0);
        *count += 1;

        let entry = BanEntry {
            address: address.to_string(),
            banned_at,
            expires_at: banned_at + bantime,
            ban_count: *count,
        };
        self.bans.insert(address.to_string(), entry.clone());
        entry
    }

    /// True iff an entry exists and `as_of` is before its expiry. An
    /// expired entry is removed on the way out.
    pub fn is_banned(&mut self, address: &str, as_of: f64) -> bool {
        match self.bans.get(address) {
            Some(entry) if !entry.is_expired_at(as_of) => true,
            Some(_) => {
                self.bans.remove(address);
                false
            }
            None => false,
        }
    }

    /// Remove any entry regardless of expiry. Idempotent; returns
    /// whether an entry was actually removed.
    pub fn unban(&mut self, address: &str) -> bool {
        self.bans.remove(address).is_some()
    }

    /// Raw entry lookup, no expiry side effects.
    pub fn get(&self, address: &str) -> Option<&BanEntry> {
        self.bans.get(address)
    }

    /// All non-expired banned addresses, sorted; stale entries are
    /// dropped during the scan.
    pub fn banned_addresses(&mut self, as_of: f64) -> Vec<String> {
        self.bans.retain(|_, entry| !entry.is_expired_at(as_of));
        let mut out: Vec<String> = self.bans.keys().cloned().collect();
        out.sort();
        out
    }

    /// All non-expired entries, sorted by address; expires stale ones.
    pub fn entries(&mut self, as_of: f64) -> Vec<BanEntry> {
        self.bans.retain(|_, entry| !entry.is_expired_at(as_of));
        let mut out: Vec<BanEntry> = self.bans.values().cloned().collect();
        out.sort_by(|a, b| a.address.cmp(&b.address));
        out
    }

    pub fn len(&self) -> usize {
        self.bans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bans.is_empty()
    }
}
