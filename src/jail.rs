//! Jail orchestration: pattern matching, windowed failure accounting,
//! and the ban decision policy.
//!
//! A jail owns its tracker and ban registry exclusively; both live
//! behind one mutex, and every state-touching operation holds it for
//! the operation's full duration (lazy eviction included). Time enters
//! only through caller-supplied timestamps, so behavior is fully
//! deterministic under test.

use std::collections::HashSet;

use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, info};

use crate::config::JailConfig;
use crate::error::{JailError, Result};
use crate::ipaddr;
use crate::models::{BanEntry, JailStatus, MatchOutcome};
use crate::pattern::{compile_ignore, FailRegex};
use crate::registry::BanRegistry;
use crate::tracker::FailureTracker;

struct JailState {
    tracker: FailureTracker,
    registry: BanRegistry,
}

/// One detection-and-banning engine instance, typically one per
/// monitored service. Multiple jails coexist independently in a
/// process; there is no shared global state.
pub struct Jail {
    name: String,
    config: JailConfig,
    patterns: Vec<FailRegex>,
    ignores: Vec<Regex>,
    ignoreip: HashSet<String>,
    state: Mutex<JailState>,
}

impl Jail {
    /// Build a jail from already-parsed parameters. Fails fast on an
    /// unusable configuration or an invalid pattern; a half-configured
    /// jail is never returned.
    pub fn new(name: impl Into<String>, config: JailConfig) -> Result<Self> {
        config.validate()?;

        let patterns = config
            .patterns
            .iter()
            .map(|p| FailRegex::compile(p))
            .collect::<Result<Vec<_>>>()?;
        let ignores = config
            .ignore_patterns
            .iter()
            .map(|p| compile_ignore(p))
            .collect::<Result<Vec<_>>>()?;
        let ignoreip = config.ignoreip.iter().cloned().collect();

        let state = Mutex::new(JailState {
            tracker: FailureTracker::new(config.findtime),
            registry: BanRegistry::new(),
        });

        Ok(Self {
            name: name.into(),
            config,
            patterns,
            ignores,
            ignoreip,
            state,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &JailConfig {
        &self.config
    }

    /// Register an additional failure pattern. Registration happens
    /// before ingestion starts; matching itself reads immutable data.
    pub fn register_pattern(&mut self, pattern: &str) -> Result<()> {
        let compiled = FailRegex::compile(pattern)?;
        debug!("jail {}: registered pattern `{}`", self.name, pattern);
        self.patterns.push(compiled);
        Ok(())
    }

    /// Register an additional ignore pattern.
    pub fn register_ignore(&mut self, pattern: &str) -> Result<()> {
        let compiled = compile_ignore(pattern)?;
        debug!("jail {}: registered ignore pattern `{}`", self.name, pattern);
        self.ignores.push(compiled);
        Ok(())
    }

    /// Run one log line through the jail. Never fails: malformed lines,
    /// non-IP captures, and already-banned addresses all come back as
    /// ordinary outcomes.
    pub fn process_line(&self, line: &str, timestamp: f64) -> MatchOutcome {
        let mut state = self.state.lock();

        if self.ignores.iter().any(|r| r.is_match(line)) {
            return MatchOutcome::Ignored;
        }

        // First registered pattern wins.
        let Some(result) = self.patterns.iter().find_map(|p| p.match_line(line)) else {
            return MatchOutcome::NoMatch;
        };
        let address = result.address;

        if !ipaddr::is_valid_ip(&address) {
            debug!(
                "jail {}: match produced non-IP token `{}`",
                self.name, address
            );
            return MatchOutcome::InvalidAddress { address };
        }
        if self.ignoreip.contains(&address) {
            return MatchOutcome::Ignored;
        }

        // A banned address does not accumulate further history, but the
        // match itself is still reported.
        if state.registry.is_banned(&address, timestamp) {
            return MatchOutcome::AlreadyBanned { address };
        }

        state.tracker.record_failure(&address, timestamp, line);
        let failures = state.tracker.current_count(&address, timestamp);

        if failures >= self.config.maxretry as usize {
            let entry = self.apply_ban(&mut state, &address, timestamp);
            info!(
                "jail {}: banned {} after {} failures (expires at {:.0})",
                self.name, address, failures, entry.expires_at
            );
            return MatchOutcome::Banned {
                address,
                expires_at: entry.expires_at,
                ban_count: entry.ban_count,
            };
        }

        debug!(
            "jail {}: failure {}/{} for {}",
            self.name, failures, self.config.maxretry, address
        );
        MatchOutcome::Recorded { address, failures }
    }

    /// Ban without prior failures, for callers that decide out-of-band
    /// (an external deny list, an operator action). The ignore list
    /// guards automatic decisions only and is not consulted here.
    pub fn ban_ip(&self, address: &str, timestamp: f64) -> Result<BanEntry> {
        if !ipaddr::is_valid_ip(address) {
            return Err(JailError::InvalidAddress(address.to_string()));
        }
        let mut state = self.state.lock();
        let entry = self.apply_ban(&mut state, address, timestamp);
        info!("jail {}: banned {} manually", self.name, address);
        Ok(entry)
    }

    /// True iff `address` has a ban that has not expired at `as_of`.
    /// Querying passively expires a stale entry.
    pub fn is_banned(&self, address: &str, as_of: f64) -> bool {
        self.state.lock().registry.is_banned(address, as_of)
    }

    /// Lift a ban regardless of expiry. Idempotent; returns whether a
    /// ban was actually removed.
    pub fn unban(&self, address: &str) -> bool {
        let removed = self.state.lock().registry.unban(address);
        if removed {
            info!("jail {}: unbanned {}", self.name, address);
        }
        removed
    }

    /// All currently banned addresses, sorted; expires stale entries as
    /// a side effect of the scan.
    pub fn banned_addresses(&self, as_of: f64) -> Vec<String> {
        self.state.lock().registry.banned_addresses(as_of)
    }

    /// In-window failure count for `address` (evicts first).
    pub fn failure_count(&self, address: &str, as_of: f64) -> usize {
        self.state.lock().tracker.current_count(address, as_of)
    }

    /// Active ban details for `address`, if any.
    pub fn ban_info(&self, address: &str, as_of: f64) -> Option<BanEntry> {
        let mut state = self.state.lock();
        if state.registry.is_banned(address, as_of) {
            state.registry.get(address).cloned()
        } else {
            None
        }
    }

    /// Point-in-time snapshot, computed under the lock with the usual
    /// lazy-expiry side effects.
    pub fn status(&self, as_of: f64) -> JailStatus {
        let mut state = self.state.lock();
        JailStatus {
            name: self.name.clone(),
            maxretry: self.config.maxretry,
            findtime: self.config.findtime,
            bantime: self.config.bantime,
            tracked: state.tracker.snapshot(as_of),
            banned: state.registry.entries(as_of),
        }
    }

    fn apply_ban(&self, state: &mut JailState, address: &str, timestamp: f64) -> BanEntry {
        let bantime = self.effective_bantime(state.registry.next_ban_count(address));
        let entry = state.registry.ban(address, timestamp, bantime);
        state.tracker.reset(address);
        entry
    }

    fn effective_bantime(&self, ban_count: u32) -> f64 {
        match self.config.ban_factor {
            Some(factor) => self.config.bantime * factor.powi(ban_count.saturating_sub(1) as i32),
            None => self.config.bantime,
        }
    }
}
