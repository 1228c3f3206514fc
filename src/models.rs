use serde::{Deserialize, Serialize};

/// A single matched failure, owned by the tracker until it is evicted
/// or the address is banned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub address: String,
    /// Seconds since epoch, supplied by the caller.
    pub timestamp: f64,
    pub raw_line: String,
}

/// A banned address with its expiry bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanEntry {
    pub address: String,
    pub banned_at: f64,
    pub expires_at: f64,
    /// How many times this address has been banned so far.
    pub ban_count: u32,
}

impl BanEntry {
    pub fn is_expired_at(&self, as_of: f64) -> bool {
        as_of >= self.expires_at
    }
}

/// Outcome of `Jail::process_line`. Every line yields exactly one of
/// these; line processing never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// No registered pattern matched the line.
    NoMatch,
    /// The line hit an ignore pattern, or the extracted address is on
    /// the ignore list.
    Ignored,
    /// A pattern matched, but the captured token is not a valid IP.
    InvalidAddress { address: String },
    /// The address is already banned; the match is reported but no
    /// further failures accumulate.
    AlreadyBanned { address: String },
    /// Failure recorded, threshold not reached yet.
    Recorded { address: String, failures: usize },
    /// This call transitioned the address into the banned state.
    Banned {
        address: String,
        expires_at: f64,
        ban_count: u32,
    },
}

/// Point-in-time snapshot of a jail's mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JailStatus {
    pub name: String,
    pub maxretry: u32,
    pub findtime: f64,
    pub bantime: f64,
    /// Addresses with in-window failures and their current counts.
    pub tracked: Vec<(String, usize)>,
    /// Active (non-expired) bans.
    pub banned: Vec<BanEntry>,
}
