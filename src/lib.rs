//! logjail — log-driven intrusion detection jail.
//!
//! Feed unstructured log lines into a [`Jail`]; it extracts offending
//! addresses through configurable `<HOST>` patterns, counts failures
//! per address inside a sliding time window, and transitions repeat
//! offenders into a bounded-duration banned state. Bans are pure
//! in-memory state; translating them into firewall actions is the
//! surrounding system's business.
//!
//! Timestamps are supplied by the caller (seconds since epoch), never
//! sampled internally, so everything is deterministic under test:
//!
//! ```
//! use logjail::{Jail, JailConfig, MatchOutcome};
//!
//! let config = JailConfig {
//!     maxretry: 3,
//!     findtime: 60.0,
//!     bantime: 120.0,
//!     patterns: vec!["Failed password for .* from <HOST>".to_string()],
//!     ..JailConfig::default()
//! };
//! let jail = Jail::new("sshd", config).unwrap();
//!
//! let line = "Failed password for root from 203.0.113.5 port 22 ssh2";
//! assert_eq!(
//!     jail.process_line(line, 0.0),
//!     MatchOutcome::Recorded { address: "203.0.113.5".into(), failures: 1 }
//! );
//! jail.process_line(line, 10.0);
//! assert!(matches!(
//!     jail.process_line(line, 20.0),
//!     MatchOutcome::Banned { .. }
//! ));
//! assert!(jail.is_banned("203.0.113.5", 119.0));
//! assert!(!jail.is_banned("203.0.113.5", 141.0));
//! ```

pub mod config;
pub mod error;
pub mod ipaddr;
pub mod jail;
pub mod models;
pub mod pattern;
pub mod registry;
pub mod tracker;

pub use config::JailConfig;
pub use error::{JailError, Result};
pub use jail::Jail;
pub use models::{BanEntry, FailureRecord, JailStatus, MatchOutcome};
pub use pattern::{FailRegex, MatchResult};
