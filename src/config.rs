use serde::{Deserialize, Serialize};

use crate::error::{JailError, Result};
use crate::ipaddr;

/// Jail parameters. The engine never reads configuration files itself;
/// callers hand over an already-parsed value (the serde derives exist so
/// an outer loader can deserialize straight into this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JailConfig {
    /// Number of failures within `findtime` before a ban
    #[serde(default = "default_maxretry")]
    pub maxretry: u32,

    /// Sliding window width in seconds
    #[serde(default = "default_findtime")]
    pub findtime: f64,

    /// Ban duration in seconds
    #[serde(default = "default_bantime")]
    pub bantime: f64,

    /// Failure patterns tried in order; `<HOST>` marks the offender
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Lines matching any of these are skipped outright
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Addresses that are never recorded or banned
    #[serde(default)]
    pub ignoreip: Vec<String>,

    /// Optional bantime escalation: the n-th ban of an address lasts
    /// `bantime * ban_factor^(n-1)`. Unset keeps bantime constant.
    #[serde(default)]
    pub ban_factor: Option<f64>,
}

impl Default for JailConfig {
    fn default() -> Self {
        Self {
            maxretry: default_maxretry(),
            findtime: default_findtime(),
            bantime: default_bantime(),
            patterns: Vec::new(),
            ignore_patterns: Vec::new(),
            ignoreip: Vec::new(),
            ban_factor: None,
        }
    }
}

impl JailConfig {
    /// Reject unusable parameter combinations before any jail is built.
    pub fn validate(&self) -> Result<()> {
        if self.maxretry == 0 {
            return Err(JailError::Config("maxretry must be positive".to_string()));
        }
        if !self.findtime.is_finite() || self.findtime < 0.0 {
            return Err(JailError::Config(format!(
                "findtime must be a non-negative number of seconds, got {}",
                self.findtime
            )));
        }
        if !self.bantime.is_finite() || self.bantime < 0.0 {
            return Err(JailError::Config(format!(
                "bantime must be a non-negative number of seconds, got {}",
                self.bantime
            )));
        }
        if let Some(factor) = self.ban_factor {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(JailError::Config(format!(
                    "ban_factor must be a positive number, got {factor}"
                )));
            }
        }
        for ip in &self.ignoreip {
            if !ipaddr::is_valid_ip(ip) {
                return Err(JailError::Config(format!("invalid ignoreip entry: {ip}")));
            }
        }
        Ok(())
    }
}

// Default value functions
fn default_maxretry() -> u32 {
    5
}

fn default_findtime() -> f64 {
    600.0 // 10 minutes
}

fn default_bantime() -> f64 {
    600.0
}
