//! `<HOST>`-placeholder failure patterns.
//!
//! A failure pattern is an ordinary regex with a literal `<HOST>` token
//! standing in for the offending address. Compilation expands the token
//! into a `host` named capture group that accepts IPv4, IPv6, or DNS
//! hostname shaped tokens at that position. The grammars deliberately
//! over-capture (`256.1.1.1` is a legitimate hostname-shaped match);
//! [`crate::ipaddr`] is the authority on whether a capture is an IP.

use regex::Regex;

use crate::error::{JailError, Result};

/// Placeholder token recognized inside failure patterns.
pub const HOST_TOKEN: &str = "<HOST>";

/// Capture group the placeholder expands into. Patterns may also supply
/// this group directly instead of using the placeholder.
pub const HOST_GROUP_NAME: &str = "host";

// Word-boundary-guarded candidate grammars: dotted quad, the common
// IPv6 shapes (hex-led, trailing `::`, leading `::` with optional
// embedded IPv4 tail), and a DNS hostname as the last resort.
const HOST_GROUP: &str = concat!(
    r"(?P<host>",
    r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
    r"|",
    r"\b[0-9A-Fa-f]{1,4}(?:::?[0-9A-Fa-f]{1,4})+(?:::?(?:\d{1,3}\.){3}\d{1,3})?",
    r"|",
    r"\b[0-9A-Fa-f]{1,4}(?::[0-9A-Fa-f]{1,4}){0,6}::",
    r"|",
    r"::(?:[0-9A-Fa-f]{1,4}(?::[0-9A-Fa-f]{1,4})*(?::(?:\d{1,3}\.){3}\d{1,3})?)?",
    r"|",
    r"\b[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
    r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\b",
    r")",
);

/// Result of matching one line against one compiled pattern.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Captured host token. Not yet validated as an IP.
    pub address: String,
    /// Byte span of the full pattern match within the line.
    pub start: usize,
    pub end: usize,
    /// Auxiliary named captures, e.g. a `user` group.
    pub extras: Vec<(String, String)>,
}

/// A compiled failure pattern.
#[derive(Debug, Clone)]
pub struct FailRegex {
    template: String,
    regex: Regex,
}

impl FailRegex {
    /// Compile a failure pattern. Fails on invalid regex syntax, on a
    /// pattern without a `<HOST>` placeholder (or an explicit
    /// `(?P<host>...)` group), and on a placeholder that collides with
    /// an existing `host` capture group.
    pub fn compile(pattern: &str) -> Result<Self> {
        let expanded = if pattern.contains(HOST_TOKEN) {
            pattern.replace(HOST_TOKEN, HOST_GROUP)
        } else if pattern.contains("(?P<host>") || pattern.contains("(?<host>") {
            pattern.to_string()
        } else {
            return Err(JailError::Pattern {
                pattern: pattern.to_string(),
                detail: format!("no {HOST_TOKEN} placeholder or (?P<{HOST_GROUP_NAME}>) group"),
            });
        };

        let regex = Regex::new(&expanded).map_err(|e| JailError::Pattern {
            pattern: pattern.to_string(),
            detail: e.to_string(),
        })?;

        Ok(Self {
            template: pattern.to_string(),
            regex,
        })
    }

    /// The pattern text as registered, placeholder intact.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Match a single line. Substring match, anchored nowhere. Returns
    /// the extracted address, the full matched span, and any auxiliary
    /// named captures.
    pub fn match_line(&self, line: &str) -> Option<MatchResult> {
        let caps = self.regex.captures(line)?;
        let host = caps.name(HOST_GROUP_NAME)?;
        let whole = caps.get(0)?;

        let extras = self
            .regex
            .capture_names()
            .flatten()
            .filter(|name| *name != HOST_GROUP_NAME)
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Some(MatchResult {
            address: host.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
            extras,
        })
    }
}

/// Ignore patterns are plain regexes without the placeholder.
pub fn compile_ignore(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| JailError::Pattern {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })
}
