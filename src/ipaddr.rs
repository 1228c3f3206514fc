//! Syntactic IP address validation and free-text address extraction.
//!
//! Everything here is pure and stateless; safe to call from any thread
//! without synchronization.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use regex::Regex;

/// Four dot-separated octets, each 0-255, no leading-zero forms.
pub fn is_valid_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

/// Colon-hex groups with at most one `::` compression and an optional
/// embedded IPv4 tail.
pub fn is_valid_ipv6(s: &str) -> bool {
    s.parse::<Ipv6Addr>().is_ok()
}

pub fn is_valid_ip(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

/// Candidate runs of address characters; validation decides what they are.
fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9A-Fa-f:.]+").expect("valid literal regex"))
}

/// Dotted-quad candidate; the `\b` guards keep matches out of the
/// interior of longer word tokens.
fn ipv4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("valid literal regex"))
}

/// Scan free-form text and return every maximal substring that is a
/// syntactically valid IPv4 or IPv6 address, in left-to-right order.
/// Duplicates are kept; callers may dedupe.
pub fn find_all_ips(text: &str) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = Vec::new();
    let mut v6_spans: Vec<(usize, usize)> = Vec::new();

    for tok in token_re().find_iter(text) {
        if !tok.as_str().contains(':') {
            continue;
        }
        // An address run glued to surrounding word characters is part of
        // a longer token, not an address.
        if has_word_neighbor(text, tok.start(), tok.end()) {
            continue;
        }
        if let Some(v6) = valid_v6_form(tok.as_str()) {
            hits.push((tok.start(), v6.to_string()));
            v6_spans.push((tok.start(), tok.start() + v6.len()));
        }
    }

    for m in ipv4_re().find_iter(text) {
        // Embedded tails like ::ffff:10.0.0.1 were already reported as
        // part of the surrounding IPv6 address.
        if v6_spans.iter().any(|&(s, e)| m.start() >= s && m.end() <= e) {
            continue;
        }
        if is_valid_ipv4(m.as_str()) {
            hits.push((m.start(), m.as_str().to_string()));
        }
    }

    hits.sort_by_key(|&(start, _)| start);
    hits.into_iter().map(|(_, s)| s).collect()
}

fn has_word_neighbor(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start]
        .chars()
        .next_back()
        .map(|c| c.is_alphanumeric() || c == '_')
        .unwrap_or(false);
    let after = text[end..]
        .chars()
        .next()
        .map(|c| c.is_alphanumeric() || c == '_')
        .unwrap_or(false);
    before || after
}

/// A candidate run may drag along trailing sentence punctuation
/// ("fe80::1." at the end of a message); peel it off and re-validate.
fn valid_v6_form(tok: &str) -> Option<&str> {
    let mut t = tok;
    loop {
        if is_valid_ipv6(t) {
            return Some(t);
        }
        let trimmed = t.trim_end_matches('.').trim_end_matches(':');
        if trimmed.len() == t.len() {
            return None;
        }
        t = trimmed;
    }
}
