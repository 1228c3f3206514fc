//! End-to-end jail lifecycle scenarios driven through the public API.

use logjail::{ipaddr, Jail, JailConfig, MatchOutcome};

fn ssh_config() -> JailConfig {
    JailConfig {
        maxretry: 3,
        findtime: 60.0,
        bantime: 120.0,
        patterns: vec!["Failed password for .* from <HOST>".to_string()],
        ..JailConfig::default()
    }
}

fn failed_line(ip: &str) -> String {
    format!("Failed password for invalid user admin from {ip} port 2222 ssh2")
}

#[test]
fn test_ban_lifecycle_from_log_lines_to_expiry() {
    let jail = Jail::new("sshd", ssh_config()).unwrap();

    assert_eq!(
        jail.process_line(&failed_line("1.2.3.4"), 0.0),
        MatchOutcome::Recorded {
            address: "1.2.3.4".to_string(),
            failures: 1
        }
    );
    assert_eq!(
        jail.process_line(&failed_line("1.2.3.4"), 10.0),
        MatchOutcome::Recorded {
            address: "1.2.3.4".to_string(),
            failures: 2
        }
    );
    assert_eq!(
        jail.process_line(&failed_line("1.2.3.4"), 20.0),
        MatchOutcome::Banned {
            address: "1.2.3.4".to_string(),
            expires_at: 140.0,
            ban_count: 1
        }
    );

    assert!(jail.is_banned("1.2.3.4", 119.0));
    assert!(!jail.is_banned("1.2.3.4", 141.0));
    assert!(jail.banned_addresses(141.0).is_empty());
}

#[test]
fn test_unrelated_traffic_leaves_no_trace() {
    let jail = Jail::new("sshd", ssh_config()).unwrap();

    let outcomes = [
        jail.process_line("session opened for user backup", 0.0),
        jail.process_line("Accepted publickey for deploy from 10.1.1.1 port 22", 1.0),
        jail.process_line("", 2.0),
    ];
    assert!(outcomes.iter().all(|o| *o == MatchOutcome::NoMatch));
    assert!(jail.status(3.0).tracked.is_empty());
    assert!(jail.status(3.0).banned.is_empty());
}

#[test]
fn test_distinct_addresses_are_tracked_separately() {
    let jail = Jail::new("sshd", ssh_config()).unwrap();

    for (t, ip) in [(0.0, "1.1.1.1"), (1.0, "2.2.2.2"), (2.0, "1.1.1.1")] {
        jail.process_line(&failed_line(ip), t);
    }
    assert_eq!(jail.failure_count("1.1.1.1", 2.0), 2);
    assert_eq!(jail.failure_count("2.2.2.2", 2.0), 1);
    assert!(jail.banned_addresses(2.0).is_empty());
}

#[test]
fn test_manual_ban_and_explicit_unban() {
    let jail = Jail::new("sshd", ssh_config()).unwrap();

    let entry = jail.ban_ip("203.0.113.99", 50.0).unwrap();
    assert_eq!(entry.banned_at, 50.0);
    assert_eq!(entry.expires_at, 170.0);
    assert_eq!(jail.banned_addresses(60.0), vec!["203.0.113.99".to_string()]);

    assert!(jail.unban("203.0.113.99"));
    // Second unban is a quiet no-op.
    assert!(!jail.unban("203.0.113.99"));
    assert!(!jail.is_banned("203.0.113.99", 60.0));
}

#[test]
fn test_ignoreip_shields_trusted_hosts() {
    let mut config = ssh_config();
    config.maxretry = 1;
    config.ignoreip = vec!["192.168.0.1".to_string()];
    let jail = Jail::new("sshd", config).unwrap();

    assert_eq!(
        jail.process_line(&failed_line("192.168.0.1"), 0.0),
        MatchOutcome::Ignored
    );
    assert!(matches!(
        jail.process_line(&failed_line("192.168.0.2"), 0.0),
        MatchOutcome::Banned { .. }
    ));
}

#[test]
fn test_escalation_doubles_repeat_offender_bans() {
    let mut config = ssh_config();
    config.maxretry = 1;
    config.bantime = 10.0;
    config.ban_factor = Some(2.0);
    let jail = Jail::new("sshd", config).unwrap();

    let expiries: Vec<f64> = [0.0, 20.0, 60.0]
        .iter()
        .map(|&t| match jail.process_line(&failed_line("8.8.4.4"), t) {
            MatchOutcome::Banned { expires_at, .. } => expires_at,
            other => panic!("expected a ban, got {other:?}"),
        })
        .collect();

    // 10s, then 20s, then 40s.
    assert_eq!(expiries, vec![10.0, 40.0, 100.0]);
}

#[test]
fn test_ipv6_offenders_are_first_class() {
    let mut config = ssh_config();
    config.maxretry = 2;
    let jail = Jail::new("sshd", config).unwrap();

    jail.process_line(&failed_line("2001:db8::bad"), 0.0);
    assert!(matches!(
        jail.process_line(&failed_line("2001:db8::bad"), 5.0),
        MatchOutcome::Banned { .. }
    ));
    assert!(jail.is_banned("2001:db8::bad", 100.0));
    assert!(ipaddr::is_valid_ipv6("2001:db8::bad"));
}
