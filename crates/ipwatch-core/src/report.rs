//! Plain-text rendering of snapshots and outcomes
//!
//! Front-ends and notifiers may use these helpers; none of the core
//! operations depend on them.

use crate::detector::{DeliveryStatus, DetectionOutcome};
use crate::snapshot::AddressSnapshot;

/// Reply used whenever the history has no entries
pub const NO_DATA: &str = "No IP data recorded yet.";

fn format_time(snapshot: &AddressSnapshot) -> String {
    snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Alert sent when a new snapshot has been recorded
pub fn change_message(snapshot: &AddressSnapshot) -> String {
    format!(
        "🌐 Public IP address changed:\nIPv4: {}\nIPv6: {}",
        snapshot.ipv4, snapshot.ipv6
    )
}

/// Answer to a "last known address" query
pub fn latest_message(latest: Option<&AddressSnapshot>) -> String {
    match latest {
        None => NO_DATA.to_string(),
        Some(snapshot) => format!(
            "📍 Last known IP:\nIPv4: {}\nIPv6: {}\n📅 {}",
            snapshot.ipv4,
            snapshot.ipv6,
            format_time(snapshot)
        ),
    }
}

/// Answer to a "recent history" query; `recent` is most recent first
pub fn recent_message(recent: &[AddressSnapshot]) -> String {
    if recent.is_empty() {
        return NO_DATA.to_string();
    }

    let mut text = format!("🕘 Last {} IP change(s):", recent.len());
    for snapshot in recent {
        text.push_str(&format!(
            "\n\n📅 {}\nIPv4: {}\nIPv6: {}",
            format_time(snapshot),
            snapshot.ipv4,
            snapshot.ipv6
        ));
    }
    text
}

/// Answer to an on-demand check
pub fn outcome_message(outcome: &DetectionOutcome) -> String {
    match outcome {
        DetectionOutcome::ResolutionFailed { reason } => format!("⚠️ {}", reason),
        DetectionOutcome::Unchanged { current } => format!(
            "✅ No change since {}.\nIPv4: {}\nIPv6: {}",
            format_time(current),
            current.ipv4,
            current.ipv6
        ),
        DetectionOutcome::Changed {
            snapshot, delivery, ..
        } => {
            let mut text = change_message(snapshot);
            if let DeliveryStatus::Failed { reason } = delivery {
                text.push_str(&format!("\n(notification failed: {})", reason));
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Ipv6Record;
    use chrono::{TimeZone, Utc};

    fn snapshot(ipv4: &str, ipv6: Ipv6Record) -> AddressSnapshot {
        AddressSnapshot::new(
            Utc.with_ymd_and_hms(2025, 1, 9, 12, 0, 0).unwrap(),
            ipv4,
            ipv6,
        )
    }

    #[test]
    fn test_change_message_lists_both_families() {
        let text = change_message(&snapshot("5.6.7.8", Ipv6Record::Address("::1".into())));
        assert!(text.contains("IPv4: 5.6.7.8"));
        assert!(text.contains("IPv6: ::1"));
    }

    #[test]
    fn test_latest_distinguishes_empty() {
        assert_eq!(latest_message(None), NO_DATA);

        let text = latest_message(Some(&snapshot("1.2.3.4", Ipv6Record::Unavailable)));
        assert!(text.contains("IPv6: unavailable"));
        assert!(text.contains("2025-01-09 12:00:00 UTC"));
    }

    #[test]
    fn test_recent_message() {
        assert_eq!(recent_message(&[]), NO_DATA);

        let text = recent_message(&[
            snapshot("2.2.2.2", Ipv6Record::Unavailable),
            snapshot("1.1.1.1", Ipv6Record::Unavailable),
        ]);
        assert!(text.starts_with("🕘 Last 2 IP change(s):"));
        let newer = text.find("2.2.2.2").unwrap();
        let older = text.find("1.1.1.1").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn test_outcome_message_mentions_failed_delivery() {
        let outcome = DetectionOutcome::Changed {
            snapshot: snapshot("5.6.7.8", Ipv6Record::Unavailable),
            previous: None,
            delivery: DeliveryStatus::Failed {
                reason: "chat not found".to_string(),
            },
        };
        assert!(outcome_message(&outcome).contains("notification failed: chat not found"));
    }
}
