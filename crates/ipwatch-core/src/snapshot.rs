//! Address snapshots and the append-only history
//!
//! Two types keep "the resolver found nothing" apart from "recorded as
//! unavailable":
//!
//! - [`AddressCandidate`] is what a resolver returns. Fields are `Option`s
//!   and `None` means the lookup produced nothing this time.
//! - [`AddressSnapshot`] is what the history records. IPv6 is an
//!   [`Ipv6Record`], which is either an address or the durable
//!   `"unavailable"` sentinel.
//!
//! ## File Format
//!
//! ```json
//! [
//!   {
//!     "timestamp": "2025-01-09T12:00:00Z",
//!     "ipv4": "1.2.3.4",
//!     "ipv6": "unavailable"
//!   }
//! ]
//! ```

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel persisted in place of an IPv6 address that could not be obtained
pub const IPV6_UNAVAILABLE: &str = "unavailable";

/// Best-effort result of one address lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressCandidate {
    /// Public IPv4 address, if one was found
    pub ipv4: Option<String>,
    /// Public IPv6 address, if one was found
    pub ipv6: Option<String>,
}

impl AddressCandidate {
    /// Create a candidate from independently optional fields
    pub fn new(ipv4: Option<String>, ipv6: Option<String>) -> Self {
        Self { ipv4, ipv6 }
    }

    /// Candidate with both families resolved
    pub fn dual_stack(ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        Self::new(Some(ipv4.into()), Some(ipv6.into()))
    }

    /// Candidate with only IPv4 resolved
    pub fn ipv4_only(ipv4: impl Into<String>) -> Self {
        Self::new(Some(ipv4.into()), None)
    }

    /// Candidate where nothing resolved
    pub fn empty() -> Self {
        Self::default()
    }

    /// The IPv6 value as it would be recorded in history
    pub fn recorded_ipv6(&self) -> Ipv6Record {
        Ipv6Record::from_raw(self.ipv6.as_deref())
    }
}

/// Recorded IPv6 value
///
/// Serialized as a plain string. `null` in legacy files reads as
/// [`Ipv6Record::Unavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Ipv6Record {
    /// An observed address, kept exactly as resolved
    Address(String),
    /// No IPv6 address could be obtained at observation time
    Unavailable,
}

impl Ipv6Record {
    /// Classify a raw value, fresh or persisted
    ///
    /// Absent, blank and the sentinel itself all mean unavailable. Anything
    /// else is kept verbatim.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(addr) if !addr.trim().is_empty() && addr != IPV6_UNAVAILABLE => {
                Ipv6Record::Address(addr.to_string())
            }
            _ => Ipv6Record::Unavailable,
        }
    }

    /// The persisted string form
    pub fn as_str(&self) -> &str {
        match self {
            Ipv6Record::Address(addr) => addr,
            Ipv6Record::Unavailable => IPV6_UNAVAILABLE,
        }
    }

    /// The address, if one was recorded
    pub fn address(&self) -> Option<&str> {
        match self {
            Ipv6Record::Address(addr) => Some(addr),
            Ipv6Record::Unavailable => None,
        }
    }
}

impl From<Option<String>> for Ipv6Record {
    fn from(value: Option<String>) -> Self {
        Ipv6Record::from_raw(value.as_deref())
    }
}

impl From<Ipv6Record> for String {
    fn from(value: Ipv6Record) -> Self {
        match value {
            Ipv6Record::Address(addr) => addr,
            Ipv6Record::Unavailable => IPV6_UNAVAILABLE.to_string(),
        }
    }
}

impl fmt::Display for Ipv6Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed address pair and the time it was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    /// Observation time, second precision
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    /// Public IPv4 address
    pub ipv4: String,
    /// Public IPv6 address or the unavailable sentinel
    pub ipv6: Ipv6Record,
}

impl AddressSnapshot {
    /// Create a snapshot; sub-second precision is dropped
    pub fn new(timestamp: DateTime<Utc>, ipv4: impl Into<String>, ipv6: Ipv6Record) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            ipv4: ipv4.into(),
            ipv6,
        }
    }

    /// Exact string comparison of both address fields
    ///
    /// No normalization is applied: `::1` and `0:0:0:0:0:0:0:1` differ.
    pub fn has_addresses(&self, ipv4: &str, ipv6: &Ipv6Record) -> bool {
        self.ipv4 == ipv4 && &self.ipv6 == ipv6
    }
}

/// Parse a persisted timestamp
///
/// Accepts RFC 3339 and, for files written without an offset, naive
/// ISO-8601 date-times which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc).trunc_subsecs(0));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().trunc_subsecs(0))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

mod timestamp_format {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Append-only, chronologically ordered address history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<AddressSnapshot>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent snapshot
    pub fn last(&self) -> Option<&AddressSnapshot> {
        self.entries.last()
    }

    /// Append a snapshot at the end
    ///
    /// A timestamp older than the last entry is kept as-is and logged;
    /// ordering is by insertion, not by clock.
    pub fn append(&mut self, snapshot: AddressSnapshot) {
        if let Some(last) = self.entries.last()
            && snapshot.timestamp < last.timestamp
        {
            tracing::warn!(
                "Snapshot timestamp {} is older than the last entry ({}); clock moved backwards?",
                snapshot.timestamp,
                last.timestamp
            );
        }
        self.entries.push(snapshot);
    }

    /// Up to the last `n` entries, most recent first
    pub fn recent(&self, n: usize) -> Vec<AddressSnapshot> {
        self.entries.iter().rev().take(n).cloned().collect()
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[AddressSnapshot] {
        &self.entries
    }
}

impl From<Vec<AddressSnapshot>> for History {
    fn from(entries: Vec<AddressSnapshot>) -> Self {
        Self { entries }
    }
}
