//! Change detection
//!
//! The ChangeDetector is responsible for:
//! - Asking the AddressResolver for a fresh candidate
//! - Comparing it with the last entry of the history
//! - Appending a new snapshot when the addresses differ
//! - Notifying after the append is durable
//!
//! ## Flow
//!
//! ```text
//! resolve ──► IPv4 missing? ──yes──► ResolutionFailed
//!                 │ no
//!                 ▼
//!           load history ──► same as last? ──yes──► Unchanged
//!                                  │ no
//!                                  ▼
//!                     append + save ──► notify ──► Changed
//! ```
//!
//! Persistence strictly precedes notification. A failed save ends the check
//! with an error and nothing is sent; a failed notification is logged and
//! the new entry stays in the history.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::report;
use crate::snapshot::{AddressCandidate, AddressSnapshot, Ipv6Record};
use crate::traits::{AddressResolver, HistoryStore, Notifier};

/// Result of one detection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// No IPv4 address could be obtained; nothing was recorded or sent
    ResolutionFailed {
        /// Why the lookup failed
        reason: String,
    },

    /// The addresses match the last recorded snapshot
    Unchanged {
        /// The last recorded snapshot
        current: AddressSnapshot,
    },

    /// A new snapshot was appended to the history
    Changed {
        /// The appended snapshot
        snapshot: AddressSnapshot,
        /// The entry it replaced as most recent, if any
        previous: Option<AddressSnapshot>,
        /// What happened to the notification
        delivery: DeliveryStatus,
    },
}

impl DetectionOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, DetectionOutcome::Changed { .. })
    }

    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            DetectionOutcome::ResolutionFailed { .. } => "resolution_failed",
            DetectionOutcome::Unchanged { .. } => "unchanged",
            DetectionOutcome::Changed { .. } => "changed",
        }
    }
}

/// Delivery result of the change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The notifier accepted the message
    Delivered,
    /// The notifier failed; the history entry is kept regardless
    Failed {
        /// Error reported by the notifier
        reason: String,
    },
}

/// Compares fresh observations with the history and records changes
pub struct ChangeDetector {
    /// Address resolver for fresh candidates
    resolver: Box<dyn AddressResolver>,

    /// Notifier for change alerts
    notifier: Box<dyn Notifier>,

    /// Durable history
    store: Arc<dyn HistoryStore>,

    /// Upper bound for one resolver call
    resolve_timeout: Duration,
}

impl ChangeDetector {
    /// Create a new change detector
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        notifier: Box<dyn Notifier>,
        store: Arc<dyn HistoryStore>,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            notifier,
            store,
            resolve_timeout,
        }
    }

    /// Run one detection
    ///
    /// # Returns
    ///
    /// - `Ok(DetectionOutcome)`: The check completed (including resolver and
    ///   delivery failures, which are outcomes, not errors)
    /// - `Err(Error)`: The history could not be loaded or saved
    pub async fn check_and_update(&self) -> Result<DetectionOutcome> {
        let (ipv4, ipv6) = match self.resolve_candidate().await {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!("{}", e);
                return Ok(DetectionOutcome::ResolutionFailed {
                    reason: e.to_string(),
                });
            }
        };

        let mut history = self.store.load().await?;

        if let Some(last) = history.last()
            && last.has_addresses(&ipv4, &ipv6)
        {
            debug!("Addresses unchanged (IPv4 {}, IPv6 {})", ipv4, ipv6);
            return Ok(DetectionOutcome::Unchanged {
                current: last.clone(),
            });
        }

        let previous = history.last().cloned();
        let snapshot = AddressSnapshot::new(chrono::Utc::now(), ipv4, ipv6);
        history.append(snapshot.clone());

        if let Err(e) = self.store.save(&history).await {
            error!(
                "Failed to persist new snapshot to {} store, not notifying: {}",
                self.store.store_name(),
                e
            );
            return Err(e);
        }

        info!(
            "Recorded address change: IPv4 {} -> {}, IPv6 {} -> {}",
            previous.as_ref().map_or("none", |p| p.ipv4.as_str()),
            snapshot.ipv4,
            previous.as_ref().map_or("none", |p| p.ipv6.as_str()),
            snapshot.ipv6
        );

        let delivery = self.notify(&snapshot).await;

        Ok(DetectionOutcome::Changed {
            snapshot,
            previous,
            delivery,
        })
    }

    /// Resolve with the configured timeout and apply the IPv4 gate
    ///
    /// Every failure comes back as `Error::ResolutionFailed`.
    async fn resolve_candidate(&self) -> Result<(String, Ipv6Record)> {
        let name = self.resolver.resolver_name();
        let candidate: AddressCandidate =
            match tokio::time::timeout(self.resolve_timeout, self.resolver.resolve()).await {
                Ok(Ok(candidate)) => candidate,
                Ok(Err(e)) => return Err(Error::resolution(format!("{}: {}", name, e))),
                Err(_) => {
                    return Err(Error::resolution(format!(
                        "{} did not answer within {:?}",
                        name, self.resolve_timeout
                    )));
                }
            };

        let ipv6 = candidate.recorded_ipv6();
        match candidate.ipv4 {
            Some(ipv4) if !ipv4.trim().is_empty() => Ok((ipv4, ipv6)),
            _ => Err(Error::resolution(format!("{} returned no IPv4 address", name))),
        }
    }

    /// Best-effort notification; never fails the check
    async fn notify(&self, snapshot: &AddressSnapshot) -> DeliveryStatus {
        let text = report::change_message(snapshot);
        match self.notifier.send(&text).await {
            Ok(()) => {
                debug!("Change notification sent via {}", self.notifier.notifier_name());
                DeliveryStatus::Delivered
            }
            Err(e) => {
                warn!(
                    "Failed to deliver change notification via {}: {}",
                    self.notifier.notifier_name(),
                    e
                );
                DeliveryStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
