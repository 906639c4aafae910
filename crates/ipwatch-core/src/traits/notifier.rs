// # Notifier Trait
//
// Defines the interface for delivering an alert to a configured channel.
//
// ## Implementations
//
// - Telegram: `ipwatch-notify-telegram` crate

use async_trait::async_trait;

/// Trait for notification channel implementations
///
/// # Contract
///
/// - Single-shot: one delivery attempt per call, no retry loop.
/// - Failures are returned, never panicked; the caller logs them and keeps
///   the already persisted history.
/// - Credentials must never appear in returned errors or logs.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a plain text message
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The channel accepted the message
    /// - `Err(Error)`: Delivery failed (usually `Error::DeliveryFailed`)
    async fn send(&self, text: &str) -> Result<(), crate::Error>;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}
