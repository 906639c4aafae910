//! Core traits for ipwatch
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressResolver`]: Discover the current public addresses
//! - [`Notifier`]: Deliver a text alert to a channel
//! - [`HistoryStore`]: Durable storage for the address history

pub mod address_resolver;
pub mod notifier;
pub mod history_store;

pub use address_resolver::AddressResolver;
pub use notifier::Notifier;
pub use history_store::HistoryStore;
