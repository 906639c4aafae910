// # ipwatch-core
//
// Core library for public IP change detection.
//
// ## Architecture Overview
//
// - **AddressResolver**: Trait for discovering the current public addresses
// - **Notifier**: Trait for delivering a text alert to a channel
// - **HistoryStore**: Trait for the durable, append-only address history
// - **ChangeDetector**: Compares a fresh candidate with the last snapshot
// - **QueryService**: Read-only reporting over the history
// - **IpWatchEngine**: Serializes checks and exposes the front-end operations
//
// ## Design Principles
//
// 1. **History is the source of truth**: persist first, notify second
// 2. **Library-First**: The daemon is a thin layer over this crate
// 3. **No scheduling in the core**: checks run on externally supplied triggers

pub mod traits;
pub mod snapshot;
pub mod detector;
pub mod query;
pub mod engine;
pub mod config;
pub mod error;
pub mod report;
pub mod state;

// Re-export core types for convenience
pub use traits::{AddressResolver, HistoryStore, Notifier};
pub use snapshot::{AddressCandidate, AddressSnapshot, History, Ipv6Record, IPV6_UNAVAILABLE};
pub use detector::{ChangeDetector, DeliveryStatus, DetectionOutcome};
pub use query::QueryService;
pub use engine::IpWatchEngine;
pub use config::{EngineConfig, HistoryStoreConfig, IpWatchConfig, NotifierConfig, ResolverConfig};
pub use error::{Error, Result};
pub use state::{FileHistoryStore, MemoryHistoryStore};
