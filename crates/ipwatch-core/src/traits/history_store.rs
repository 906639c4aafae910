// # History Store Trait
//
// Defines the interface for the durable address history.
//
// ## Purpose
//
// The history is the single source of truth for change detection:
// - The last entry decides whether a fresh observation is a change
// - The full sequence answers reporting queries
//
// ## Implementations
//
// - File-based: one JSON array per file (`FileHistoryStore`)
// - In-memory: tests and embedding (`MemoryHistoryStore`)
//
// ## Usage
//
// ```rust,ignore
// use ipwatch_core::HistoryStore;
//
// let mut history = store.load().await?;
// history.append(snapshot);
// store.save(&history).await?;
// ```

use async_trait::async_trait;

use crate::snapshot::History;

/// Trait for history store implementations
///
/// The store reads and writes whole histories. There are no partial or
/// incremental writes and no in-place edits.
///
/// # Contract
///
/// - `load()` on a store that has never been written returns an empty
///   history.
/// - `load()` on unreadable content returns `Error::CorruptState` and must
///   not substitute an empty or older history.
/// - `save()` is atomic with respect to readers: a concurrent `load()` sees
///   either the previous or the new complete history.
/// - No business logic: the store never decides what to append.
///
/// Writers are serialized by `IpWatchEngine`; stores only need to be safe
/// for one writer alongside any number of readers.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Read the full history
    ///
    /// # Returns
    ///
    /// - `Ok(History)`: The persisted history (possibly empty)
    /// - `Err(Error)`: Storage or parse error
    async fn load(&self) -> Result<History, crate::Error>;

    /// Replace the persisted history with `history`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The new history is durable
    /// - `Err(Error)`: Nothing observable changed
    async fn save(&self, history: &History) -> Result<(), crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
