//! Read-only reporting over the history
//!
//! The QueryService never writes: it loads the history, picks entries and
//! returns copies.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::error::Result;
use crate::snapshot::AddressSnapshot;
use crate::traits::HistoryStore;

/// Read-only queries for on-demand reporting
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn HistoryStore>,
}

impl QueryService {
    /// Create a query service over `store`
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// The most recent snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(Some(snapshot))`: The last recorded snapshot
    /// - `Ok(None)`: Nothing has been recorded yet
    /// - `Err(Error)`: The history could not be read
    pub async fn latest(&self) -> Result<Option<AddressSnapshot>> {
        let history = self.store.load().await?;
        Ok(history.last().cloned())
    }

    /// Up to the last `n` snapshots, most recent first
    ///
    /// Returns an empty list when nothing has been recorded yet.
    pub async fn recent(&self, n: NonZeroUsize) -> Result<Vec<AddressSnapshot>> {
        let history = self.store.load().await?;
        Ok(history.recent(n.get()))
    }
}
