// # Memory History Store
//
// In-memory implementation of HistoryStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing and for embedding the engine where persistence is
// handled elsewhere.
//
// ## Crash Behavior
//
// - All history is lost on restart
// - The first check after a restart always counts as a change

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::snapshot::History;
use crate::traits::history_store::HistoryStore;

/// In-memory history store implementation
///
/// Clones share the same history, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    inner: Arc<RwLock<History>>,
}

impl MemoryHistoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `history`
    pub fn with_history(history: History) -> Self {
        Self {
            inner: Arc::new(RwLock::new(history)),
        }
    }

    /// Get the number of entries in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Result<History, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, history: &History) -> Result<(), Error> {
        *self.inner.write().await = history.clone();
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
