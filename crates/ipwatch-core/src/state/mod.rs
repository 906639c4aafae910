// # History Store Implementations
//
// This module provides implementations of the HistoryStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileHistoryStore;
pub use memory::MemoryHistoryStore;

use std::sync::Arc;

use crate::config::HistoryStoreConfig;
use crate::traits::HistoryStore;

/// Build the history store selected by `config`
pub fn build_history_store(config: &HistoryStoreConfig) -> Arc<dyn HistoryStore> {
    match config {
        HistoryStoreConfig::File { path } => Arc::new(FileHistoryStore::new(path)),
        HistoryStoreConfig::Memory => Arc::new(MemoryHistoryStore::new()),
    }
}
