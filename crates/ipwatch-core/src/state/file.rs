// # File History Store
//
// File-based implementation of HistoryStore.
//
// ## Purpose
//
// Keeps the address history across restarts in a single JSON file.
//
// ## Durability
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Backup: Keeps a `<name>.backup` copy of the previous file for manual recovery
// - Sibling files append `.tmp` / `.backup` to the full file name
// - No silent recovery: A corrupt file is reported, never replaced
//
// ## File Format
//
// ```json
// [
//   {
//     "timestamp": "2025-01-09T12:00:00Z",
//     "ipv4": "1.2.3.4",
//     "ipv6": "unavailable"
//   }
// ]
// ```

use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Error;
use crate::snapshot::History;
use crate::traits::history_store::HistoryStore;

/// File-based history store
///
/// Every `load()` reads the file from disk and every `save()` rewrites it
/// completely. Nothing is cached between calls.
///
/// # Example
///
/// ```rust,no_run
/// use ipwatch_core::state::FileHistoryStore;
/// use ipwatch_core::traits::HistoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileHistoryStore::new("data/ip_history.json");
///
///     let history = store.load().await?;
///     println!("{} entries", history.len());
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    /// Serializes writers sharing the temp file
    write_lock: Mutex<()>,
}

impl FileHistoryStore {
    /// Create a store backed by `path`
    ///
    /// The file and its parent directory are created on the first `save()`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the history file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load history from file
    async fn read_history(path: &Path) -> Result<History, Error> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("History file does not exist: {}", path.display());
                return Ok(History::new());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(Error::corrupt_state(path, e.to_string()));
            }
            Err(e) => {
                return Err(Error::state_store(format!(
                    "Failed to read history file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let history: History = serde_json::from_str(&content)
            .map_err(|e| Error::corrupt_state(path, e.to_string()))?;

        tracing::debug!("Loaded history from file: {} entries", history.len());
        Ok(history)
    }

    /// Write history to file atomically
    async fn write_history(&self, history: &History) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create history directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(history)
            .map_err(|e| Error::state_store(format!("Failed to serialize history: {}", e)))?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Keep the previous file around for the operator
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create history backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("History written to file: {}", self.path.display());
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    /// Get path to backup file
    pub fn backup_path(path: &Path) -> PathBuf {
        with_suffix(path, ".backup")
    }
}

/// `path` with `suffix` appended to the full file name, so the sibling
/// never coincides with `path` itself
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> Result<History, Error> {
        Self::read_history(&self.path).await
    }

    async fn save(&self, history: &History) -> Result<(), Error> {
        self.write_history(history).await
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AddressSnapshot, Ipv6Record};
    use tempfile::tempdir;

    fn snapshot(ipv4: &str) -> AddressSnapshot {
        AddressSnapshot::new(chrono::Utc::now(), ipv4, Ipv6Record::Unavailable)
    }

    #[tokio::test]
    async fn test_file_store_basic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_history.json");

        let store = FileHistoryStore::new(&path);

        // Initially empty, nothing on disk
        let history = store.load().await.unwrap();
        assert!(history.is_empty());
        assert!(!path.exists());

        let mut history = History::new();
        history.append(snapshot("1.2.3.4"));
        store.save(&history).await.unwrap();

        // Verify file was written
        assert!(path.exists());

        // Load new instance and verify persistence
        let store2 = FileHistoryStore::new(&path);
        let loaded = store2.load().await.unwrap();
        assert_eq!(loaded, history);
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("nested").join("ip_history.json");

        let store = FileHistoryStore::new(&path);
        let mut history = History::new();
        history.append(snapshot("1.2.3.4"));

        store.save(&history).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_corruption_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_history.json");

        fs::write(&path, b"corrupted json data").await.unwrap();

        let store = FileHistoryStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(err.is_corrupt_state(), "unexpected error: {}", err);

        // The corrupt file is left for the operator
        let content = fs::read(&path).await.unwrap();
        assert_eq!(content, b"corrupted json data");
    }

    #[tokio::test]
    async fn test_file_store_wrong_shape_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_history.json");

        fs::write(&path, br#"{"version": "1.0", "records": {}}"#)
            .await
            .unwrap();

        let store = FileHistoryStore::new(&path);
        assert!(store.load().await.unwrap_err().is_corrupt_state());
    }

    #[tokio::test]
    async fn test_file_store_backup_holds_previous_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_history.json");
        let store = FileHistoryStore::new(&path);

        let mut history = History::new();
        history.append(snapshot("1.2.3.4"));
        store.save(&history).await.unwrap();

        history.append(snapshot("1.2.3.5"));
        store.save(&history).await.unwrap();

        let backup_path = FileHistoryStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after second write");

        let backup: History =
            serde_json::from_str(&fs::read_to_string(&backup_path).await.unwrap()).unwrap();
        assert_eq!(backup.len(), 1);
        assert_eq!(backup.last().unwrap().ipv4, "1.2.3.4");
    }

    #[tokio::test]
    async fn test_file_store_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_history.json");

        let store = FileHistoryStore::new(&path);
        let mut history = History::new();

        // Write multiple updates rapidly
        for i in 0..10 {
            history.append(snapshot(&format!("1.2.3.{}", i)));
            store.save(&history).await.unwrap();
        }

        // Verify final state is consistent and no temp file is left behind
        let loaded = FileHistoryStore::new(&path).load().await.unwrap();
        assert_eq!(loaded.len(), 10);
        assert_eq!(loaded.last().unwrap().ipv4, "1.2.3.9");
        assert!(!dir.path().join("ip_history.json.tmp").exists());
    }

    #[test]
    fn test_sibling_paths_append_to_file_name() {
        let path = Path::new("/var/lib/ipwatch/ip_history.json");
        assert_eq!(
            FileHistoryStore::new(path).temp_path(),
            Path::new("/var/lib/ipwatch/ip_history.json.tmp")
        );
        assert_eq!(
            FileHistoryStore::backup_path(path),
            Path::new("/var/lib/ipwatch/ip_history.json.backup")
        );

        for name in ["history.tmp", "history.backup", "history"] {
            let path = Path::new("/data").join(name);
            assert_ne!(FileHistoryStore::new(&path).temp_path(), path);
            assert_ne!(FileHistoryStore::backup_path(&path), path);
        }
    }

    #[tokio::test]
    async fn test_file_store_with_sibling_like_extension() {
        for name in ["history.tmp", "history.backup"] {
            let dir = tempdir().unwrap();
            let path = dir.path().join(name);
            let store = FileHistoryStore::new(&path);

            let mut history = History::new();
            history.append(snapshot("1.2.3.4"));
            store.save(&history).await.unwrap();

            history.append(snapshot("1.2.3.5"));
            store.save(&history).await.unwrap();

            let loaded = FileHistoryStore::new(&path).load().await.unwrap();
            assert_eq!(loaded, history, "{} lost entries", name);

            let backup: History = serde_json::from_str(
                &fs::read_to_string(FileHistoryStore::backup_path(&path))
                    .await
                    .unwrap(),
            )
            .unwrap();
            assert_eq!(backup.len(), 1, "{} backup should hold the first save", name);
            assert!(!store.temp_path().exists());
        }
    }
}
