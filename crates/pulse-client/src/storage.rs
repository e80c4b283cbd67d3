use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Durable key-value string store, the terminal's answer to `localStorage`.
///
/// Writes are synchronous: once `set` returns, the value is on disk (or
/// wherever the implementation keeps it).
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A single `.json` file holding `{ "key": "value", ... }`.
///
/// ```json
/// { "watchlist": "[\"AAPL\",\"MSFT\"]" }
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the store at `path`. A missing file is an empty store; so is an
    /// unreadable one, which gets overwritten on the next `set`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!("ignoring malformed store at {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("failed to read store at {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        FileStorage { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        // write to a sibling then rename, so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        log::trace!("store flushed to {}", self.path.display());
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pulse-storage-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn file_storage_survives_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        let mut store = FileStorage::open(&path);
        assert_eq!(store.get("watchlist"), None);
        store.set("watchlist", "[\"AAPL\"]".to_string()).unwrap();

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("watchlist").as_deref(), Some("[\"AAPL\"]"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn malformed_file_is_an_empty_store() {
        let path = temp_path("malformed");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = FileStorage::open(&path);
        assert_eq!(store.get("watchlist"), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn memory_storage() {
        let mut store = MemoryStorage::new();
        store.set("k", "v".to_string()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert_eq!(store.get("missing"), None);
    }
}
