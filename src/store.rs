use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::GateError;

/// Key the access token is cached under.
pub const TOKEN_KEY: &str = "token";
/// Key an S256 verifier waits under between the redirect and the callback.
pub const CODE_VERIFIER_KEY: &str = "code_verifier";

/// String key-value storage shared by the guard and its host.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, GateError>;
    fn set(&self, key: &str, value: &str) -> Result<(), GateError>;
    fn remove(&self, key: &str) -> Result<(), GateError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), GateError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        self
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, GateError> {
        self.entries
            .lock()
            .map_err(|_| GateError::Store("memory store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GateError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, one string value per key.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data dir>/pagerduty-gate/storage.json`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pagerduty-gate")
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<HashMap<String, String>, GateError> {
        match fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Ok(HashMap::new()),
            Ok(data) => serde_json::from_str(&data).map_err(|err| {
                GateError::Store(format!("{} is not a json object: {err}", self.path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, entries: &HashMap<String, String>) -> Result<(), GateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<(), GateError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| GateError::Store("file store lock poisoned".to_string()))?;
        let mut entries = self.read()?;
        apply(&mut entries);
        self.write(&entries)
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), GateError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryStore::new().with_entry(TOKEN_KEY, "old");
        store.set(TOKEN_KEY, "new").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("new"));
        store.remove(TOKEN_KEY).unwrap();
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileStore::new(&path).set(TOKEN_KEY, "tok1").unwrap();
        FileStore::new(&path).set("other", "value").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
        assert_eq!(store.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let result = FileStore::new(&path).get(TOKEN_KEY);
        assert!(matches!(result, Err(GateError::Store(_))));
    }

    #[test]
    fn default_path_ends_with_storage_file() {
        let path = FileStore::default_path();
        assert!(path.ends_with("pagerduty-gate/storage.json"));
    }
}
