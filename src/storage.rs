//! Durable key-value storage.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use log;
use tempfile;

/// Storage error.
#[derive(Debug)]
pub enum StorageError {
    /// Common I/O error.
    IO(io::Error),
    /// Key can't be used as a storage entry name.
    InvalidKey(String),
    /// Storage is switched off.
    Disabled,
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            StorageError::IO(err) => Some(err),
            StorageError::InvalidKey(_) | StorageError::Disabled => None,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            StorageError::IO(err) => write!(f, "I/O operation failed: {}", err),
            StorageError::InvalidKey(key) => write!(f, "invalid storage key: {:?}", key),
            StorageError::Disabled => write!(f, "storage is disabled"),
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::IO(err)
    }
}

/// Key-value storage interface.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, [`None`] if there is none.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `value` under `key` replacing the previous one.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Removes the value stored under `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Values live as long as the store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File system storage. Every key is stored in its own file inside a directory.
///
/// Files are replaced atomically: the value is written to a temporary file in the same directory
/// which is then renamed over the previous one, so a reader never observes a partial value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store in `dir` creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        log::info!("using {} as sort state directory", dir.display());

        return Ok(FileStore { dir });
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }

        return Ok(self.dir.join(key));
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.entry_path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::IO(err)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;

        let mut tmp_file = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp_file.write_all(value)?;
        tmp_file.flush()?;
        tmp_file.persist(&path).map_err(|err| StorageError::IO(err.error))?;

        return Ok(());
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.entry_path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::IO(err)),
        }
    }
}

/// Storage that refuses every operation, e.g. when the user switched persistence off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

impl KeyValueStore for DisabledStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Err(StorageError::Disabled)
    }

    fn set(&mut self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::{DisabledStore, FileStore, KeyValueStore, MemoryStore, StorageError};

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir_in("./").unwrap()
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("sort").unwrap(), None);

        store.set("sort", b"one").unwrap();
        store.set("sort", b"two").unwrap();
        assert_eq!(store.get("sort").unwrap(), Some(b"two".to_vec()));

        store.remove("sort").unwrap();
        store.remove("sort").unwrap();
        assert_eq!(store.get("sort").unwrap(), None);
    }

    #[rstest]
    fn test_file_store(tmp_dir: tempfile::TempDir) {
        let mut store = FileStore::open(tmp_dir.path().join("state")).unwrap();
        assert_eq!(store.get("clientSortCriteria").unwrap(), None);

        store.set("clientSortCriteria", b"[]").unwrap();
        store.set("clientSortCriteria", b"[1]").unwrap();
        assert_eq!(store.get("clientSortCriteria").unwrap(), Some(b"[1]".to_vec()));

        // values survive reopening
        let reopened = FileStore::open(tmp_dir.path().join("state")).unwrap();
        assert_eq!(reopened.get("clientSortCriteria").unwrap(), Some(b"[1]".to_vec()));

        store.remove("clientSortCriteria").unwrap();
        store.remove("clientSortCriteria").unwrap();
        assert_eq!(store.get("clientSortCriteria").unwrap(), None);

        // no temporary files are left behind
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
    }

    #[rstest]
    #[case("")]
    #[case("../escape")]
    #[case("a/b")]
    #[case(".hidden")]
    fn test_file_store_invalid_key(tmp_dir: tempfile::TempDir, #[case] key: &str) {
        let mut store = FileStore::open(tmp_dir.path()).unwrap();
        assert!(matches!(store.set(key, b"[]"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.get(key), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_disabled_store() {
        let mut store = DisabledStore;
        assert!(matches!(store.get("sort"), Err(StorageError::Disabled)));
        assert!(matches!(store.set("sort", b"[]"), Err(StorageError::Disabled)));
    }
}
