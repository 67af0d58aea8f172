// mercado/src/store/storage.rs

//! The durable key-value storage an origin shares between its contexts.
//!
//! The surface mirrors browser local storage: string keys, string values,
//! synchronous calls.

use crate::error::{MercadoError, MercadoResult};
use anyhow::Context as _;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{event, Level};

pub trait KeyValueStorage: Send + Sync {
  fn get_item(&self, key: &str) -> MercadoResult<Option<String>>;
  fn set_item(&self, key: &str, value: &str) -> MercadoResult<()>;
  fn remove_item(&self, key: &str) -> MercadoResult<()>;
}

/// In-process storage with an optional byte quota over all keys and values.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: RwLock<HashMap<String, String>>,
  quota_bytes: Option<usize>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_quota(quota_bytes: usize) -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
      quota_bytes: Some(quota_bytes),
    }
  }

  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }
}

impl KeyValueStorage for MemoryStorage {
  fn get_item(&self, key: &str) -> MercadoResult<Option<String>> {
    Ok(self.entries.read().get(key).cloned())
  }

  fn set_item(&self, key: &str, value: &str) -> MercadoResult<()> {
    let mut entries = self.entries.write();
    if let Some(quota) = self.quota_bytes {
      let others: usize = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
      let needed = others + key.len() + value.len();
      if needed > quota {
        event!(Level::WARN, key, needed, quota, "Storage quota exceeded.");
        return Err(MercadoError::QuotaExceeded {
          key: key.to_string(),
          needed,
          quota,
        });
      }
    }
    entries.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove_item(&self, key: &str) -> MercadoResult<()> {
    self.entries.write().remove(key);
    Ok(())
  }
}

/// One file per key inside a directory, so several processes can share an origin.
#[derive(Debug, Clone)]
pub struct FileStorage {
  dir: PathBuf,
}

impl FileStorage {
  /// Creates the directory if it does not exist.
  pub fn open(dir: impl AsRef<Path>) -> MercadoResult<Self> {
    let dir = dir.as_ref().to_path_buf();
    fs::create_dir_all(&dir)
      .with_context(|| format!("creating storage directory {}", dir.display()))
      .map_err(|e| MercadoError::storage("*", e))?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path_for(&self, key: &str) -> PathBuf {
    let file_name: String = key
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
      .collect();
    self.dir.join(format!("{}.json", file_name))
  }
}

impl KeyValueStorage for FileStorage {
  fn get_item(&self, key: &str) -> MercadoResult<Option<String>> {
    match fs::read_to_string(self.path_for(key)) {
      Ok(raw) => Ok(Some(raw)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(MercadoError::storage(key, e)),
    }
  }

  fn set_item(&self, key: &str, value: &str) -> MercadoResult<()> {
    let path = self.path_for(key);
    // Write then rename so readers in other processes never see a torn value.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value)
      .and_then(|_| fs::rename(&tmp, &path))
      .with_context(|| format!("writing {}", path.display()))
      .map_err(|e| MercadoError::storage(key, e))
  }

  fn remove_item(&self, key: &str) -> MercadoResult<()> {
    match fs::remove_file(self.path_for(key)) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(MercadoError::storage(key, e)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_storage_quota_counts_replaced_values_once() {
    let storage = MemoryStorage::with_quota(10);
    storage.set_item("k", "12345").unwrap();
    // Overwriting the same key only needs room for the new value.
    storage.set_item("k", "123456789").unwrap();
    let err = storage.set_item("k2", "x").unwrap_err();
    assert!(matches!(err, MercadoError::QuotaExceeded { .. }));
    assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("123456789"));
  }

  #[test]
  fn test_file_storage_round_trip_and_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path().join("origin")).unwrap();
    assert_eq!(storage.get_item("tumercao_products").unwrap(), None);
    storage.set_item("tumercao_products", "[]").unwrap();
    assert_eq!(storage.get_item("tumercao_products").unwrap().as_deref(), Some("[]"));
    storage.remove_item("tumercao_products").unwrap();
    storage.remove_item("tumercao_products").unwrap();
    assert_eq!(storage.get_item("tumercao_products").unwrap(), None);
  }
}
