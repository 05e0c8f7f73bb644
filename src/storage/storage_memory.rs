use std::collections::HashMap;

use crate::error::StorageError;

use super::storage::Storage;

/// In-process storage. An optional byte quota makes oversized writes fail
/// the same way a full browser storage does.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
  entries: HashMap<String, String>,
  quota: Option<usize>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_quota(quota: usize) -> Self {
    Self {
      entries: HashMap::new(),
      quota: Some(quota),
    }
  }

  pub fn with_entry(key: &str, value: &str) -> Self {
    let mut storage = Self::new();
    storage.entries.insert(key.to_owned(), value.to_owned());
    return storage;
  }

  fn used_without(&self, key: &str) -> usize {
    self
      .entries
      .iter()
      .filter(|(k, _)| k.as_str() != key)
      .map(|(k, v)| k.len() + v.len())
      .sum()
  }
}

impl Storage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    if let Some(quota) = self.quota {
      let needed = key.len() + value.len();
      let available = quota.saturating_sub(self.used_without(key));
      if needed > available {
        return Err(StorageError::QuotaExceeded {
          needed,
          quota: available,
        });
      }
    }
    self.entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), StorageError> {
    self.entries.remove(key);
    Ok(())
  }
}
