use crate::error::StorageError;

/// String key/value backing store the task collection is persisted into.
pub trait Storage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
  /// Replaces any previous value under `key`.
  fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
  fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
