use std::io::Write;

use log::debug;

use crate::error::StorageError;

use super::storage::Storage;

/// Keeps every key in its own `<key>.json` file inside a data folder.
pub struct JsonStorage {
  folder: std::path::PathBuf,
}

impl JsonStorage {
  pub fn new(database_folder: &str) -> Result<Self, StorageError> {
    std::fs::create_dir_all(database_folder)
      .map_err(|err| StorageError::io(database_folder, err))?;
    debug!("json storage folder: {}", database_folder);

    Ok(Self {
      folder: std::path::Path::new(database_folder).to_path_buf(),
    })
  }

  pub fn filepath(&self, key: &str) -> std::path::PathBuf {
    self.folder.join(format!("{}.json", key))
  }
}

impl Storage for JsonStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let path = self.filepath(key);
    match std::fs::read_to_string(&path) {
      Ok(contents) => {
        debug!("restored {} bytes from: {}", contents.len(), path.display());
        Ok(Some(contents))
      }
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(err) => Err(StorageError::io(&path.to_string_lossy(), err)),
    }
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    let path = self.filepath(key);
    let path_str = path.to_string_lossy().to_string();

    // Written aside and renamed over the target so a crash never leaves a torn file.
    let mut file = tempfile::NamedTempFile::new_in(&self.folder)
      .map_err(|err| StorageError::io(&path_str, err))?;
    file
      .write_all(value.as_bytes())
      .map_err(|err| StorageError::io(&path_str, err))?;
    file
      .flush()
      .map_err(|err| StorageError::io(&path_str, err))?;
    file
      .persist(&path)
      .map_err(|err| StorageError::io(&path_str, err.error))?;

    debug!("flushed {} bytes to: {}", value.len(), path_str);
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), StorageError> {
    let path = self.filepath(key);
    match std::fs::remove_file(&path) {
      Ok(_) => Ok(()),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(err) => Err(StorageError::io(&path.to_string_lossy(), err)),
    }
  }
}
