use log::debug;

use crate::{error::ConfigError, store::DEFAULT_STORAGE_KEY};

const TODO_DEFAULT_STORAGE_DIR: &str = ".todo";
const TODO_DEFAULT_CONFIG_NAME: &str = ".todo.json";

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Config {
  pub storage_dir_path: String,
  #[serde(default = "default_storage_key")]
  pub storage_key: String,
}

fn default_storage_key() -> String {
  DEFAULT_STORAGE_KEY.to_owned()
}

impl Config {
  /// Reads `$TODO_CONFIG` (or `~/.todo.json`), writing the defaults on first
  /// run. `$TODO_DATA_DIR` overrides the storage folder for this run only.
  pub fn load() -> Result<Self, ConfigError> {
    let home = std::env::var("HOME").ok().map(std::path::PathBuf::from);

    let config_file_path = match std::env::var("TODO_CONFIG") {
      Ok(file_path) => std::path::PathBuf::from(file_path),
      Err(_) => home
        .as_ref()
        .ok_or(ConfigError::NoHome)?
        .join(TODO_DEFAULT_CONFIG_NAME),
    };

    let base_dir = match home {
      Some(home) => home,
      None => config_file_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default(),
    };

    let mut config = Self::load_from(&config_file_path, &base_dir.join(TODO_DEFAULT_STORAGE_DIR))?;
    if let Ok(data_dir) = std::env::var("TODO_DATA_DIR") {
      debug!("storage folder overridden by TODO_DATA_DIR: {}", data_dir);
      config.storage_dir_path = data_dir;
    }
    return Ok(config);
  }

  pub fn load_from(
    config_file_path: &std::path::Path,
    default_storage_dir: &std::path::Path,
  ) -> Result<Self, ConfigError> {
    let path_str = config_file_path.to_string_lossy().to_string();
    let io_err = |source: std::io::Error| ConfigError::Io {
      path: path_str.clone(),
      source,
    };

    if !config_file_path.exists() {
      let config = Self {
        storage_dir_path: default_storage_dir.to_string_lossy().to_string(),
        storage_key: default_storage_key(),
      };

      if let Some(parent) = config_file_path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
      }
      let file = std::fs::File::create(config_file_path).map_err(io_err)?;
      serde_json::to_writer_pretty(file, &config).map_err(|source| ConfigError::Parse {
        path: path_str.clone(),
        source,
      })?;
      debug!("default config written to: {}", path_str);
      return Ok(config);
    }

    let file = std::fs::File::open(config_file_path).map_err(io_err)?;
    let config = serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
      ConfigError::Parse {
        path: path_str.clone(),
        source,
      }
    })?;
    debug!("config loaded from: {}", path_str);
    return Ok(config);
  }
}
