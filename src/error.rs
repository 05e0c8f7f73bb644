/// Failures of the key/value backing store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("storage io error at {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("can't serialize tasks: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("storage quota exceeded: {needed} bytes requested, {quota} bytes available")]
  QuotaExceeded { needed: usize, quota: usize },
}

impl StorageError {
  pub fn io(path: &str, source: std::io::Error) -> Self {
    Self::Io {
      path: path.to_owned(),
      source,
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
  #[error("task text is empty")]
  Empty,

  #[error("task text is too long: {length} characters, maximum is {max}")]
  TooLong { length: usize, max: usize },

  #[error("invalid import format: {0}")]
  Format(String),

  #[error("can't persist tasks: {0}")]
  Persistence(#[from] StorageError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("neither TODO_CONFIG nor HOME is set")]
  NoHome,

  #[error("can't access config {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed config {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}
