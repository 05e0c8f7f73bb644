use crate::error::TaskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Success,
  Info,
  Warning,
  Error,
}

/// A short user-facing message about the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub message: String,
  pub severity: Severity,
}

impl Notice {
  pub fn new(message: &str, severity: Severity) -> Self {
    Self {
      message: message.to_owned(),
      severity,
    }
  }

  pub fn success(message: &str) -> Self {
    Self::new(message, Severity::Success)
  }

  pub fn imported(count: usize) -> Self {
    Self::success(&format!("{} tasks imported!", count))
  }

  pub fn exported() -> Self {
    Self::success("Tasks exported successfully!")
  }

  pub fn info(message: &str) -> Self {
    Self::new(message, Severity::Info)
  }

  pub fn save_failed() -> Self {
    Self::new("Error saving tasks!", Severity::Error)
  }
}

impl From<&TaskError> for Notice {
  fn from(err: &TaskError) -> Self {
    match err {
      TaskError::Empty => Notice::new("Please enter a task!", Severity::Warning),
      TaskError::TooLong { max, .. } => Notice::new(
        &format!("Task is too long! Maximum {} characters.", max),
        Severity::Warning,
      ),
      TaskError::Format(_) => Notice::new(
        "Error importing tasks! Please check the file format.",
        Severity::Error,
      ),
      TaskError::Persistence(_) => Notice::save_failed(),
    }
  }
}
