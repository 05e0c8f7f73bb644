use crate::{
  error::TaskError,
  time::{self, Timestamp},
};

pub const MAX_TEXT_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  id: String,
  text: String,
  completed: bool,
  #[serde(with = "time::iso8601")]
  created_at: Timestamp,
  #[serde(with = "time::iso8601")]
  updated_at: Timestamp,
}

impl Task {
  pub fn new(text: &str) -> Result<Self, TaskError> {
    let text = validate_text(text)?;
    let now = time::now();
    Ok(Self {
      id: generate_id(),
      text,
      completed: false,
      created_at: now,
      updated_at: now,
    })
  }

  /// Builds a task from already known fields. Text is validated and stored trimmed;
  /// `updated_at` earlier than `created_at` is clamped to `created_at`.
  pub fn from_parts(
    id: &str,
    text: &str,
    completed: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
  ) -> Result<Self, TaskError> {
    Ok(Self {
      id: id.to_owned(),
      text: validate_text(text)?,
      completed,
      created_at,
      updated_at: updated_at.max(created_at),
    })
  }

  pub fn id(&self) -> &str {
    self.id.as_str()
  }

  pub fn text(&self) -> &str {
    self.text.as_str()
  }

  pub fn is_completed(&self) -> bool {
    self.completed
  }

  pub fn created_at(&self) -> Timestamp {
    self.created_at
  }

  pub fn updated_at(&self) -> Timestamp {
    self.updated_at
  }

  /// Flips completion and returns the new state.
  pub fn toggle(&mut self) -> bool {
    self.completed = !self.completed;
    self.touch();
    return self.completed;
  }

  pub fn set_text(&mut self, text: &str) -> Result<(), TaskError> {
    self.text = validate_text(text)?;
    self.touch();
    Ok(())
  }

  fn touch(&mut self) {
    self.updated_at = time::now().max(self.created_at);
  }
}

/// Trims `text` and checks it fits into `1..=MAX_TEXT_LENGTH` characters.
pub fn validate_text(text: &str) -> Result<String, TaskError> {
  let trimmed = text.trim();
  let length = trimmed.chars().count();
  if length == 0 {
    return Err(TaskError::Empty);
  }
  if length > MAX_TEXT_LENGTH {
    return Err(TaskError::TooLong {
      length,
      max: MAX_TEXT_LENGTH,
    });
  }
  return Ok(trimmed.to_owned());
}

pub fn generate_id() -> String {
  uuid::Uuid::new_v4().as_simple().to_string()
}

/// Task-shaped record accepted on import. Everything but `text` may be missing.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
  #[serde(default)]
  id: Option<String>,
  text: String,
  #[serde(default)]
  completed: bool,
  #[serde(default, with = "time::iso8601::option")]
  created_at: Option<Timestamp>,
  #[serde(default, with = "time::iso8601::option")]
  updated_at: Option<Timestamp>,
}

impl TaskRecord {
  pub fn into_task(self) -> Result<Task, String> {
    let created_at = self.created_at.unwrap_or_else(time::now);
    let updated_at = self.updated_at.unwrap_or(created_at);
    if updated_at < created_at {
      return Err(format!(
        "updatedAt {} is earlier than createdAt {}",
        time::format_timestamp(&updated_at),
        time::format_timestamp(&created_at)
      ));
    }

    let id = self
      .id
      .map(|id| id.trim().to_owned())
      .filter(|id| !id.is_empty())
      .unwrap_or_else(generate_id);
    Task::from_parts(&id, &self.text, self.completed, created_at, updated_at)
      .map_err(|err| err.to_string())
  }
}
