use crate::{
  error::TaskError,
  notice::{Notice, Severity},
  store::{Applied, TaskStore},
  task::Task,
};

/// A user request against the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Add(String),
  Toggle(String),
  Edit(String, String),
  Delete(String),
  ClearCompleted,
  ClearAll,
}

/// The user's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
  Confirmed,
  Declined,
}

impl From<bool> for Confirmation {
  fn from(confirmed: bool) -> Self {
    match confirmed {
      true => Confirmation::Confirmed,
      false => Confirmation::Declined,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  Added(Task),
  Toggled { id: String, completed: Option<bool> },
  Edited { id: String, found: bool },
  Deleted { id: String, removed: bool },
  ClearedCompleted(usize),
  ClearedAll(usize),
  Cancelled,
}

impl Effect {
  /// Unknown ids are silent no-ops and have nothing to report.
  pub fn notice(&self) -> Option<Notice> {
    match self {
      Effect::Added(_) => Some(Notice::success("Task added successfully!")),
      Effect::Toggled {
        completed: Some(true),
        ..
      } => Some(Notice::success("Task completed!")),
      Effect::Toggled {
        completed: Some(false),
        ..
      } => Some(Notice::success("Task marked as pending!")),
      Effect::Edited { found: true, .. } => Some(Notice::success("Task updated successfully!")),
      Effect::Deleted { removed: true, .. } => Some(Notice::success("Task deleted successfully!")),
      Effect::ClearedCompleted(count) => Some(Notice::success(&format!(
        "{} completed tasks cleared!",
        count
      ))),
      Effect::ClearedAll(count) => Some(Notice::success(&format!("{} tasks cleared!", count))),
      Effect::Cancelled => Some(Notice::info("Nothing changed.")),
      _ => None,
    }
  }
}

impl Command {
  /// Notice for a rejected command. An empty edit is worded differently from
  /// an empty new task.
  pub fn error_notice(&self, err: &TaskError) -> Notice {
    match (self, err) {
      (Command::Edit(..), TaskError::Empty) => {
        Notice::new("Task cannot be empty!", Severity::Warning)
      }
      _ => Notice::from(err),
    }
  }

  /// Question to ask before running a destructive command, `None` when the
  /// command can run straight away.
  pub fn confirmation_prompt(&self, store: &TaskStore) -> Option<String> {
    match self {
      Command::Delete(id) => store
        .task(id)
        .map(|task| format!("Are you sure you want to delete \"{}\"?", task.text())),
      Command::ClearCompleted => {
        Some("Are you sure you want to clear all completed tasks?".to_owned())
      }
      Command::ClearAll => Some(
        "Are you sure you want to clear ALL tasks? This action cannot be undone.".to_owned(),
      ),
      _ => None,
    }
  }
}

impl TaskStore {
  /// Applies `command`. Commands that need confirmation do nothing unless
  /// `confirmation` is `Confirmed`.
  pub fn dispatch(
    &mut self,
    command: Command,
    confirmation: Confirmation,
  ) -> Result<Applied<Effect>, TaskError> {
    if confirmation == Confirmation::Declined && command.confirmation_prompt(self).is_some() {
      return Ok(Applied::clean(Effect::Cancelled));
    }

    let applied = match command {
      Command::Add(text) => self.add(&text)?.map(Effect::Added),
      Command::Toggle(id) => {
        let applied = self.toggle(&id);
        applied.map(|completed| Effect::Toggled { id, completed })
      }
      Command::Edit(id, text) => {
        let applied = self.edit(&id, &text)?;
        applied.map(|found| Effect::Edited { id, found })
      }
      Command::Delete(id) => {
        let applied = self.delete(&id);
        applied.map(|removed| Effect::Deleted { id, removed })
      }
      Command::ClearCompleted => self.clear_completed().map(Effect::ClearedCompleted),
      Command::ClearAll => self.clear_all().map(Effect::ClearedAll),
    };
    Ok(applied)
  }
}
