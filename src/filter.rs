use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
  #[default]
  All,
  Completed,
  Pending,
}

impl FilterMode {
  pub const NAMES: [&'static str; 3] = ["all", "completed", "pending"];

  pub fn name(self) -> &'static str {
    match self {
      FilterMode::All => "all",
      FilterMode::Completed => "completed",
      FilterMode::Pending => "pending",
    }
  }

  pub fn matches(self, task: &Task) -> bool {
    match self {
      FilterMode::All => true,
      FilterMode::Completed => task.is_completed(),
      FilterMode::Pending => !task.is_completed(),
    }
  }

  /// Title and hint shown when nothing matches the mode.
  pub fn empty_state(self) -> (&'static str, &'static str) {
    match self {
      FilterMode::All => ("No tasks yet!", "Add your first task to get started"),
      FilterMode::Completed => (
        "No completed tasks!",
        "Complete some tasks to see them here",
      ),
      FilterMode::Pending => ("No pending tasks!", "All tasks are completed! Great job!"),
    }
  }
}

impl std::str::FromStr for FilterMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "all" => Ok(FilterMode::All),
      "completed" | "done" => Ok(FilterMode::Completed),
      "pending" | "active" => Ok(FilterMode::Pending),
      other => Err(format!("unknown filter mode: {}", other)),
    }
  }
}

impl std::fmt::Display for FilterMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
  pub total: usize,
  pub completed: usize,
  pub pending: usize,
}

impl Stats {
  pub fn collect<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
    let mut stats = Stats::default();
    for task in tasks {
      stats.total += 1;
      if task.is_completed() {
        stats.completed += 1;
      }
    }
    stats.pending = stats.total - stats.completed;
    return stats;
  }
}
