use crate::{error::TaskError, task::Task, time::Timestamp};

// id, text, completed, created hours ago, updated hours ago
const DEMO_TASKS: [(&str, &str, bool, i64, i64); 8] = [
  ("demo1", "Welcome to your ToDo List App! 🎉", false, 0, 0),
  ("demo2", "Try adding a new task using the input above", false, 1, 1),
  ("demo3", "Click the checkbox to mark this task as complete", false, 2, 2),
  ("demo4", "Use the edit button to modify tasks", false, 3, 3),
  ("demo5", "This task is already completed ✅", true, 4, 1),
  ("demo6", "Try the filter buttons to view different task states", true, 5, 2),
  ("demo7", "All your data is saved in local storage", false, 6, 6),
  ("demo8", "Delete this task using the trash button", false, 7, 7),
];

/// Sample tasks dated relative to `now`, newest first.
pub fn demo_tasks(now: Timestamp) -> Result<Vec<Task>, TaskError> {
  DEMO_TASKS
    .iter()
    .map(|&(id, text, completed, created_ago, updated_ago)| {
      Task::from_parts(
        id,
        text,
        completed,
        now - chrono::Duration::hours(created_ago),
        now - chrono::Duration::hours(updated_ago),
      )
    })
    .collect()
}
