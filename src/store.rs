use log::{debug, error, warn};

use crate::{
  demo,
  error::{StorageError, TaskError},
  filter::{FilterMode, Stats},
  storage::Storage,
  task::{validate_text, Task, TaskRecord},
  time::{self, Timestamp},
};

pub const DEFAULT_STORAGE_KEY: &str = "todoTasks";

/// Result of a mutation that went through. `warning` carries a failed save:
/// the change stays in memory and is not rolled back.
#[derive(Debug)]
pub struct Applied<T> {
  pub value: T,
  pub warning: Option<StorageError>,
}

impl<T> Applied<T> {
  pub fn clean(value: T) -> Self {
    Self {
      value,
      warning: None,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
    Applied {
      value: f(self.value),
      warning: self.warning,
    }
  }

  pub fn is_saved(&self) -> bool {
    self.warning.is_none()
  }
}

/// Owns the task collection and keeps it in sync with the backing store.
pub struct TaskStore {
  storage: Box<dyn Storage>,
  key: String,
  tasks: Vec<Task>,
}

impl TaskStore {
  /// Restores tasks stored under `key`. A missing, unreadable or malformed
  /// entry yields an empty collection.
  pub fn load(storage: Box<dyn Storage>, key: &str) -> Self {
    let tasks = match storage.get(key) {
      Ok(Some(raw)) => match parse_tasks(&raw) {
        Ok(tasks) => tasks,
        Err(err) => {
          error!("error loading tasks from '{}': {}", key, err);
          Vec::new()
        }
      },
      Ok(None) => Vec::new(),
      Err(err) => {
        error!("error reading tasks from '{}': {}", key, err);
        Vec::new()
      }
    };
    debug!("restored {} tasks from '{}'", tasks.len(), key);

    Self {
      storage,
      key: key.to_owned(),
      tasks,
    }
  }

  pub fn key(&self) -> &str {
    self.key.as_str()
  }

  pub fn storage(&self) -> &dyn Storage {
    self.storage.as_ref()
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  pub fn task(&self, id: &str) -> Option<&Task> {
    self.tasks.iter().find(|t| t.id() == id)
  }

  /// Writes the whole collection under the store key.
  pub fn save(&mut self) -> Result<(), TaskError> {
    Ok(self.write()?)
  }

  fn write(&mut self) -> Result<(), StorageError> {
    let serialized = serde_json::to_string(&self.tasks)?;
    self.storage.set(&self.key, &serialized)
  }

  fn save_applied<T>(&mut self, value: T) -> Applied<T> {
    let warning = match self.write() {
      Ok(_) => None,
      Err(err) => {
        warn!("error saving tasks to '{}': {}", self.key, err);
        Some(err)
      }
    };
    Applied { value, warning }
  }

  /// Prepends a new task.
  pub fn add(&mut self, text: &str) -> Result<Applied<Task>, TaskError> {
    let task = Task::new(text)?;
    self.tasks.insert(0, task.clone());
    debug!("added task {}", task.id());
    Ok(self.save_applied(task))
  }

  /// Returns the new completion state, or `None` when no task has `id`.
  pub fn toggle(&mut self, id: &str) -> Applied<Option<bool>> {
    let completed = match self.tasks.iter_mut().find(|t| t.id() == id) {
      Some(task) => task.toggle(),
      None => {
        debug!("toggle: task {} not found", id);
        return Applied::clean(None);
      }
    };
    self.save_applied(Some(completed))
  }

  /// Returns whether a task with `id` was found and edited.
  pub fn edit(&mut self, id: &str, text: &str) -> Result<Applied<bool>, TaskError> {
    let text = validate_text(text)?;
    match self.tasks.iter_mut().find(|t| t.id() == id) {
      Some(task) => task.set_text(&text)?,
      None => {
        debug!("edit: task {} not found", id);
        return Ok(Applied::clean(false));
      }
    };
    Ok(self.save_applied(true))
  }

  /// Removes every task carrying `id` and returns whether any was removed.
  pub fn delete(&mut self, id: &str) -> Applied<bool> {
    let before = self.tasks.len();
    self.tasks.retain(|t| t.id() != id);
    let removed = self.tasks.len() != before;
    self.save_applied(removed)
  }

  pub fn clear_completed(&mut self) -> Applied<usize> {
    let before = self.tasks.len();
    self.tasks.retain(|t| !t.is_completed());
    let removed = before - self.tasks.len();
    self.save_applied(removed)
  }

  /// Empties the collection. The backing entry is rewritten, not removed.
  pub fn clear_all(&mut self) -> Applied<usize> {
    let removed = self.tasks.len();
    self.tasks.clear();
    self.save_applied(removed)
  }

  /// Drops every task together with the backing entry. Returns how many
  /// tasks were held.
  pub fn reset(&mut self) -> Result<usize, TaskError> {
    self.storage.remove(&self.key)?;
    let removed = self.tasks.len();
    self.tasks.clear();
    debug!("removed stored tasks under '{}'", self.key);
    Ok(removed)
  }

  pub fn filter(&self, mode: FilterMode) -> Vec<&Task> {
    self.tasks.iter().filter(|t| mode.matches(t)).collect()
  }

  pub fn stats(&self) -> Stats {
    Stats::collect(&self.tasks)
  }

  /// Pretty-printed JSON array of every task.
  pub fn export(&self) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(&self.tasks)?)
  }

  /// Appends the tasks of a JSON array document. Nothing is appended unless
  /// every record is valid. Ids are not deduplicated.
  pub fn import(&mut self, document: &str) -> Result<Applied<usize>, TaskError> {
    let value: serde_json::Value = serde_json::from_str(document)
      .map_err(|err| TaskError::Format(format!("not a JSON document: {}", err)))?;

    let records = match value {
      serde_json::Value::Array(records) => records,
      _ => return Err(TaskError::Format("expected a JSON array of tasks".to_owned())),
    };

    let mut imported = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
      let task = serde_json::from_value::<TaskRecord>(record)
        .map_err(|err| err.to_string())
        .and_then(TaskRecord::into_task)
        .map_err(|err| TaskError::Format(format!("record {}: {}", index, err)))?;
      imported.push(task);
    }

    let count = imported.len();
    self.tasks.extend(imported);
    debug!("imported {} tasks", count);
    Ok(self.save_applied(count))
  }

  /// Replaces the collection with the demo task set.
  pub fn load_demo(&mut self) -> Result<Applied<usize>, TaskError> {
    self.tasks = demo::demo_tasks(time::now())?;
    let count = self.tasks.len();
    Ok(self.save_applied(count))
  }

  /// Maps what a user typed to a task id: the full id, its short form, or an
  /// unambiguous prefix.
  pub fn resolve_id(&self, query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
      return None;
    }

    if let Some(task) = self.task(query) {
      return Some(task.id().to_owned());
    }

    let unique = |candidates: Vec<&str>| -> Option<String> {
      let mut ids = candidates;
      ids.sort_unstable();
      ids.dedup();
      match ids.as_slice() {
        [id] => Some(id.to_string()),
        _ => None,
      }
    };

    let shortened: Vec<&str> = self
      .tasks
      .iter()
      .map(|t| t.id())
      .filter(|id| shorten_id(id) == query)
      .collect();
    if !shortened.is_empty() {
      return unique(shortened);
    }

    let prefixed: Vec<&str> = self
      .tasks
      .iter()
      .map(|t| t.id())
      .filter(|id| id.starts_with(query))
      .collect();
    return unique(prefixed);
  }
}

fn parse_tasks(raw: &str) -> Result<Vec<Task>, String> {
  let tasks: Vec<Task> = serde_json::from_str(raw).map_err(|err| err.to_string())?;
  for task in tasks.iter() {
    match validate_text(task.text()) {
      Ok(text) if text == task.text() => {}
      Ok(_) => return Err(format!("task {} has untrimmed text", task.id())),
      Err(err) => return Err(format!("task {}: {}", task.id(), err)),
    }
    if task.updated_at() < task.created_at() {
      return Err(format!("task {} was updated before it was created", task.id()));
    }
  }
  Ok(tasks)
}

/// Display form of an id: long ids collapse to `abcd..wxyz`.
pub fn shorten_id(id: &str) -> String {
  let chars: Vec<char> = id.chars().collect();
  if chars.len() <= 10 {
    return id.to_owned();
  }
  let head: String = chars[..4].iter().collect();
  let tail: String = chars[chars.len() - 4..].iter().collect();
  format!("{}..{}", head, tail)
}

/// `todo-tasks-YYYY-MM-DD.json`
pub fn export_file_name(date: &Timestamp) -> String {
  format!("todo-tasks-{}.json", time::date_stamp(date))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::{export_file_name, shorten_id, TaskStore, DEFAULT_STORAGE_KEY};
  use crate::{
    error::{StorageError, TaskError},
    filter::FilterMode,
    storage::{JsonStorage, MemoryStorage},
    task::Task,
  };

  fn empty_store() -> TaskStore {
    TaskStore::load(Box::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY)
  }

  fn texts(store: &TaskStore) -> Vec<&str> {
    store.tasks().iter().map(|t| t.text()).collect()
  }

  fn persisted(store: &TaskStore) -> Vec<Task> {
    let raw = store.storage().get(store.key()).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
  }

  #[test]
  fn add_prepends_and_saves() {
    let mut store = empty_store();
    store.add("Buy milk").unwrap();
    let applied = store.add("Walk dog").unwrap();

    assert!(applied.is_saved());
    assert_eq!(applied.value.text(), "Walk dog");
    assert_eq!(texts(&store), vec!["Walk dog", "Buy milk"]);
    assert_eq!(persisted(&store), store.tasks().to_vec());
  }

  #[test]
  fn add_rejects_blank_text() {
    let mut store = empty_store();
    store.add("Buy milk").unwrap();

    assert!(matches!(store.add(""), Err(TaskError::Empty)));
    assert!(matches!(store.add(" "), Err(TaskError::Empty)));
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn add_rejects_long_text() {
    let mut store = empty_store();
    assert!(matches!(
      store.add(&"x".repeat(201)),
      Err(TaskError::TooLong { .. })
    ));
    assert!(store.is_empty());
    assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY).unwrap(), None);
  }

  #[test]
  fn toggle_twice_is_identity() {
    let mut store = empty_store();
    let id = store.add("Buy milk").unwrap().value.id().to_owned();

    assert_eq!(store.toggle(&id).value, Some(true));
    assert_eq!(store.toggle(&id).value, Some(false));
    assert!(!store.task(&id).unwrap().is_completed());
    assert_eq!(persisted(&store), store.tasks().to_vec());
  }

  #[test]
  fn toggle_unknown_is_noop() {
    let mut store = empty_store();
    let applied = store.toggle("missing");
    assert_eq!(applied.value, None);
    assert!(applied.is_saved());
    assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY).unwrap(), None);
  }

  #[test]
  fn edit_replaces_text() {
    let mut store = empty_store();
    let id = store.add("Buy milk").unwrap().value.id().to_owned();

    assert!(store.edit(&id, "  Buy oat milk ").unwrap().value);
    let task = store.task(&id).unwrap();
    assert_eq!(task.text(), "Buy oat milk");
    assert!(task.updated_at() >= task.created_at());
    assert_eq!(persisted(&store), store.tasks().to_vec());
  }

  #[test]
  fn edit_with_empty_text_changes_nothing() {
    let mut store = empty_store();
    let id = store.add("Buy milk").unwrap().value.id().to_owned();
    let before = store.task(&id).unwrap().clone();

    assert!(matches!(store.edit(&id, ""), Err(TaskError::Empty)));
    let after = store.task(&id).unwrap();
    assert_eq!(after.text(), before.text());
    assert_eq!(after.updated_at(), before.updated_at());
  }

  #[test]
  fn edit_rejects_long_text() {
    let mut store = empty_store();
    let id = store.add("a").unwrap().value.id().to_owned();
    let before = store.task(&id).unwrap().clone();

    assert!(matches!(
      store.edit(&id, &"x".repeat(201)),
      Err(TaskError::TooLong { .. })
    ));
    let after = store.task(&id).unwrap();
    assert_eq!(after.text(), "a");
    assert_eq!(after.updated_at(), before.updated_at());
    assert_eq!(persisted(&store), vec![before]);
  }

  #[test]
  fn edit_unknown_is_noop() {
    let mut store = empty_store();
    store.add("Buy milk").unwrap();
    assert!(!store.edit("missing", "Walk dog").unwrap().value);
    assert_eq!(texts(&store), vec!["Buy milk"]);
  }

  #[test]
  fn delete_removes_task() {
    let mut store = empty_store();
    let id = store.add("Buy milk").unwrap().value.id().to_owned();
    store.add("Walk dog").unwrap();

    assert!(store.delete(&id).value);
    assert!(!store.delete(&id).value);
    assert_eq!(texts(&store), vec!["Walk dog"]);
    assert_eq!(persisted(&store), store.tasks().to_vec());
  }

  #[test]
  fn scenario_add_toggle_clear_completed() {
    let mut store = empty_store();
    let milk = store.add("Buy milk").unwrap().value.id().to_owned();
    store.add("Walk dog").unwrap();
    assert_eq!(texts(&store), vec!["Walk dog", "Buy milk"]);

    store.toggle(&milk);
    let completed: Vec<&str> = store
      .filter(FilterMode::Completed)
      .iter()
      .map(|t| t.text())
      .collect();
    assert_eq!(completed, vec!["Buy milk"]);

    assert_eq!(store.clear_completed().value, 1);
    assert_eq!(texts(&store), vec!["Walk dog"]);
    assert_eq!(persisted(&store), store.tasks().to_vec());
  }

  #[test]
  fn clear_all_keeps_backing_entry() {
    let mut store = empty_store();
    store.add("a").unwrap();
    store.add("b").unwrap();

    assert_eq!(store.clear_all().value, 2);
    assert!(store.is_empty());
    assert_eq!(
      store.storage().get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
      Some("[]")
    );
  }

  #[test]
  fn reset_removes_backing_entry() {
    let mut store = empty_store();
    store.add("a").unwrap();
    store.add("b").unwrap();

    assert_eq!(store.reset().unwrap(), 2);
    assert!(store.is_empty());
    assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY).unwrap(), None);

    store.add("c").unwrap();
    assert_eq!(persisted(&store).len(), 1);
  }

  #[test]
  fn import_replaces_blank_ids() {
    let mut store = empty_store();
    store
      .import(r#"[{"text": "ok", "id": ""}, {"text": "padded", "id": "  demo9 "}]"#)
      .unwrap();

    let ids: Vec<String> = store.tasks().iter().map(|t| t.id().to_owned()).collect();
    assert_eq!(ids[0].len(), 32);
    assert_eq!(ids[1], "demo9");
    for id in ids.iter() {
      assert_eq!(store.resolve_id(id).as_ref(), Some(id));
    }
  }

  #[test]
  fn filter_partitions_and_preserves_order() {
    let mut store = empty_store();
    for text in ["one", "two", "three", "four", "five"] {
      store.add(text).unwrap();
    }
    let ids: Vec<String> = store.tasks().iter().map(|t| t.id().to_owned()).collect();
    store.toggle(&ids[1]);
    store.toggle(&ids[3]);

    let all = store.filter(FilterMode::All);
    let completed = store.filter(FilterMode::Completed);
    let pending = store.filter(FilterMode::Pending);

    assert_eq!(all.len(), completed.len() + pending.len());
    assert!(completed.iter().all(|c| !pending.iter().any(|p| p.id() == c.id())));
    let pending_texts: Vec<&str> = pending.iter().map(|t| t.text()).collect();
    assert_eq!(pending_texts, vec!["five", "three", "one"]);
    assert_eq!(store.len(), 5);
  }

  #[test]
  fn stats_always_add_up() {
    let mut store = empty_store();
    assert_eq!(store.stats().total, 0);
    let id = store.add("a").unwrap().value.id().to_owned();
    store.add("b").unwrap();
    store.toggle(&id);

    let stats = store.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.total, stats.completed + stats.pending);
  }

  #[test]
  fn export_import_round_trip() {
    let mut source = empty_store();
    let id = source.add("Buy milk").unwrap().value.id().to_owned();
    source.add("Walk dog").unwrap();
    source.toggle(&id);
    let document = source.export().unwrap();
    assert!(document.contains('\n'));

    let mut target = empty_store();
    assert_eq!(target.import(&document).unwrap().value, 2);
    assert_eq!(target.tasks(), source.tasks());
    assert_eq!(persisted(&target), target.tasks().to_vec());
  }

  #[test]
  fn import_appends_without_dedup() {
    let mut store = empty_store();
    store.add("Buy milk").unwrap();
    let document = store.export().unwrap();

    store.add("Walk dog").unwrap();
    assert_eq!(store.import(&document).unwrap().value, 1);
    assert_eq!(texts(&store), vec!["Walk dog", "Buy milk", "Buy milk"]);
    assert_eq!(store.tasks()[1].id(), store.tasks()[2].id());
  }

  #[test]
  fn import_rejects_non_array() {
    let mut store = empty_store();
    store.add("Buy milk").unwrap();

    for document in ["{\"text\": \"x\"}", "not json", "42", "\"[]\""] {
      assert!(
        matches!(store.import(document), Err(TaskError::Format(_))),
        "accepted {}",
        document
      );
    }
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn import_rejects_invalid_record_atomically() {
    let mut store = empty_store();
    let document = r#"[{"text": "fine"}, {"text": "   "}]"#;
    match store.import(document) {
      Err(TaskError::Format(msg)) => assert!(msg.contains("record 1"), "{}", msg),
      other => panic!("unexpected result: {:?}", other.map(|a| a.value)),
    }
    assert!(store.is_empty());
  }

  #[test]
  fn import_empty_array() {
    let mut store = empty_store();
    assert_eq!(store.import("[]").unwrap().value, 0);
  }

  #[test]
  fn load_malformed_yields_empty() {
    let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "{not json");
    let store = TaskStore::load(Box::new(storage), DEFAULT_STORAGE_KEY);
    assert!(store.is_empty());
  }

  #[test]
  fn load_invalid_records_yields_empty() {
    let raw = r#"[{"id": "a", "text": "", "completed": false,
      "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-01T00:00:00.000Z"}]"#;
    let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, raw);
    let store = TaskStore::load(Box::new(storage), DEFAULT_STORAGE_KEY);
    assert!(store.is_empty());
  }

  #[test]
  fn load_browser_written_entry() {
    let raw = r#"[{"id": "lq0x8k2abc", "text": "Buy milk", "completed": true,
      "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-01T01:00:00.000Z"}]"#;
    let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, raw);
    let store = TaskStore::load(Box::new(storage), DEFAULT_STORAGE_KEY);
    assert_eq!(store.len(), 1);
    assert!(store.tasks()[0].is_completed());
  }

  #[test]
  fn failed_save_keeps_memory_state() {
    let mut store = TaskStore::load(Box::new(MemoryStorage::with_quota(16)), DEFAULT_STORAGE_KEY);
    let applied = store.add("Buy milk").unwrap();

    assert!(matches!(
      applied.warning,
      Some(StorageError::QuotaExceeded { .. })
    ));
    assert_eq!(texts(&store), vec!["Buy milk"]);
    assert!(matches!(
      store.save(),
      Err(TaskError::Persistence(StorageError::QuotaExceeded { .. }))
    ));
  }

  #[test]
  fn reload_from_json_storage() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let folder = tmp_dir.path().to_str().unwrap();

    let mut store = TaskStore::load(Box::new(JsonStorage::new(folder).unwrap()), "todoTasks");
    let id = store.add("Buy milk").unwrap().value.id().to_owned();
    store.add("Walk dog").unwrap();
    store.toggle(&id);
    let expected = store.tasks().to_vec();

    let reloaded = TaskStore::load(Box::new(JsonStorage::new(folder).unwrap()), "todoTasks");
    assert_eq!(reloaded.tasks(), expected.as_slice());
  }

  #[test]
  fn load_demo_replaces_tasks() {
    let mut store = empty_store();
    store.add("Buy milk").unwrap();
    assert_eq!(store.load_demo().unwrap().value, 8);
    assert_eq!(store.stats().completed, 2);
    assert!(store.task("demo1").is_some());
    assert!(store.task(store.tasks()[0].id()).is_some());
  }

  #[test]
  fn resolve_full_short_and_prefix_ids() {
    let mut store = empty_store();
    let id = store.add("Buy milk").unwrap().value.id().to_owned();

    assert_eq!(store.resolve_id(&id), Some(id.clone()));
    assert_eq!(store.resolve_id(&shorten_id(&id)), Some(id.clone()));
    assert_eq!(store.resolve_id(&id[..6]), Some(id.clone()));
    assert_eq!(store.resolve_id(""), None);
    assert_eq!(store.resolve_id("zzzz-not-an-id"), None);
  }

  #[test]
  fn resolve_ambiguous_prefix() {
    let mut store = empty_store();
    store
      .import(r#"[{"id": "demo1", "text": "a"}, {"id": "demo2", "text": "b"}]"#)
      .unwrap();
    assert_eq!(store.resolve_id("demo"), None);
    assert_eq!(store.resolve_id("demo2"), Some("demo2".to_owned()));
  }

  #[test]
  fn shorten_ids() {
    assert_eq!(shorten_id("demo1"), "demo1");
    assert_eq!(shorten_id("0123456789abcdef"), "0123..cdef");
  }

  #[test]
  fn export_name_uses_date() {
    let date = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
    assert_eq!(export_file_name(&date), "todo-tasks-2024-03-09.json");
  }
}
