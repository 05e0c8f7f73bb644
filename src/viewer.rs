use std::{cell::RefCell, rc::Rc};

use colored::{Color, ColoredString, Colorize};

use crate::{
  filter::FilterMode,
  notice::{Notice, Severity},
  store::{shorten_id, Applied, TaskStore},
  task::Task,
};

struct ViewColors {}
impl ViewColors {
  const ID: Color = Color::BrightBlack;
  const CHECKBOX_DONE: Color = Color::Green;
  const CHECKBOX_PENDING: Color = Color::Yellow;
  const TIME: Color = Color::BrightBlack;

  const STAT_TOTAL: Color = Color::Cyan;
  const STAT_COMPLETED: Color = Color::Green;
  const STAT_PENDING: Color = Color::Yellow;

  const SUCCESS: Color = Color::Green;
  const INFO: Color = Color::Cyan;
  const WARNING: Color = Color::Yellow;
  const ERROR: Color = Color::Red;
}

const LINE_INDENT: &str = "  ";
// `abcd..wxyz`
const ID_WIDTH: usize = 10;

pub struct Viewer {
  store: Rc<RefCell<TaskStore>>,
}

impl Viewer {
  pub fn new(store: Rc<RefCell<TaskStore>>) -> Self {
    Self { store }
  }

  pub fn print_tasks(&self, mode: FilterMode) {
    {
      let store = self.store.borrow();
      let tasks = store.filter(mode);

      if tasks.is_empty() {
        let (title, hint) = mode.empty_state();
        println!("{}{}", LINE_INDENT, title.bold());
        println!("{}{}", LINE_INDENT, hint.dimmed());
      } else {
        for task in tasks {
          self.print_task(task);
        }
      }
    }

    println!();
    self.print_stats();
  }

  pub fn print_task(&self, task: &Task) {
    let checkbox = match task.is_completed() {
      true => "[x]".color(ViewColors::CHECKBOX_DONE),
      false => "[ ]".color(ViewColors::CHECKBOX_PENDING),
    };

    let text = match task.is_completed() {
      true => task.text().dimmed().strikethrough(),
      false => task.text().normal(),
    };

    println!(
      "{indent}{checkbox} {id}  {text}  {updated}",
      indent = LINE_INDENT,
      checkbox = checkbox,
      id = format_id(task.id()),
      text = text,
      updated = task
        .updated_at()
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
        .color(ViewColors::TIME)
    );
  }

  pub fn print_stats(&self) {
    let stats = self.store.borrow().stats();
    println!(
      "{indent}total: {total}  completed: {completed}  pending: {pending}",
      indent = LINE_INDENT,
      total = stats.total.to_string().color(ViewColors::STAT_TOTAL).bold(),
      completed = stats
        .completed
        .to_string()
        .color(ViewColors::STAT_COMPLETED)
        .bold(),
      pending = stats
        .pending
        .to_string()
        .color(ViewColors::STAT_PENDING)
        .bold(),
    );
  }

  pub fn print_notice(&self, notice: &Notice) {
    let color = match notice.severity {
      Severity::Success => ViewColors::SUCCESS,
      Severity::Info => ViewColors::INFO,
      Severity::Warning => ViewColors::WARNING,
      Severity::Error => ViewColors::ERROR,
    };
    let line = notice.message.color(color);
    match notice.severity {
      Severity::Warning | Severity::Error => eprintln!("{}", line.bold()),
      _ => println!("{}", line),
    }
  }

  /// Prints the outcome notice, followed by the save failure if there was one.
  pub fn print_applied<T>(&self, applied: &Applied<T>, notice: Option<Notice>) {
    if let Some(notice) = notice {
      self.print_notice(&notice);
    }
    if let Some(err) = &applied.warning {
      self.print_notice(&Notice::save_failed());
      eprintln!("{}{}", LINE_INDENT, err.to_string().dimmed());
    }
  }
}

fn format_id(id: &str) -> ColoredString {
  format!("{:width$}", shorten_id(id), width = ID_WIDTH).color(ViewColors::ID)
}
