extern crate chrono;
extern crate colored;
extern crate serde;
extern crate serde_json;

use std::{cell::RefCell, io::Read, process::ExitCode, rc::Rc};

use log::debug;

use todo::{
  command::{Command, Confirmation, Effect},
  export_file_name,
  filter::FilterMode,
  notice::Notice,
  storage::JsonStorage,
  time,
  viewer::Viewer,
  Config, TaskStore,
};

fn build_cli() -> clap::Command<'static> {
  clap::Command::new("todo")
    .about("Local task list")
    .version(env!("CARGO_PKG_VERSION"))
    .arg_required_else_help(true)
    .subcommand(
      clap::Command::new("add")
        .about("Add a task")
        .arg(
          clap::Arg::new("text")
            .required(true)
            .index(1)
            .multiple_values(true),
        ),
    )
    .subcommand(
      clap::Command::new("list")
        .about("Show tasks")
        .alias("ls")
        .arg(
          clap::Arg::new("filter")
            .long("filter")
            .short('f')
            .takes_value(true)
            .possible_values(FilterMode::NAMES)
            .default_value("all"),
        ),
    )
    .subcommand(
      clap::Command::new("toggle")
        .about("Mark a task completed or pending")
        .arg(clap::Arg::new("id").required(true).index(1)),
    )
    .subcommand(
      clap::Command::new("edit").about("Change task text").args(&[
        clap::Arg::new("id").required(true).index(1),
        clap::Arg::new("text")
          .required(true)
          .index(2)
          .multiple_values(true),
      ]),
    )
    .subcommand(
      clap::Command::new("delete")
        .about("Delete a task")
        .alias("rm")
        .args(&[
          clap::Arg::new("id").required(true).index(1),
          yes_arg(),
        ]),
    )
    .subcommand(
      clap::Command::new("clear-completed")
        .about("Delete completed tasks")
        .arg(yes_arg()),
    )
    .subcommand(
      clap::Command::new("clear-all")
        .about("Delete all tasks")
        .arg(yes_arg()),
    )
    .subcommand(clap::Command::new("stats").about("Show task counters"))
    .subcommand(
      clap::Command::new("export")
        .about("Write all tasks to a JSON file")
        .args(&[
          clap::Arg::new("output")
            .long("output")
            .short('o')
            .takes_value(true),
          clap::Arg::new("stdout")
            .long("stdout")
            .conflicts_with("output"),
        ]),
    )
    .subcommand(
      clap::Command::new("import")
        .about("Append tasks from a JSON file ('-' reads stdin)")
        .arg(clap::Arg::new("path").required(true).index(1)),
    )
    .subcommand(
      clap::Command::new("demo")
        .about("Replace all tasks with demo data")
        .arg(yes_arg()),
    )
    .subcommand(
      clap::Command::new("reset")
        .about("Remove stored tasks entirely")
        .arg(yes_arg()),
    )
    .subcommand(
      clap::Command::new("completions")
        .about("Generate shell completions")
        .arg(
          clap::Arg::new("shell")
            .required(true)
            .index(1)
            .possible_values(["bash", "elvish", "fish", "powershell", "zsh"]),
        ),
    )
}

fn yes_arg() -> clap::Arg<'static> {
  clap::Arg::new("yes")
    .long("yes")
    .short('y')
    .help("Don't ask for confirmation")
}

fn main() -> ExitCode {
  env_logger::init();

  let matches = build_cli().get_matches();

  if let Some(("completions", command_matches)) = matches.subcommand() {
    let shell = command_matches
      .value_of("shell")
      .unwrap_or_default()
      .parse::<clap_complete::Shell>();
    return match shell {
      Ok(shell) => {
        clap_complete::generate(shell, &mut build_cli(), "todo", &mut std::io::stdout());
        ExitCode::SUCCESS
      }
      Err(err) => {
        eprintln!("unknown shell: {}", err);
        ExitCode::FAILURE
      }
    };
  }

  let config = match Config::load() {
    Ok(config) => config,
    Err(err) => {
      eprintln!("config error: {}", err);
      return ExitCode::FAILURE;
    }
  };
  debug!("todo data folder: {}", config.storage_dir_path);

  let storage = match JsonStorage::new(&config.storage_dir_path) {
    Ok(storage) => storage,
    Err(err) => {
      eprintln!("storage error: {}", err);
      return ExitCode::FAILURE;
    }
  };

  let store = Rc::new(RefCell::new(TaskStore::load(
    Box::new(storage),
    &config.storage_key,
  )));
  let viewer = Viewer::new(Rc::clone(&store));

  let succeeded = match matches.subcommand() {
    Some(("add", command_matches)) => {
      let text = joined_values(command_matches, "text");
      run_command(&store, &viewer, Command::Add(text), true)
    }

    Some(("list", command_matches)) => {
      let mode = command_matches
        .value_of("filter")
        .unwrap_or_default()
        .parse::<FilterMode>()
        .unwrap_or_default();
      viewer.print_tasks(mode);
      true
    }

    Some(("toggle", command_matches)) => match resolve(&store, command_matches) {
      Some(id) => run_command(&store, &viewer, Command::Toggle(id), true),
      None => false,
    },

    Some(("edit", command_matches)) => match resolve(&store, command_matches) {
      Some(id) => {
        let text = joined_values(command_matches, "text");
        run_command(&store, &viewer, Command::Edit(id, text), true)
      }
      None => false,
    },

    Some(("delete", command_matches)) => match resolve(&store, command_matches) {
      Some(id) => {
        let assume_yes = command_matches.is_present("yes");
        run_command(&store, &viewer, Command::Delete(id), assume_yes)
      }
      None => false,
    },

    Some(("clear-completed", command_matches)) => {
      let assume_yes = command_matches.is_present("yes");
      run_command(&store, &viewer, Command::ClearCompleted, assume_yes)
    }

    Some(("clear-all", command_matches)) => {
      let assume_yes = command_matches.is_present("yes");
      run_command(&store, &viewer, Command::ClearAll, assume_yes)
    }

    Some(("stats", _)) => {
      viewer.print_stats();
      true
    }

    Some(("export", command_matches)) => export(&store, &viewer, command_matches),

    Some(("import", command_matches)) => {
      let path = command_matches.value_of("path").unwrap_or("-");
      import(&store, &viewer, path)
    }

    Some(("demo", command_matches)) => {
      let count = store.borrow().len();
      let confirmed = count == 0
        || command_matches.is_present("yes")
        || ask(&format!(
          "This will replace all {} tasks with demo data. Continue?",
          count
        ));
      if !confirmed {
        viewer.print_notice(&Notice::info("Nothing changed."));
        true
      } else {
        let result = store.borrow_mut().load_demo();
        match result {
          Ok(applied) => {
            let notice = Notice::success(&format!("{} demo tasks loaded!", applied.value));
            viewer.print_applied(&applied, Some(notice));
            true
          }
          Err(err) => {
            viewer.print_notice(&Notice::from(&err));
            false
          }
        }
      }
    }

    Some(("reset", command_matches)) => {
      let confirmed = command_matches.is_present("yes")
        || ask("Are you sure you want to remove all stored tasks? This action cannot be undone.");
      if !confirmed {
        viewer.print_notice(&Notice::info("Nothing changed."));
        true
      } else {
        let result = store.borrow_mut().reset();
        match result {
          Ok(count) => {
            viewer.print_notice(&Notice::success(&format!("{} tasks removed!", count)));
            true
          }
          Err(err) => {
            debug!("reset failed: {}", err);
            viewer.print_notice(&Notice::from(&err));
            false
          }
        }
      }
    }

    Some((subcmd, _)) => {
      eprintln!("unknown subcommand {}", subcmd);
      false
    }
    None => {
      eprintln!("subcommand not found");
      false
    }
  };

  match succeeded {
    true => ExitCode::SUCCESS,
    false => ExitCode::FAILURE,
  }
}

fn joined_values(matches: &clap::ArgMatches, name: &str) -> String {
  matches
    .values_of(name)
    .map(|values| values.collect::<Vec<&str>>().join(" "))
    .unwrap_or_default()
}

fn resolve(store: &Rc<RefCell<TaskStore>>, matches: &clap::ArgMatches) -> Option<String> {
  let raw_id = matches.value_of("id").unwrap_or_default();
  let resolved = store.borrow().resolve_id(raw_id);
  if resolved.is_none() {
    eprintln!("task not found: {}", raw_id);
  }
  return resolved;
}

fn ask(question: &str) -> bool {
  eprint!("{} [y/N] ", question);
  let mut answer = String::new();
  if std::io::stdin().read_line(&mut answer).is_err() {
    return false;
  }
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn run_command(
  store: &Rc<RefCell<TaskStore>>,
  viewer: &Viewer,
  command: Command,
  assume_yes: bool,
) -> bool {
  let prompt = command.confirmation_prompt(&store.borrow());
  let confirmation = match prompt {
    Some(question) if !assume_yes => Confirmation::from(ask(&question)),
    _ => Confirmation::Confirmed,
  };

  let result = store.borrow_mut().dispatch(command.clone(), confirmation);
  match result {
    Ok(applied) => {
      if let Effect::Added(task) = &applied.value {
        viewer.print_task(task);
      }
      viewer.print_applied(&applied, applied.value.notice());
      applied.is_saved()
    }
    Err(err) => {
      debug!("command failed: {}", err);
      viewer.print_notice(&command.error_notice(&err));
      false
    }
  }
}

fn export(store: &Rc<RefCell<TaskStore>>, viewer: &Viewer, matches: &clap::ArgMatches) -> bool {
  let document = match store.borrow().export() {
    Ok(document) => document,
    Err(err) => {
      eprintln!("export error: {}", err);
      return false;
    }
  };

  if matches.is_present("stdout") {
    println!("{}", document);
    return true;
  }

  let path = matches
    .value_of("output")
    .map(|p| p.to_owned())
    .unwrap_or_else(|| export_file_name(&time::now()));

  match std::fs::write(&path, document) {
    Ok(_) => {
      viewer.print_notice(&Notice::exported());
      println!("{}", path);
      true
    }
    Err(err) => {
      eprintln!("can't write {}: {}", path, err);
      false
    }
  }
}

fn import(store: &Rc<RefCell<TaskStore>>, viewer: &Viewer, path: &str) -> bool {
  let mut document = String::new();
  let read = match path {
    "-" => std::io::stdin().read_to_string(&mut document).map(|_| ()),
    _ => std::fs::read_to_string(path).map(|contents| document = contents),
  };
  if let Err(err) = read {
    eprintln!("can't read {}: {}", path, err);
    return false;
  }

  let result = store.borrow_mut().import(&document);
  match result {
    Ok(applied) => {
      viewer.print_applied(&applied, Some(Notice::imported(applied.value)));
      applied.is_saved()
    }
    Err(err) => {
      debug!("import failed: {}", err);
      viewer.print_notice(&Notice::from(&err));
      false
    }
  }
}
