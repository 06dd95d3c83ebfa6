//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers for the subcommands: the CRUD
//! operations on the task store, the leaderboard, shell completions, and the
//! TUI launcher.

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::clock::{format_duration, format_local, now_ms, parse_when};
use crate::store::{JsonFileStorage, TaskStore};
use crate::task::Task;
use crate::tui::run::run_tui;

const DAY_MS: i64 = 1000 * 60 * 60 * 24;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI.
    Ui,

    /// Add a new task.
    Add {
        /// Title for the task.
        title: String,
        /// Start time: "now", "in 5m", "YYYY-MM-DDTHH:MM". Defaults to now.
        #[arg(long)]
        start: Option<String>,
        /// Due time, same formats. Defaults to 24h after start.
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks, running ones first.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
    },

    /// Show the best-times leaderboard.
    Best,

    /// Toggle a task between complete and running.
    Toggle {
        /// Task ID to toggle.
        id: u64,
    },

    /// Edit title, start, or due time of a task.
    Edit {
        /// Task ID to edit.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete a task by ID.
    Delete {
        /// Task ID to delete.
        id: u64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(db_path: &Path) {
    if let Err(e) = run_tui(db_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

fn open_store(db_path: &Path) -> TaskStore {
    TaskStore::open(Box::new(JsonFileStorage::new(db_path)))
}

fn parse_arg(label: &str, value: &str) -> Result<i64> {
    parse_when(value).ok_or_else(|| anyhow::anyhow!("could not parse {label} time {value:?}"))
}

/// Add a new task to the store.
pub fn cmd_add(
    db_path: &Path,
    title: String,
    start: Option<String>,
    due: Option<String>,
) -> Result<()> {
    let mut store = open_store(db_path);
    let start = match start {
        Some(s) => parse_arg("start", &s)?,
        None => now_ms(),
    };
    let due = match due {
        Some(s) => parse_arg("due", &s)?,
        None => start + DAY_MS,
    };
    let id = store.add(&title, start, due)?;
    println!("Added task #{id}: {title}");
    Ok(())
}

/// Print tasks in main-list order.
pub fn cmd_list(db_path: &Path, all: bool) -> Result<()> {
    let store = open_store(db_path);
    let tasks: Vec<&Task> = store
        .main_list()
        .into_iter()
        .filter(|t| all || !t.is_completed())
        .collect();
    if tasks.is_empty() {
        println!("No tasks yet! Add one with `tt add <title>`");
        return Ok(());
    }

    let now = now_ms();
    println!(
        "{:<5} {:<4} {:<17} {:<17} {:<18} {}",
        "ID", "Done", "Started", "Due", "Elapsed", "Title"
    );
    for t in tasks {
        println!(
            "{:<5} {:<4} {:<17} {:<17} {:<18} {}",
            t.id,
            if t.is_completed() { "[x]" } else { "[ ]" },
            format_local(t.start_time),
            format_local(t.due_time),
            format_duration(t.elapsed_ms(now)),
            t.title,
        );
    }
    Ok(())
}

/// Print the best-times leaderboard, fastest completion first.
pub fn cmd_best(db_path: &Path) -> Result<()> {
    let store = open_store(db_path);
    let best = store.best_times();
    if best.is_empty() {
        println!("No completed tasks yet");
        return Ok(());
    }
    for t in best {
        println!(
            "{} / {}",
            format_duration(t.completion_duration_ms().unwrap_or(0)),
            t.title
        );
    }
    Ok(())
}

/// Flip a task between complete and running.
pub fn cmd_toggle(db_path: &Path, id: u64) -> Result<()> {
    let mut store = open_store(db_path);
    if !store.toggle(id)? {
        println!("Task #{id} not found");
        return Ok(());
    }
    let done = store.get(id).map(|t| t.is_completed()).unwrap_or(false);
    if done {
        println!("Completed task #{id}");
    } else {
        println!("Reopened task #{id}");
    }
    Ok(())
}

/// Overwrite title, start, or due on a task, leaving completion untouched.
pub fn cmd_edit(
    db_path: &Path,
    id: u64,
    title: Option<String>,
    start: Option<String>,
    due: Option<String>,
) -> Result<()> {
    let mut store = open_store(db_path);
    let Some(task) = store.get(id) else {
        println!("Task #{id} not found");
        return Ok(());
    };
    let new_title = title.unwrap_or_else(|| task.title.clone());
    let new_start = match start {
        Some(s) => parse_arg("start", &s)?,
        None => task.start_time,
    };
    let new_due = match due {
        Some(s) => parse_arg("due", &s)?,
        None => task.due_time,
    };
    store.update(id, &new_title, new_start, new_due)?;
    println!("Updated task #{id}");
    Ok(())
}

/// Delete a task by ID; a no-op when absent.
pub fn cmd_delete(db_path: &Path, id: u64) -> Result<()> {
    let mut store = open_store(db_path);
    if store.remove(id)? {
        println!("Deleted task #{id}");
    } else {
        println!("Task #{id} not found");
    }
    Ok(())
}

/// Print shell completions to stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = crate::cli::Cli::command();
    generate(shell, &mut cmd, "tt", &mut io::stdout());
}
