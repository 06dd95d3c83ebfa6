//! # TT - Task Timer
//!
//! A file-backed task timer with a live terminal UI and a best-times
//! leaderboard.
//!
//! ## Key Features
//!
//! - **Timed Tasks**: Every task carries a start and due time; the elapsed
//!   time runs live and is colored on a green-to-red gradient over five days
//! - **Best Times**: Completed tasks are ranked by completion duration,
//!   fastest first
//! - **Multiple Interfaces**: CLI subcommands for scripting plus an
//!   interactive TUI for visual management
//! - **Local File Storage**: One JSON file holding the full task list,
//!   rewritten atomically on every change
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI
//! tt ui
//!
//! # Add a task starting now, due in two hours
//! tt add "Write release notes" --due "in 2h"
//!
//! # Mark it done, then check the leaderboard
//! tt toggle 1
//! tt best
//! ```
//!
//! Data is stored in `~/.tt/tasks.json`; pass `--db` to use another file.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod clock;
pub mod cmd;
pub mod color;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod enums;
    pub mod form;
    pub mod input;
    pub mod run;
}

use cli::Cli;
use cmd::*;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Determine the database file to use.
    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let tt_dir = PathBuf::from(home).join(".tt");
        if let Err(e) = std::fs::create_dir_all(&tt_dir) {
            eprintln!("Failed to create data directory {}: {}", tt_dir.display(), e);
            std::process::exit(1);
        }
        tt_dir.join("tasks.json")
    });

    let result = match cli.command {
        Commands::Ui => {
            cmd_ui(&db_path);
            return;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return;
        }
        Commands::Add { title, start, due } => cmd_add(&db_path, title, start, due),
        Commands::List { all } => cmd_list(&db_path, all),
        Commands::Best => cmd_best(&db_path),
        Commands::Toggle { id } => cmd_toggle(&db_path, id),
        Commands::Edit {
            id,
            title,
            start,
            due,
        } => cmd_edit(&db_path, id, title, start, due),
        Commands::Delete { id } => cmd_delete(&db_path, id),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
