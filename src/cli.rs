use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed task timer.
/// Storage defaults to ~/.tt/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tt", version, about = "Task timer with best-times tracking")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
