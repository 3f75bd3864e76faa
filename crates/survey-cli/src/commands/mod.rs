//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod migrate;
pub mod serve;

/// Survey Right - survey backend with a live response dashboard
#[derive(Parser)]
#[command(name = "survey-right")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(long, global = true, env = "SURVEY_DATABASE", default_value = "survey-right.db")]
    pub database: PathBuf,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(serve::ServeArgs),

    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args, &self.database).await,
            Commands::Migrate => migrate::execute(&self.database),
        }
    }
}
