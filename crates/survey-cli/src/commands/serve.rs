//! Web server command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;
use survey_hub::{HubConfig, LiveHub};
use survey_web::{AppState, ServerConfig};
use tracing::{info, warn};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "SURVEY_PORT", default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "SURVEY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Per-viewer send deadline in milliseconds (0 disables it)
    #[arg(long, env = "SURVEY_SEND_TIMEOUT_MS", default_value = "5000")]
    pub send_timeout_ms: u64,
}

pub async fn execute(args: ServeArgs, db_path: &Path) -> Result<()> {
    let db = survey_db::DbPool::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;

    // The server still starts on a failed migration; queries will report it.
    if let Err(e) = survey_db::run_migrations(&db) {
        warn!(error = %e, "Database migration failed");
    }

    let hub = LiveHub::new(HubConfig::from_millis(args.send_timeout_ms));
    info!(
        database = %db.path().display(),
        send_timeout_ms = args.send_timeout_ms,
        "Starting Survey Right"
    );

    println!();
    println!("  {} {}", "Survey Right".cyan().bold(), "Server".bold());
    println!();
    println!("  {}        http://{}:{}/api", "API".green(), args.host, args.port);
    println!(
        "  {}  ws://{}:{}/ws/dashboard/{{refid}}",
        "Dashboard".green(),
        args.host,
        args.port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    survey_web::run_server(config, AppState::new(db, hub)).await
}
