//! Migrate command.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn execute(db_path: &Path) -> Result<()> {
    survey_db::init_pool(db_path)
        .with_context(|| format!("migrating database {}", db_path.display()))?;

    println!("{} Database ready at {}", "✓".green().bold(), db_path.display());
    Ok(())
}
