//! Survey Right database layer.
//!
//! SQLite storage for surveys and responses. Row types here are plain
//! strings; parsing into domain models happens in `survey-core`.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use migrations::run_migrations;
pub use pool::{DbError, DbPool, DbResult};

/// Open the database at `path` and bring its schema up to date.
pub fn init_pool(path: &std::path::Path) -> DbResult<DbPool> {
    let pool = DbPool::open(path)?;
    run_migrations(&pool)?;
    Ok(pool)
}
