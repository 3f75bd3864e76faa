//! Application state.

use survey_core::SurveyResult;
use survey_db::DbPool;
use survey_hub::LiveHub;

use crate::error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub hub: LiveHub,
}

impl AppState {
    pub fn new(db: DbPool, hub: LiveHub) -> Self {
        Self { db, hub }
    }

    /// Run a blocking database operation off the async workers.
    pub async fn run_db<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&DbPool) -> SurveyResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(ApiError::internal)?;
        Ok(result?)
    }
}
