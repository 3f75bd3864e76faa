//! Live viewer status.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct LiveStatus {
    pub refid: String,
    pub viewers: usize,
    pub tracked: bool,
}

/// Report how many dashboard viewers are watching `refid`.
pub async fn live_status(
    State(state): State<AppState>,
    Path(refid): Path<String>,
) -> Json<LiveStatus> {
    let registry = state.hub.registry();
    Json(LiveStatus {
        viewers: registry.connection_count(&refid),
        tracked: registry.is_tracked(&refid),
        refid,
    })
}
