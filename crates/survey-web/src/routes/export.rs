//! CSV export handler.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use survey_core::{export, response};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn export_responses(
    State(state): State<AppState>,
    Path(refid): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let disposition = format!("attachment; filename={}", export::export_file_name(&refid));

    let body = state
        .run_db(move |db| {
            let list = response::list_responses(db, &refid)?;
            export::responses_to_csv(&list.responses)
        })
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
