//! Response route handlers.
//!
//! Every created response is pushed to the survey's live viewers after it is
//! stored. Broadcast problems never change the HTTP result.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use survey_core::{response, BulkResponseRequest, CreateResponseRequest, ResponseList, SurveyResponse};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BulkCreated {
    pub count: usize,
    pub responses: Vec<SurveyResponse>,
}

pub async fn create_response(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateResponseRequest>,
) -> ApiResult<(StatusCode, Json<SurveyResponse>)> {
    let created = state
        .run_db(move |db| response::create_response(db, req))
        .await?;

    state.hub.notify_created(&created.refid, &created).await;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn bulk_create_responses(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BulkResponseRequest>,
) -> ApiResult<(StatusCode, Json<BulkCreated>)> {
    let created = state
        .run_db(move |db| response::bulk_create_responses(db, req.responses))
        .await?;

    for item in &created {
        state.hub.notify_created(&item.refid, item).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(BulkCreated {
            count: created.len(),
            responses: created,
        }),
    ))
}

pub async fn list_responses(
    State(state): State<AppState>,
    Path(refid): Path<String>,
) -> ApiResult<Json<ResponseList>> {
    let list = state
        .run_db(move |db| response::list_responses(db, &refid))
        .await?;

    Ok(Json(list))
}
