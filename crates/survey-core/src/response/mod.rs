//! Response ingestion and retrieval.
//!
//! Live broadcast of created responses is not done here; callers hand the
//! returned records to the live hub once these functions succeed.

pub mod model;

use crate::error::{SurveyError, SurveyResult};
use crate::{non_empty, now_timestamp};
use model::{CreateResponseRequest, ResponseList, SurveyResponse};
use survey_db::queries::responses as queries;
use survey_db::DbPool;
use tracing::info;
use uuid::Uuid;

fn build_response(req: CreateResponseRequest, now: &str) -> SurveyResult<SurveyResponse> {
    if req.refid.trim().is_empty() {
        return Err(SurveyError::validation("refid is required"));
    }
    if req.data.is_null() {
        return Err(SurveyError::validation("data is required"));
    }

    Ok(SurveyResponse {
        id: Uuid::new_v4().to_string(),
        refid: req.refid,
        name: non_empty(req.name),
        secname: non_empty(req.secname),
        data: req.data,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    })
}

/// Store one response.
pub fn create_response(pool: &DbPool, req: CreateResponseRequest) -> SurveyResult<SurveyResponse> {
    let response = build_response(req, &now_timestamp())?;
    queries::create_response(pool, &response.to_row()?)?;

    info!(response_id = %response.id, refid = %response.refid, "Response created");
    Ok(response)
}

/// Store a batch of responses atomically, preserving request order.
pub fn bulk_create_responses(
    pool: &DbPool,
    reqs: Vec<CreateResponseRequest>,
) -> SurveyResult<Vec<SurveyResponse>> {
    if reqs.is_empty() {
        return Err(SurveyError::validation("responses must not be empty"));
    }

    let now = now_timestamp();
    let responses = reqs
        .into_iter()
        .enumerate()
        .map(|(i, req)| {
            build_response(req, &now).map_err(|e| match e {
                SurveyError::ValidationError(msg) => {
                    SurveyError::ValidationError(format!("responses[{i}]: {msg}"))
                }
                e => e,
            })
        })
        .collect::<SurveyResult<Vec<_>>>()?;

    let rows = responses
        .iter()
        .map(SurveyResponse::to_row)
        .collect::<SurveyResult<Vec<_>>>()?;
    queries::create_responses(pool, &rows)?;

    info!(count = responses.len(), "Responses bulk created");
    Ok(responses)
}

/// List responses for a survey refid, newest first.
pub fn list_responses(pool: &DbPool, refid: &str) -> SurveyResult<ResponseList> {
    let responses = queries::list_responses_by_refid(pool, refid)?
        .into_iter()
        .map(SurveyResponse::from_row)
        .collect::<SurveyResult<Vec<_>>>()?;
    let count = queries::count_responses_by_refid(pool, refid)?;

    Ok(ResponseList { count, responses })
}
