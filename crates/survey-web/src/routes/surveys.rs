//! Survey route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use survey_core::{survey, CreateSurveyRequest, Survey, UpdateSurveyRequest};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn create_survey(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSurveyRequest>,
) -> ApiResult<(StatusCode, Json<Survey>)> {
    let created = state
        .run_db(move |db| survey::create_survey(db, req))
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_surveys(State(state): State<AppState>) -> ApiResult<Json<Vec<Survey>>> {
    let surveys = state.run_db(survey::list_surveys).await?;
    Ok(Json(surveys))
}

pub async fn get_survey(
    State(state): State<AppState>,
    Path(refid): Path<String>,
) -> ApiResult<Json<Survey>> {
    let found = state
        .run_db(move |db| survey::get_survey_by_refid(db, &refid))
        .await?;

    Ok(Json(found))
}

pub async fn update_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateSurveyRequest>,
) -> ApiResult<Json<Survey>> {
    let updated = state
        .run_db(move |db| survey::update_survey(db, &id, req))
        .await?;

    Ok(Json(updated))
}

pub async fn delete_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .run_db(move |db| survey::delete_survey(db, &id))
        .await?;

    Ok(Json(json!({ "message": "survey deleted" })))
}
