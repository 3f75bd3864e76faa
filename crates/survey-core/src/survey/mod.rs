//! Survey definitions.

pub mod model;

use crate::error::{SurveyError, SurveyResult};
use crate::{non_empty, now_timestamp};
use model::{CreateSurveyRequest, Survey, UpdateSurveyRequest};
use survey_db::queries::surveys::{self as queries, SurveyChanges};
use survey_db::{DbError, DbPool};
use tracing::info;
use uuid::Uuid;

fn not_found(id: &str) -> impl FnOnce(DbError) -> SurveyError + '_ {
    move |e| match e {
        DbError::NotFound(_) => SurveyError::SurveyNotFound(id.to_string()),
        e => e.into(),
    }
}

/// Create a new survey.
pub fn create_survey(pool: &DbPool, req: CreateSurveyRequest) -> SurveyResult<Survey> {
    if req.refid.trim().is_empty() {
        return Err(SurveyError::validation("refid is required"));
    }
    if req.name.trim().is_empty() {
        return Err(SurveyError::validation("name is required"));
    }
    if req.data.is_null() {
        return Err(SurveyError::validation("data is required"));
    }

    let now = now_timestamp();
    let survey = Survey {
        id: Uuid::new_v4().to_string(),
        refid: req.refid,
        name: req.name,
        secname: non_empty(req.secname),
        data: req.data,
        created_at: now.clone(),
        updated_at: now,
    };

    queries::create_survey(pool, &survey.to_row()?).map_err(|e| match e {
        DbError::Conflict(_) => SurveyError::DuplicateRefId(survey.refid.clone()),
        e => e.into(),
    })?;

    info!(survey_id = %survey.id, refid = %survey.refid, "Survey created");
    Ok(survey)
}

/// List all surveys, newest first.
pub fn list_surveys(pool: &DbPool) -> SurveyResult<Vec<Survey>> {
    queries::list_surveys(pool)?
        .into_iter()
        .map(Survey::from_row)
        .collect()
}

/// Get a survey by its refid.
pub fn get_survey_by_refid(pool: &DbPool, refid: &str) -> SurveyResult<Survey> {
    let row = queries::get_survey_by_refid(pool, refid)?
        .ok_or_else(|| SurveyError::SurveyNotFound(refid.to_string()))?;
    Survey::from_row(row)
}

/// Apply a partial update to the survey with the given ID.
pub fn update_survey(pool: &DbPool, id: &str, req: UpdateSurveyRequest) -> SurveyResult<Survey> {
    let data = req.data.as_ref().map(serde_json::to_string).transpose()?;
    let changes = SurveyChanges {
        name: req.name.as_deref().filter(|s| !s.trim().is_empty()),
        secname: req.secname.as_deref(),
        data: data.as_deref(),
    };

    queries::update_survey(pool, id, &changes, &now_timestamp()).map_err(not_found(id))?;

    let row = queries::get_survey(pool, id).map_err(not_found(id))?;
    Survey::from_row(row)
}

/// Delete the survey with the given ID.
pub fn delete_survey(pool: &DbPool, id: &str) -> SurveyResult<()> {
    queries::delete_survey(pool, id).map_err(not_found(id))?;
    info!(survey_id = %id, "Survey deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        survey_db::run_migrations(&pool).unwrap();
        pool
    }

    fn request(refid: &str) -> CreateSurveyRequest {
        CreateSurveyRequest {
            refid: refid.to_string(),
            name: "Onboarding".to_string(),
            secname: None,
            data: json!({ "questions": [{ "name": "q1", "type": "text" }] }),
        }
    }

    #[test]
    fn test_create_and_fetch() {
        let pool = pool();
        let created = create_survey(&pool, request("ONB")).unwrap();

        let fetched = get_survey_by_refid(&pool, "ONB").unwrap();
        assert_eq!(fetched, created);
        assert_eq!(list_surveys(&pool).unwrap().len(), 1);
    }

    #[test]
    fn test_create_validates() {
        let pool = pool();

        let mut req = request("");
        assert!(matches!(create_survey(&pool, req.clone()), Err(SurveyError::ValidationError(_))));

        req.refid = "X".to_string();
        req.name = "  ".to_string();
        assert!(matches!(create_survey(&pool, req.clone()), Err(SurveyError::ValidationError(_))));

        req.name = "Name".to_string();
        req.data = serde_json::Value::Null;
        assert!(matches!(create_survey(&pool, req), Err(SurveyError::ValidationError(_))));
    }

    #[test]
    fn test_duplicate_refid() {
        let pool = pool();
        create_survey(&pool, request("ONB")).unwrap();
        assert!(matches!(
            create_survey(&pool, request("ONB")),
            Err(SurveyError::DuplicateRefId(refid)) if refid == "ONB"
        ));
    }

    #[test]
    fn test_update_partial() {
        let pool = pool();
        let created = create_survey(&pool, request("ONB")).unwrap();

        let updated = update_survey(
            &pool,
            &created.id,
            UpdateSurveyRequest {
                name: Some(String::new()),
                secname: Some("v2".to_string()),
                data: None,
            },
        )
        .unwrap();

        assert_eq!(updated.name, "Onboarding");
        assert_eq!(updated.secname.as_deref(), Some("v2"));
        assert_eq!(updated.data, created.data);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn test_missing_survey() {
        let pool = pool();
        assert!(matches!(get_survey_by_refid(&pool, "nope"), Err(SurveyError::SurveyNotFound(_))));
        assert!(matches!(
            update_survey(&pool, "nope", UpdateSurveyRequest::default()),
            Err(SurveyError::SurveyNotFound(_))
        ));
        assert!(matches!(delete_survey(&pool, "nope"), Err(SurveyError::SurveyNotFound(_))));
    }

    #[test]
    fn test_delete() {
        let pool = pool();
        let created = create_survey(&pool, request("ONB")).unwrap();
        delete_survey(&pool, &created.id).unwrap();
        assert!(list_surveys(&pool).unwrap().is_empty());
    }
}
