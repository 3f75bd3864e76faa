//! Response domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use survey_db::queries::responses::ResponseRow;

use crate::error::SurveyResult;

/// A submitted survey response.
///
/// This is also the exact JSON pushed to live dashboard viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: String,
    pub refid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secname: Option<String>,
    /// Answers, opaque to the backend.
    pub data: Value,
    pub created_at: String,
    pub updated_at: String,
}

impl SurveyResponse {
    /// Create a SurveyResponse from a database row.
    pub fn from_row(row: ResponseRow) -> SurveyResult<Self> {
        Ok(Self {
            data: serde_json::from_str(&row.data)?,
            id: row.id,
            refid: row.refid,
            name: row.name,
            secname: row.secname,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub(crate) fn to_row(&self) -> SurveyResult<ResponseRow> {
        Ok(ResponseRow {
            id: self.id.clone(),
            refid: self.refid.clone(),
            name: self.name.clone(),
            secname: self.secname.clone(),
            data: serde_json::to_string(&self.data)?,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateResponseRequest {
    #[serde(default)]
    pub refid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub secname: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkResponseRequest {
    #[serde(default)]
    pub responses: Vec<CreateResponseRequest>,
}

/// Responses for one survey together with their total count.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseList {
    pub count: i64,
    pub responses: Vec<SurveyResponse>,
}
