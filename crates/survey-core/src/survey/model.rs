//! Survey domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use survey_db::queries::surveys::SurveyRow;

use crate::error::SurveyResult;

/// A survey definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: String,
    pub refid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secname: Option<String>,
    /// Survey schema, opaque to the backend.
    pub data: Value,
    pub created_at: String,
    pub updated_at: String,
}

impl Survey {
    /// Create a Survey from a database row.
    pub fn from_row(row: SurveyRow) -> SurveyResult<Self> {
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

    pub(crate) fn to_row(&self) -> SurveyResult<SurveyRow> {
        Ok(SurveyRow {
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
pub struct CreateSurveyRequest {
    #[serde(default)]
    pub refid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub secname: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Partial update. Absent fields, and an empty name, keep the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSurveyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub secname: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}
