//! Survey Right Core Library
//!
//! Domain models and business logic for surveys and their responses.

pub mod error;
pub mod export;
pub mod response;
pub mod survey;

pub use error::{SurveyError, SurveyResult};
pub use response::model::{BulkResponseRequest, CreateResponseRequest, ResponseList, SurveyResponse};
pub use survey::model::{CreateSurveyRequest, Survey, UpdateSurveyRequest};

use chrono::{SecondsFormat, Utc};

/// Current time as an RFC 3339 UTC timestamp with millisecond precision.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Treat an empty optional string as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
