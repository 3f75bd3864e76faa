//! CSV export of survey responses.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{SurveyError, SurveyResult};
use crate::response::model::SurveyResponse;

const FIXED_COLUMNS: [&str; 5] = ["id", "refid", "name", "secname", "created_at"];

/// Attachment file name for a survey's export.
pub fn export_file_name(refid: &str) -> String {
    format!("{}_responses.csv", refid)
}

/// Render responses as CSV.
///
/// Fixed columns come first, followed by the sorted union of the top-level
/// keys found in object-shaped `data` payloads. Each data cell holds the JSON
/// encoding of the value, or is empty when the response lacks that key.
pub fn responses_to_csv(responses: &[SurveyResponse]) -> SurveyResult<Vec<u8>> {
    let data_keys: BTreeSet<&str> = responses
        .iter()
        .filter_map(|r| r.data.as_object())
        .flat_map(|obj| obj.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FIXED_COLUMNS.iter().copied().chain(data_keys.iter().copied()))?;

    for response in responses {
        let mut record = vec![
            response.id.clone(),
            response.refid.clone(),
            response.name.clone().unwrap_or_default(),
            response.secname.clone().unwrap_or_default(),
            format_created_at(&response.created_at),
        ];
        for key in &data_keys {
            let cell = match response.data.get(*key) {
                Some(value) => encode_value(value)?,
                None => String::new(),
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| SurveyError::Io(e.into_error()))
}

fn encode_value(value: &Value) -> SurveyResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn format_created_at(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}
