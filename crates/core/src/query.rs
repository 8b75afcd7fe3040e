use serde::{Deserialize, Serialize};

use crate::model::log::LogRecord;
use crate::validate::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One bounded slice of stored records plus pagination metadata. Derived per
/// request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub logs: Vec<LogRecord>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    #[serde(rename = "currentPage")]
    pub current_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRequest {
    #[serde(rename = "groupBy")]
    pub group_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateRow {
    pub key: String,
    pub count: u64,
    pub error_count: u64,
}

/// Upload summary. `total_entries` is the committed count; `error` carries
/// only the first-seen row failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub total_entries: usize,
    pub invalid_entries: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<IngestError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

impl IngestError {
    pub fn from_validation(err: &ValidationError) -> Self {
        Self {
            message: err.first().to_string(),
            issues: Some(err.issues.iter().map(|issue| issue.to_string()).collect()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub db_path: String,
    pub logs_count: usize,
}
