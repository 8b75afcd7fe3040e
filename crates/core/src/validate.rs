use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::log::{LEVELS, LogRecord, is_valid_level, is_valid_timestamp};

/// What went wrong with one field of one row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Issue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Row-level validation failure. Recoverable: the row is excluded and the
/// batch continues. May carry several issues; callers surface only the first.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// Structural CSV failures (syntax errors, truncated rows) take the same
    /// invalid-row path as field failures instead of aborting the stream.
    pub fn malformed_row(detail: &str) -> Self {
        Self {
            issues: vec![Issue {
                field: "row".to_string(),
                message: format!("malformed csv row: {detail}"),
            }],
        }
    }

    pub fn first(&self) -> &Issue {
        &self.issues[0]
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first())
    }
}

impl std::error::Error for ValidationError {}

/// Checks one raw row against the record schema. Field rules are independent:
/// every field is inspected even after an earlier one fails, and the issues
/// keep field order (timestamp, service, level, message).
pub fn validate(row: &HashMap<String, String>) -> Result<LogRecord, ValidationError> {
    let mut issues = Vec::new();

    let timestamp = match row.get("timestamp") {
        Some(value) if is_valid_timestamp(value) => value.clone(),
        Some(value) => {
            issues.push(Issue {
                field: "timestamp".to_string(),
                message: format!("must match YYYY-MM-DD HH:MM:SS.ffffff, got {value:?}"),
            });
            String::new()
        }
        None => {
            issues.push(missing("timestamp"));
            String::new()
        }
    };

    let service = match row.get("service") {
        Some(value) => value.clone(),
        None => {
            issues.push(missing("service"));
            String::new()
        }
    };

    let level = match row.get("level") {
        Some(value) if is_valid_level(value) => value.clone(),
        Some(value) => {
            issues.push(Issue {
                field: "level".to_string(),
                message: format!("must be one of {LEVELS:?}, got {value:?}"),
            });
            String::new()
        }
        None => {
            issues.push(missing("level"));
            String::new()
        }
    };

    let message = match row.get("message") {
        Some(value) => value.clone(),
        None => {
            issues.push(missing("message"));
            String::new()
        }
    };

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    Ok(LogRecord {
        id: None,
        timestamp,
        service,
        level,
        message,
    })
}

fn missing(field: &str) -> Issue {
    Issue {
        field: field.to_string(),
        message: "field is missing".to_string(),
    }
}
