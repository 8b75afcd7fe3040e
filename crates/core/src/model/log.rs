use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Accepted level tokens, matched case-sensitively.
pub const LEVELS: [&str; 5] = ["INFO", "WARNING", "ERROR", "DEBUG", "CRITICAL"];

/// One validated log entry. `id` is assigned by the store at insert time and
/// stays `None` until then; stored records are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub timestamp: String,
    pub service: String,
    pub level: String,
    pub message: String,
}

/// Whether `input` has the exact `YYYY-MM-DD HH:MM:SS.ffffff` shape.
/// The check is lexical; the store keeps the text verbatim.
pub fn is_valid_timestamp(input: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{6}$").expect("timestamp pattern")
    });
    pattern.is_match(input)
}

pub fn is_valid_level(input: &str) -> bool {
    LEVELS.contains(&input)
}

/// Levels that count toward `error_count` in aggregations.
pub fn is_error_level(level: &str) -> bool {
    level == "ERROR" || level == "CRITICAL"
}
