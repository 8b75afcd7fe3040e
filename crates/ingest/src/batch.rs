use std::io::Read;

use logvault_core::error::Result;
use logvault_core::model::log::LogRecord;
use logvault_core::validate::{self, ValidationError};

use crate::reader::{RawRow, RowReader};

/// The partition produced by one ingestion pass. Exists only for the
/// duration of the request; nothing here is persisted.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub valid: Vec<LogRecord>,
    pub invalid_count: usize,
    pub first_error: Option<ValidationError>,
}

/// Streams CSV rows out of `reader` and validates each one. Valid records
/// keep their input order; invalid rows bump the counter, and only the first
/// error is retained for the report (later ones are dropped).
pub fn ingest<R: Read>(reader: R) -> Result<IngestOutcome> {
    let rows = RowReader::new(reader)?;
    let mut outcome = IngestOutcome::default();

    for row in rows {
        let result = match row {
            RawRow::Fields(fields) => validate::validate(&fields),
            RawRow::Malformed(detail) => Err(ValidationError::malformed_row(&detail)),
        };

        match result {
            Ok(record) => outcome.valid.push(record),
            Err(err) => {
                outcome.invalid_count += 1;
                outcome.first_error.get_or_insert(err);
            }
        }
    }

    Ok(outcome)
}
