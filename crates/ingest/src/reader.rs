use std::collections::HashMap;
use std::io::Read;

use csv::ReaderBuilder;
use logvault_core::error::{LogvaultError, Result};

/// One decoded row, or why it could not be decoded. Structural problems are
/// per-row values rather than stream errors: the iterator keeps going.
#[derive(Debug)]
pub enum RawRow {
    Fields(HashMap<String, String>),
    Malformed(String),
}

/// Lazy, single-pass reader over a CSV byte stream. The header row is
/// consumed up front to build the field-name to column mapping; each `next`
/// decodes exactly one data row, so memory stays bounded by row size.
pub struct RowReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    header: Vec<String>,
}

impl<R: Read> RowReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = rdr
            .headers()
            .map_err(|e| LogvaultError::Ingest(format!("unreadable csv header: {e}")))?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();

        Ok(Self {
            records: rdr.into_records(),
            header,
        })
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(RawRow::Malformed(e.to_string())),
        };

        // A short row simply leaves fields absent; the validator reports
        // them as missing, which keeps structural problems on the same
        // invalid-row path as field problems.
        let mut fields = HashMap::with_capacity(self.header.len());
        for (idx, name) in self.header.iter().enumerate() {
            if let Some(value) = record.get(idx) {
                fields.insert(name.clone(), value.to_string());
            }
        }
        Some(RawRow::Fields(fields))
    }
}
