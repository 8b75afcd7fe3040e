pub mod batch;
pub mod reader;

pub use batch::{IngestOutcome, ingest};
