pub mod fields;
pub mod processor;
pub mod record;


pub use fields::{FieldOutcome, MalformedField};
pub use processor::{
    IssueSummary, ProcessReport, ProcessorError, ProcessorOptions, Problem, RecordIssue,
    RecordProcessor,
};
pub use record::{DateParts, Field, NormalizedRecord, RawRecord};
