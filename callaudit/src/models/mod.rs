mod classification;
mod record;

pub use classification::{AggregateCounts, CallCategory, ClassificationResult};
pub use record::{CallEntry, CallRecord, Direction, RawCallRow, NO_ANSWER_SENTINEL};
