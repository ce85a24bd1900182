mod bulk;
mod collection;
mod engine;

pub use bulk::{BulkClassification, BulkOutcome, BulkUpdate, bulk_delete, bulk_update};
pub use collection::{Collection, Document, SummaryCounts};
pub use engine::DocumentStore;
