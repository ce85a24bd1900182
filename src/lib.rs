// ============================================================================
// dashstore Library
// ============================================================================

pub mod config;
pub mod core;
pub mod query;
pub mod schema;
pub mod store;
pub mod web;

// Re-export main types for convenience
pub use config::AppConfig;
pub use core::{Result, StoreError};
pub use query::Filter;
pub use schema::{FieldDescriptor, FieldKind, Registry, ResourceSchema};
pub use store::{
    BulkClassification, BulkOutcome, BulkUpdate, Document, DocumentStore, SummaryCounts,
};
pub use web::{AppState, RateLimiter, build_router};
