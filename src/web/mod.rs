//! HTTP surface
//!
//! Axum router, generic per-resource handlers, the shared response
//! envelope, error-to-envelope mapping, and the fixed-window rate gate.

mod envelope;
mod error;
mod handlers;
mod rate_limit;
mod router;

pub use envelope::Envelope;
pub use error::{ApiError, ApiResult};
pub use rate_limit::RateLimiter;
pub use router::{AppState, build_router};
