//! Shared HTTP plumbing: error responses and request extraction.

pub mod error;
pub mod validated_json;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use validated_json::ValidatedJson;
