//! HTTP REST API interfaces
//!
//! - `common`: error responses and the validated JSON extractor
//! - `middleware`: JWT authentication and the admin role gate
//! - `modules`: handlers and DTOs per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, AppState};
