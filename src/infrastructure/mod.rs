//! Infrastructure layer - external concerns

pub mod crypto;
pub mod storage;

pub use storage::InMemoryRepositories;
