//! Gate aggregate

pub mod model;
pub mod repository;

pub use model::Gate;
pub use repository::GateRepository;
