//! Ticket aggregate

pub mod model;
pub mod repository;

pub use model::{Ticket, TicketType};
pub use repository::TicketRepository;
