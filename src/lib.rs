//! TicketDesk Backend Library
//!
//! Ticket tracking API: admins file and assign tickets, employees complete
//! the ones assigned to them. The binaries and integration tests build on
//! [`api::create_router`].

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod tickets;
pub mod validation;

pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use db::Database;
pub use error::AppError;
