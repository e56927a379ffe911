//! Ticket lifecycle: status rules and the manager that enforces them

pub mod lifecycle;
mod manager;

pub(crate) use manager::{NOT_MINE, TICKET_NOT_FOUND};
pub use manager::{NewTicket, TicketChanges, TicketManager};
