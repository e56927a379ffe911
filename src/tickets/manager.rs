//! Ticket Lifecycle Manager
//! Mission: Apply ticket business rules atomically
//!
//! Callers have already passed the access guard. Each mutation reads,
//! validates and writes inside one store transaction.

use super::lifecycle::{initial_status, next_status};
use crate::db::{tickets as ticket_rows, users as user_rows, Database};
use crate::error::AppError;
use crate::models::{Ticket, TicketDetails, TicketStatus, User};
use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

pub(crate) const TICKET_NOT_FOUND: &str = "Ticket not found";
pub(crate) const NOT_MINE: &str = "Ticket not found or not assigned to you";
const ASSIGNEE_NOT_EMPLOYEE: &str = "Assigned user must be an employee";

/// Validated input for a new ticket
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<i64>,
}

/// Admin edit. Outer `None` leaves a field untouched; for the nullable
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TicketChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TicketStatus>,
    pub assigned_to: Option<Option<i64>>,
}

#[derive(Clone)]
pub struct TicketManager {
    db: Database,
}

impl TicketManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a ticket on behalf of `creator` (an admin)
    pub fn create(&self, creator: &User, new_ticket: NewTicket) -> Result<Ticket, AppError> {
        let ticket = self.db.transaction(|tx| {
            if let Some(assignee) = new_ticket.assigned_to {
                ensure_employee(tx, assignee)?;
            }

            let ticket = ticket_rows::insert_ticket(
                tx,
                &new_ticket.title,
                new_ticket.description.as_deref(),
                initial_status(new_ticket.assigned_to.is_some()),
                Some(creator.id),
                new_ticket.assigned_to,
                Utc::now(),
            )?;
            Ok::<_, AppError>(ticket)
        })?;

        info!(
            ticket_id = ticket.id,
            status = ticket.status.as_str(),
            "Ticket created by {}",
            creator.email
        );
        Ok(ticket)
    }

    /// Assign a ticket to an employee
    pub fn assign(&self, ticket_id: i64, assignee: i64) -> Result<Ticket, AppError> {
        let ticket = self.db.transaction(|tx| {
            let mut ticket = load(tx, ticket_id)?;
            ensure_employee(tx, assignee)?;

            ticket.assigned_to = Some(assignee);
            ticket.status = next_status(ticket.status, true, None);
            ticket.updated_at = Utc::now();
            ticket_rows::save_ticket(tx, &ticket)?;
            Ok::<_, AppError>(ticket)
        })?;

        info!(
            ticket_id,
            assignee,
            status = ticket.status.as_str(),
            "Ticket assigned"
        );
        Ok(ticket)
    }

    /// Apply an admin edit
    pub fn update(&self, ticket_id: i64, changes: TicketChanges) -> Result<Ticket, AppError> {
        let ticket = self.db.transaction(|tx| {
            let mut ticket = load(tx, ticket_id)?;

            let new_assignee = changes.assigned_to.flatten();
            if let Some(assignee) = new_assignee {
                ensure_employee(tx, assignee)?;
            }

            if let Some(title) = changes.title {
                ticket.title = title;
            }
            if let Some(description) = changes.description {
                ticket.description = description;
            }
            if let Some(assigned_to) = changes.assigned_to {
                ticket.assigned_to = assigned_to;
            }
            ticket.status = next_status(ticket.status, new_assignee.is_some(), changes.status);
            ticket.updated_at = Utc::now();

            ticket_rows::save_ticket(tx, &ticket)?;
            Ok::<_, AppError>(ticket)
        })?;

        info!(
            ticket_id,
            status = ticket.status.as_str(),
            "Ticket updated"
        );
        Ok(ticket)
    }

    /// Mark a ticket completed. Only the current assignee may do this; any
    /// other caller gets the same answer as for a missing ticket.
    pub fn complete(&self, employee: &User, ticket_id: i64) -> Result<Ticket, AppError> {
        let ticket = self.db.transaction(|tx| {
            let mut ticket = ticket_rows::find_assigned_ticket(tx, ticket_id, employee.id)?
                .ok_or_else(|| AppError::not_found(NOT_MINE))?;

            ticket.status = next_status(ticket.status, false, Some(TicketStatus::Completed));
            ticket.updated_at = Utc::now();
            ticket_rows::save_ticket(tx, &ticket)?;
            Ok::<_, AppError>(ticket)
        })?;

        info!(ticket_id, "Ticket completed by {}", employee.email);
        Ok(ticket)
    }

    /// Hard delete
    pub fn delete(&self, ticket_id: i64) -> Result<(), AppError> {
        let deleted = self
            .db
            .transaction(|tx| ticket_rows::delete_ticket(tx, ticket_id))?;
        if !deleted {
            return Err(AppError::not_found(TICKET_NOT_FOUND));
        }

        info!(ticket_id, "🗑️  Ticket deleted");
        Ok(())
    }

    /// All tickets (optionally one status) with creator/assignee summaries
    pub fn list(&self, status: Option<TicketStatus>) -> Result<Vec<TicketDetails>, AppError> {
        let tickets = self.db.with_conn(|conn| {
            ticket_rows::list_tickets(conn, status)?
                .into_iter()
                .map(|ticket| ticket_rows::with_people(conn, ticket))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;
        Ok(tickets)
    }

    /// Tickets currently assigned to `employee`
    pub fn assigned_to(&self, employee: &User) -> Result<Vec<Ticket>, AppError> {
        let tickets = self
            .db
            .with_conn(|conn| ticket_rows::list_assigned(conn, employee.id))?;
        Ok(tickets)
    }
}

fn load(conn: &Connection, ticket_id: i64) -> Result<Ticket, AppError> {
    ticket_rows::find_ticket(conn, ticket_id)?.ok_or_else(|| AppError::not_found(TICKET_NOT_FOUND))
}

/// An assignee must exist and be an employee
fn ensure_employee(conn: &Connection, user_id: i64) -> Result<(), AppError> {
    match user_rows::find_user(conn, user_id)? {
        Some(user) if user.is_employee() => Ok(()),
        _ => Err(AppError::validation("assigned_to", ASSIGNEE_NOT_EMPLOYEE)),
    }
}
