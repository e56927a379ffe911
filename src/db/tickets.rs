//! Ticket rows

use super::users::find_summary;
use super::Database;
use crate::models::{Ticket, TicketDetails, TicketStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TICKET_COLUMNS: &str =
    "id, title, description, status, created_by, assigned_to, created_at, updated_at";

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        created_by: row.get(4)?,
        assigned_to: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a ticket row
pub fn insert_ticket(
    conn: &Connection,
    title: &str,
    description: Option<&str>,
    status: TicketStatus,
    created_by: Option<i64>,
    assigned_to: Option<i64>,
    now: DateTime<Utc>,
) -> rusqlite::Result<Ticket> {
    conn.execute(
        "INSERT INTO tickets (title, description, status, created_by, assigned_to, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![title, description, status, created_by, assigned_to, now],
    )?;

    Ok(Ticket {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        description: description.map(str::to_string),
        status,
        created_by,
        assigned_to,
        created_at: now,
        updated_at: now,
    })
}

pub fn find_ticket(conn: &Connection, id: i64) -> rusqlite::Result<Option<Ticket>> {
    conn.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
        params![id],
        ticket_from_row,
    )
    .optional()
}

/// Ticket by ID, only if it is currently assigned to `assignee`
pub fn find_assigned_ticket(
    conn: &Connection,
    id: i64,
    assignee: i64,
) -> rusqlite::Result<Option<Ticket>> {
    conn.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1 AND assigned_to = ?2"),
        params![id, assignee],
        ticket_from_row,
    )
    .optional()
}

/// Write every mutable column of `ticket` back
pub fn save_ticket(conn: &Connection, ticket: &Ticket) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE tickets
         SET title = ?2, description = ?3, status = ?4, assigned_to = ?5, updated_at = ?6
         WHERE id = ?1",
        params![
            ticket.id,
            ticket.title,
            ticket.description,
            ticket.status,
            ticket.assigned_to,
            ticket.updated_at,
        ],
    )?;
    Ok(())
}

pub fn delete_ticket(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM tickets WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

pub fn list_tickets(
    conn: &Connection,
    status: Option<TicketStatus>,
) -> rusqlite::Result<Vec<Ticket>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets
         WHERE (?1 IS NULL OR status = ?1)
         ORDER BY id"
    ))?;
    let tickets = stmt
        .query_map(params![status], ticket_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tickets)
}

pub fn list_assigned(conn: &Connection, assignee: i64) -> rusqlite::Result<Vec<Ticket>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE assigned_to = ?1 ORDER BY id"
    ))?;
    let tickets = stmt
        .query_map(params![assignee], ticket_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tickets)
}

/// Attach creator/assignee summaries
pub fn with_people(conn: &Connection, ticket: Ticket) -> rusqlite::Result<TicketDetails> {
    let creator = match ticket.created_by {
        Some(id) => find_summary(conn, id)?,
        None => None,
    };
    let assignee = match ticket.assigned_to {
        Some(id) => find_summary(conn, id)?,
        None => None,
    };
    Ok(TicketDetails {
        ticket,
        creator,
        assignee,
    })
}

impl Database {
    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        self.with_conn(|conn| find_ticket(conn, id))
            .context("Failed to load ticket")
    }
}
