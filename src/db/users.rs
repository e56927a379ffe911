//! User rows

use super::Database;
use crate::models::{NewUser, Role, User, UserSummary};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, name, email, password, role, phone, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        phone: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub fn insert_user(conn: &Connection, new_user: &NewUser) -> rusqlite::Result<User> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO users (name, email, password, role, phone, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            new_user.name,
            new_user.email,
            new_user.password,
            new_user.role,
            new_user.phone,
            now,
        ],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: new_user.name.clone(),
        email: new_user.email.clone(),
        password: new_user.password.clone(),
        role: new_user.role,
        phone: new_user.phone.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn find_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        user_from_row,
    )
    .optional()
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        params![email],
        user_from_row,
    )
    .optional()
}

pub fn email_taken(conn: &Connection, email: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        params![email],
        |row| row.get(0),
    )
}

pub fn find_summary(conn: &Connection, id: i64) -> rusqlite::Result<Option<UserSummary>> {
    conn.query_row(
        "SELECT id, name, email FROM users WHERE id = ?1",
        params![id],
        |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn list_by_role(conn: &Connection, role: Role) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY id"
    ))?;
    let users = stmt
        .query_map(params![role], user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Deletes the row; tickets referencing the user are cleared by the
/// `ON DELETE SET NULL` foreign keys, tokens by `ON DELETE CASCADE`.
pub fn delete_user(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

impl Database {
    /// Get user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| find_user(conn, id))
            .context("Failed to load user")
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| find_user_by_email(conn, email))
            .context("Failed to load user by email")
    }

    /// Insert a user; the caller has already hashed the password
    pub fn create_user(&self, new_user: &NewUser) -> Result<User> {
        self.with_conn(|conn| insert_user(conn, new_user))
            .context("Failed to insert user")
    }

    /// Users with the given role, oldest first
    pub fn list_users_by_role(&self, role: Role) -> Result<Vec<User>> {
        self.with_conn(|conn| list_by_role(conn, role))
            .context("Failed to list users")
    }

    /// Employee by ID; admins are invisible through this lookup
    pub fn get_employee(&self, id: i64) -> Result<Option<User>> {
        Ok(self.get_user(id)?.filter(User::is_employee))
    }

    /// Delete an employee. Returns false when no employee has this ID.
    pub fn delete_employee(&self, id: i64) -> Result<bool> {
        self.transaction(|tx| {
            match find_user(tx, id)? {
                Some(user) if user.is_employee() => delete_user(tx, id),
                _ => Ok(false),
            }
        })
        .context("Failed to delete employee")
    }

    pub fn admin_exists(&self) -> Result<bool> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')",
                [],
                |row| row.get(0),
            )
        })
        .context("Failed to check for admin users")
    }
}
