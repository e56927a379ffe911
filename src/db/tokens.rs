//! Personal access token rows
//!
//! Only the SHA-256 digest of a token secret is persisted.

use crate::models::User;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

/// Token row joined with its owner
#[derive(Debug, Clone)]
pub struct TokenOwner {
    pub token_id: i64,
    pub token_hash: String,
    pub user: User,
}

const OWNER_SELECT: &str = "SELECT t.id, t.token_hash,
        u.id, u.name, u.email, u.password, u.role, u.phone, u.created_at, u.updated_at
     FROM personal_access_tokens t
     JOIN users u ON u.id = t.user_id";

fn owner_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TokenOwner> {
    Ok(TokenOwner {
        token_id: row.get(0)?,
        token_hash: row.get(1)?,
        user: User {
            id: row.get(2)?,
            name: row.get(3)?,
            email: row.get(4)?,
            password: row.get(5)?,
            role: row.get(6)?,
            phone: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        },
    })
}

pub fn insert_token(
    conn: &Connection,
    user_id: i64,
    name: &str,
    token_hash: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO personal_access_tokens (user_id, name, token_hash, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![user_id, name, token_hash, Utc::now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_owner_by_id(conn: &Connection, token_id: i64) -> rusqlite::Result<Option<TokenOwner>> {
    conn.query_row(
        &format!("{OWNER_SELECT} WHERE t.id = ?1"),
        params![token_id],
        owner_from_row,
    )
    .optional()
}

pub fn find_owner_by_hash(
    conn: &Connection,
    token_hash: &str,
) -> rusqlite::Result<Option<TokenOwner>> {
    conn.query_row(
        &format!("{OWNER_SELECT} WHERE t.token_hash = ?1"),
        params![token_hash],
        owner_from_row,
    )
    .optional()
}

pub fn touch_token(conn: &Connection, token_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE personal_access_tokens SET last_used_at = ?2 WHERE id = ?1",
        params![token_id, Utc::now()],
    )?;
    Ok(())
}

pub fn delete_token(conn: &Connection, token_id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM personal_access_tokens WHERE id = ?1",
        params![token_id],
    )?;
    Ok(rows > 0)
}

pub fn delete_tokens_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM personal_access_tokens WHERE user_id = ?1",
        params![user_id],
    )
}

pub fn count_tokens_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM personal_access_tokens WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}
