//! Bearer Token Issuer
//! Mission: Issue, resolve and revoke opaque API tokens
//!
//! Tokens look like `{row_id}|{secret}`. The row id makes lookup a single
//! primary-key read; the secret is compared against its stored SHA-256
//! digest. Tokens do not expire; they live until logout.

use crate::auth::password::constant_time_eq;
use crate::db::{tokens as token_rows, Database};
use crate::models::User;
use anyhow::{Context, Result};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::debug;

const SECRET_BYTES: usize = 32;
const TOKEN_NAME: &str = "api_token";

/// Plaintext token handed to the client exactly once
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub id: i64,
    pub plain_text: String,
}

/// Token operations backed by the `personal_access_tokens` table
#[derive(Clone)]
pub struct TokenService {
    db: Database,
}

impl TokenService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Issue a new token for `user`
    pub fn issue(&self, user: &User) -> Result<IssuedToken> {
        let secret = generate_secret();
        let token_hash = digest(&secret);

        let id = self
            .db
            .transaction(|tx| token_rows::insert_token(tx, user.id, TOKEN_NAME, &token_hash))
            .context("Failed to store access token")?;

        debug!("Issued token {} for user {}", id, user.id);

        Ok(IssuedToken {
            id,
            plain_text: format!("{}|{}", id, secret),
        })
    }

    /// Resolve a presented token to its owner. Unknown or malformed tokens
    /// resolve to `None`.
    pub fn resolve(&self, token: &str) -> Result<Option<User>> {
        let Some(presented) = PresentedToken::parse(token) else {
            return Ok(None);
        };

        self.db
            .with_conn(|conn| -> rusqlite::Result<Option<User>> {
                let Some(owner) = presented.lookup(conn)? else {
                    return Ok(None);
                };
                token_rows::touch_token(conn, owner.token_id)?;
                Ok(Some(owner.user))
            })
            .context("Failed to resolve access token")
    }

    /// Revoke a token. Revoking an unknown or already revoked token is a no-op.
    pub fn revoke(&self, token: &str) -> Result<()> {
        let Some(presented) = PresentedToken::parse(token) else {
            return Ok(());
        };

        let revoked = self
            .db
            .transaction(|tx| match presented.lookup(tx)? {
                Some(owner) => token_rows::delete_token(tx, owner.token_id),
                None => Ok(false),
            })
            .context("Failed to revoke access token")?;

        if revoked {
            debug!("Revoked access token");
        }
        Ok(())
    }

    /// Revoke every token belonging to a user
    pub fn revoke_all(&self, user_id: i64) -> Result<usize> {
        self.db
            .transaction(|tx| token_rows::delete_tokens_for_user(tx, user_id))
            .context("Failed to revoke user tokens")
    }
}

/// Parsed bearer value
struct PresentedToken {
    id: Option<i64>,
    hash: String,
}

impl PresentedToken {
    fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (id, secret) = match token.split_once('|') {
            Some((id, secret)) => (Some(id.parse::<i64>().ok()?), secret),
            None => (None, token),
        };
        if secret.is_empty() {
            return None;
        }
        Some(Self {
            id,
            hash: digest(secret),
        })
    }

    fn lookup(&self, conn: &rusqlite::Connection) -> rusqlite::Result<Option<token_rows::TokenOwner>> {
        let owner = match self.id {
            Some(id) => token_rows::find_owner_by_id(conn, id)?,
            None => token_rows::find_owner_by_hash(conn, &self.hash)?,
        };
        Ok(owner.filter(|o| constant_time_eq(o.token_hash.as_bytes(), self.hash.as_bytes())))
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn digest(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tokens::count_tokens_for_user;
    use crate::models::{NewUser, Role};

    fn setup() -> (TokenService, Database, User) {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .create_user(&NewUser {
                name: "Eve".to_string(),
                email: "eve@example.com".to_string(),
                password: "1$salt$00".to_string(),
                role: Role::Employee,
                phone: None,
            })
            .unwrap();
        (TokenService::new(db.clone()), db, user)
    }

    #[test]
    fn test_issue_and_resolve() {
        let (tokens, _db, user) = setup();
        let issued = tokens.issue(&user).unwrap();

        assert!(issued.plain_text.starts_with(&format!("{}|", issued.id)));
        let secret = issued.plain_text.split_once('|').unwrap().1;
        assert_eq!(secret.len(), SECRET_BYTES * 2);

        let resolved = tokens.resolve(&issued.plain_text).unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "eve@example.com");
    }

    #[test]
    fn test_plaintext_not_stored() {
        let (tokens, db, user) = setup();
        let issued = tokens.issue(&user).unwrap();
        let secret = issued.plain_text.split_once('|').unwrap().1.to_string();

        let stored: String = db
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT token_hash FROM personal_access_tokens WHERE id = ?1",
                    [issued.id],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_ne!(stored, secret);
        assert_eq!(stored, digest(&secret));
    }

    #[test]
    fn test_bare_secret_resolves() {
        let (tokens, _db, user) = setup();
        let issued = tokens.issue(&user).unwrap();
        let secret = issued.plain_text.split_once('|').unwrap().1;

        assert_eq!(tokens.resolve(secret).unwrap().unwrap().id, user.id);
    }

    #[test]
    fn test_unknown_tokens_resolve_to_none() {
        let (tokens, _db, user) = setup();
        let issued = tokens.issue(&user).unwrap();
        let secret = issued.plain_text.split_once('|').unwrap().1;

        assert!(tokens.resolve("").unwrap().is_none());
        assert!(tokens.resolve("garbage").unwrap().is_none());
        assert!(tokens.resolve("abc|def").unwrap().is_none());
        assert!(tokens.resolve(&format!("{}|", issued.id)).unwrap().is_none());
        // Right id, wrong secret
        assert!(tokens
            .resolve(&format!("{}|{}", issued.id, "0".repeat(64)))
            .unwrap()
            .is_none());
        // Right secret, wrong id
        assert!(tokens
            .resolve(&format!("{}|{}", issued.id + 1, secret))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let (tokens, _db, user) = setup();
        let issued = tokens.issue(&user).unwrap();

        tokens.revoke(&issued.plain_text).unwrap();
        assert!(tokens.resolve(&issued.plain_text).unwrap().is_none());

        tokens.revoke(&issued.plain_text).unwrap();
        tokens.revoke("never-issued").unwrap();
        tokens.revoke("").unwrap();
    }

    #[test]
    fn test_multiple_sessions_are_independent() {
        let (tokens, db, user) = setup();
        let first = tokens.issue(&user).unwrap();
        let second = tokens.issue(&user).unwrap();
        assert_ne!(first.plain_text, second.plain_text);

        tokens.revoke(&first.plain_text).unwrap();
        assert!(tokens.resolve(&first.plain_text).unwrap().is_none());
        assert!(tokens.resolve(&second.plain_text).unwrap().is_some());

        assert_eq!(tokens.revoke_all(user.id).unwrap(), 1);
        let remaining = db
            .with_conn(|conn| count_tokens_for_user(conn, user.id))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_tokens_removed_with_user() {
        let (tokens, db, user) = setup();
        let issued = tokens.issue(&user).unwrap();

        assert!(db.delete_employee(user.id).unwrap());
        assert!(tokens.resolve(&issued.plain_text).unwrap().is_none());
    }
}
