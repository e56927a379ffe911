//! Password hashing and verification
//!
//! PBKDF2-HMAC-SHA256. Stored records are self-describing:
//! `iterations$salt$derived_key_hex`, so the iteration count can be raised
//! later without invalidating existing credentials. The salt is 16 random
//! bytes rendered as 32 hex characters; the hex text itself is the KDF salt.

use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

/// Iteration count for newly issued credentials
pub const DEFAULT_ITERATIONS: u32 = 100_000;

const SALT_BYTES: usize = 16;
const KEY_BYTES: usize = 32;
/// Upper bound on derived key length accepted from a stored record
const MAX_KEY_BYTES: usize = 64;

/// Parsed form of a stored credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    iterations: u32,
    salt: String,
    key: Vec<u8>,
}

impl CredentialRecord {
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Re-derive with the embedded parameters and compare in constant time
    pub fn matches(&self, password: &str) -> bool {
        let mut derived = vec![0u8; self.key.len()];
        pbkdf2_hmac::<Sha256>(
            password.as_bytes(),
            self.salt.as_bytes(),
            self.iterations,
            &mut derived,
        );
        constant_time_eq(&derived, &self.key)
    }
}

impl fmt::Display for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}${}${}",
            self.iterations,
            self.salt,
            hex::encode(&self.key)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed credential record")]
pub struct MalformedCredential;

impl FromStr for CredentialRecord {
    type Err = MalformedCredential;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('$').collect();
        let [iterations, salt, key] = parts.as_slice() else {
            return Err(MalformedCredential);
        };

        let iterations: u32 = iterations.parse().map_err(|_| MalformedCredential)?;
        if iterations == 0 || salt.is_empty() {
            return Err(MalformedCredential);
        }

        let key = hex::decode(key).map_err(|_| MalformedCredential)?;
        if key.is_empty() || key.len() > MAX_KEY_BYTES {
            return Err(MalformedCredential);
        }

        Ok(Self {
            iterations,
            salt: salt.to_string(),
            key,
        })
    }
}

/// Issues new credential records
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with a custom iteration count (zero is bumped to one)
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> CredentialRecord {
        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);

        let mut key = vec![0u8; KEY_BYTES];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), self.iterations, &mut key);

        CredentialRecord {
            iterations: self.iterations,
            salt,
            key,
        }
    }
}

impl PasswordHasher {
    /// Derive and discard a key at this hasher's cost. Used in place of a
    /// verification when there is no stored record to check against.
    pub fn burn(&self, password: &str) {
        let _ = self.hash(password);
    }
}

/// Hash a password with the default parameters, returning the stored form
pub fn hash_password(password: &str) -> String {
    PasswordHasher::default().hash(password).to_string()
}

/// Verify a password against a stored record.
///
/// Malformed records verify as `false`.
pub fn verify_password(password: &str, stored: &str) -> bool {
    stored
        .parse::<CredentialRecord>()
        .map(|record| record.matches(password))
        .unwrap_or(false)
}

/// Constant-time byte comparison to prevent timing attacks
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
