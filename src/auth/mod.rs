//! Authentication Module
//! Mission: PBKDF2 credentials, opaque bearer tokens and role-based access

pub mod accounts;
pub mod api;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod tokens;

pub use guard::{authorize, AccessError, Authenticated, RequireAdmin, RequireEmployee, RequiredRole};
pub use middleware::{resolve_identity, Identity};
pub use password::{hash_password, verify_password, PasswordHasher};
pub use tokens::{IssuedToken, TokenService};
