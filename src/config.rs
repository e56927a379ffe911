//! Runtime configuration shared by the binaries and the handlers

use crate::auth::accounts::AdminSeed;
use crate::auth::password::{PasswordHasher, DEFAULT_ITERATIONS};
use std::env;
use std::path::Path;

const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Settings the request handlers need
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Accept `role=admin` on the public registration endpoint
    pub allow_admin_registration: bool,
    pub pbkdf2_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            allow_admin_registration: false,
            pbkdf2_iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl AppConfig {
    pub fn hasher(&self) -> PasswordHasher {
        PasswordHasher::with_iterations(self.pbkdf2_iterations)
    }
}

/// Load `.env` from the working directory (and parents), then from the
/// crate directory.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

/// Admin account to seed at startup, from `BOOTSTRAP_ADMIN_EMAIL`,
/// `BOOTSTRAP_ADMIN_PASSWORD` and optionally `BOOTSTRAP_ADMIN_NAME`.
pub fn admin_seed_from_env() -> Option<AdminSeed> {
    let email = non_empty_var("BOOTSTRAP_ADMIN_EMAIL")?;
    let password = non_empty_var("BOOTSTRAP_ADMIN_PASSWORD")?;
    let name = non_empty_var("BOOTSTRAP_ADMIN_NAME")
        .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());

    Some(AdminSeed {
        name,
        email,
        password,
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
