//! Create Admin Binary
//!
//! Creates an admin account out-of-band, since the public registration
//! endpoint only issues employee accounts.
//!
//! Usage:
//!   create_admin --email root@example.com --password changeme --name "Root"
//!
//! Environment:
//!   DATABASE_PATH - SQLite file (default: ticketdesk.db)
//!   PBKDF2_ITERATIONS - Iterations for the password hash (default: 100000)

use anyhow::{bail, Result};
use clap::Parser;
use ticketdesk_backend::{
    auth::accounts::{ensure_admin, AdminSeed},
    auth::password::{PasswordHasher, DEFAULT_ITERATIONS},
    config::load_env,
    validation::is_email,
    Database,
};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "create_admin")]
#[command(about = "Create a TicketDesk admin account")]
struct Args {
    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "ticketdesk.db")]
    db_path: String,

    /// Admin email (login name)
    #[arg(long)]
    email: String,

    /// Admin password
    #[arg(long, env = "ADMIN_PASSWORD")]
    password: String,

    /// Display name
    #[arg(long, default_value = "Administrator")]
    name: String,

    /// PBKDF2 iterations
    #[arg(long, env = "PBKDF2_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    pbkdf2_iterations: u32,
}

fn main() -> Result<()> {
    load_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args = Args::parse();

    if !is_email(&args.email) {
        bail!("{} is not a valid email address", args.email);
    }
    if args.password.chars().count() < 6 {
        bail!("Password must be at least 6 characters");
    }

    let db = Database::open(&args.db_path)?;
    let hasher = PasswordHasher::with_iterations(args.pbkdf2_iterations);
    let seed = AdminSeed {
        name: args.name,
        email: args.email,
        password: args.password,
    };

    match ensure_admin(&db, &hasher, &seed)? {
        Some(admin) => info!("Created admin #{} ({})", admin.id, admin.email),
        None => bail!("A user with email {} already exists", seed.email),
    }

    Ok(())
}
