//! TicketDesk - ticket tracking API server
//! Mission: Serve the admin and employee ticket workflow over HTTP
//!
//! Usage:
//!   ticketdesk --bind 0.0.0.0:8000 --db-path ticketdesk.db
//!
//! Environment:
//!   BIND_ADDR - Listen address (default: 0.0.0.0:8000)
//!   DATABASE_PATH - SQLite file (default: ticketdesk.db)
//!   ALLOW_ADMIN_REGISTRATION - Accept role=admin on /api/register (default: false)
//!   PBKDF2_ITERATIONS - Iterations for new password hashes (default: 100000)
//!   BOOTSTRAP_ADMIN_EMAIL / BOOTSTRAP_ADMIN_PASSWORD / BOOTSTRAP_ADMIN_NAME - Seed admin

use anyhow::{Context, Result};
use clap::Parser;
use ticketdesk_backend::{
    auth::accounts::ensure_admin,
    auth::password::DEFAULT_ITERATIONS,
    config::{admin_seed_from_env, load_env},
    create_router, AppConfig, AppState, Database,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ticketdesk")]
#[command(about = "TicketDesk API server")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind: String,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "ticketdesk.db")]
    db_path: String,

    /// Accept role=admin on the public registration endpoint
    #[arg(long, env = "ALLOW_ADMIN_REGISTRATION", default_value_t = false)]
    allow_admin_registration: bool,

    /// PBKDF2 iterations for newly hashed passwords
    #[arg(long, env = "PBKDF2_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    pbkdf2_iterations: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let args = Args::parse();

    info!("🚀 TicketDesk starting");

    let db = Database::open(&args.db_path)?;

    let config = AppConfig {
        allow_admin_registration: args.allow_admin_registration,
        pbkdf2_iterations: args.pbkdf2_iterations,
    };
    if config.allow_admin_registration {
        warn!("⚠️  Admin self-registration is ENABLED");
    }

    if let Some(seed) = admin_seed_from_env() {
        ensure_admin(&db, &config.hasher(), &seed).context("Failed to seed admin user")?;
    } else if !db.admin_exists()? {
        warn!("⚠️  No admin account exists; run create_admin or set BOOTSTRAP_ADMIN_EMAIL");
    }

    let app = create_router(AppState::new(db, config));

    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("🎯 API server listening on {}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ticketdesk_backend=debug,ticketdesk=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
