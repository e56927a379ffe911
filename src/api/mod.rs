//! HTTP API
//! Mission: Route `/api/*` to the guarded handlers and wire the middleware stack

pub mod employees;
pub mod response;
pub mod tickets;

use crate::auth::{api as auth_api, middleware::resolve_identity, tokens::TokenService};
use crate::auth::password::PasswordHasher;
use crate::config::AppConfig;
use crate::db::Database;
use crate::middleware::request_logging;
use crate::tickets::TicketManager;
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenService,
    pub tickets: TicketManager,
    pub hasher: PasswordHasher,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            tokens: TokenService::new(db.clone()),
            tickets: TicketManager::new(db.clone()),
            hasher: config.hasher(),
            config: Arc::new(config),
            db,
        }
    }
}

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/register", post(auth_api::register))
        .route("/login", post(auth_api::login))
        .route("/logout", post(auth_api::logout))
        .route("/me", get(auth_api::me))
        .route("/employees", get(employees::list_employees))
        .route(
            "/employees/:id",
            get(employees::show_employee).delete(employees::delete_employee),
        )
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/:id",
            put(tickets::update_ticket).delete(tickets::delete_ticket),
        )
        .route("/tickets/:id/assign", post(tickets::assign_ticket))
        .route("/my-tickets", get(tickets::my_tickets))
        .route(
            "/my-tickets/:id/complete",
            post(tickets::complete_ticket),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .layer(middleware::from_fn(request_logging))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": true,
        "service": "ticketdesk",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
