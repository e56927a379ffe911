//! Authentication Middleware
//! Mission: Resolve the bearer token on every request
//!
//! The middleware never rejects: it records who the caller is (or that
//! nobody is) and leaves the decision to the guard extractors.

use crate::api::AppState;
use crate::error::AppError;
use crate::models::User;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Caller identity attached to every request
#[derive(Debug, Clone, Default)]
pub struct Identity {
    user: Option<User>,
    token: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The raw bearer token the caller presented (only when it resolved)
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the bearer token (if any) and store the `Identity` in extensions
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = match bearer_token(&req) {
        Some(token) => match state.tokens.resolve(token) {
            Ok(Some(user)) => Identity::authenticated(user, token.to_string()),
            Ok(None) => Identity::anonymous(),
            Err(e) => {
                error!("Token lookup failed: {:#}", e);
                return AppError::Store(e).into_response();
            }
        },
        None => Identity::anonymous(),
    };

    req.extensions_mut().insert(identity.clone());
    let mut response = next.run(req).await;
    // Request logging sits outside this layer and reads it back from here
    response.extensions_mut().insert(identity);
    response
}
