//! Authentication API Endpoints
//! Mission: Registration, login, logout and the current-user lookup

use crate::api::{response::ApiJson, AppState};
use crate::auth::{
    accounts::{authenticate, create_account, LoginForm, RegistrationForm},
    guard::Authenticated,
    middleware::Identity,
};
use crate::error::AppError;
use crate::models::Role;
use anyhow::Context;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

const ADMIN_REGISTRATION_DISABLED: &str = "Admin registration is disabled";

/// Register - POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegistrationForm>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let registration = form.validate()?;

    if registration.role == Role::Admin && !state.config.allow_admin_registration {
        warn!("⚠️  Rejected admin self-registration: {}", registration.email);
        return Err(AppError::forbidden(ADMIN_REGISTRATION_DISABLED));
    }

    let user = tokio::task::spawn_blocking({
        let db = state.db.clone();
        let hasher = state.hasher;
        move || create_account(&db, &hasher, registration)
    })
    .await
    .context("Registration task failed")??;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": true,
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

/// Login - POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<Json<Value>, AppError> {
    let (email, password) = form.validate()?;
    info!("🔐 Login attempt: {}", email);

    let user = tokio::task::spawn_blocking({
        let db = state.db.clone();
        let hasher = state.hasher;
        move || authenticate(&db, &hasher, &email, &password)
    })
    .await
    .context("Login task failed")??;
    let token = state.tokens.issue(&user)?;

    info!("✅ Login successful: {} ({})", user.email, user.role.as_str());

    Ok(Json(json!({
        "status": true,
        "message": "Login successful",
        "token": token.plain_text,
        "user": user,
    })))
}

/// Logout - POST /api/logout
/// Revokes only the token used for this request.
pub async fn logout(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    if let Some(token) = identity.token() {
        state.tokens.revoke(token)?;
    }
    info!("👋 Logged out: {}", user.email);

    Ok(Json(json!({
        "status": true,
        "message": "Logged out",
    })))
}

/// Current user - GET /api/me
pub async fn me(Authenticated(user): Authenticated) -> Json<Value> {
    Json(json!({
        "status": true,
        "user": user,
    }))
}
