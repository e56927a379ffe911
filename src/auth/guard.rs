//! Access Control Guard
//! Mission: One role check, applied the same way in front of every handler
//!
//! `authorize` is the pure decision. The extractors below run it before a
//! handler body: a handler that takes `RequireAdmin` cannot execute for an
//! anonymous caller or an employee.

use crate::auth::middleware::Identity;
use crate::error::AppError;
use crate::models::{Role, User};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

/// Role an operation demands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    Admin,
    Employee,
    AnyAuthenticated,
}

impl RequiredRole {
    fn admits(&self, role: Role) -> bool {
        match self {
            RequiredRole::Admin => role == Role::Admin,
            RequiredRole::Employee => role == Role::Employee,
            RequiredRole::AnyAuthenticated => true,
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            RequiredRole::Admin => "Forbidden. Admins only.",
            RequiredRole::Employee => "Forbidden. Employees only.",
            RequiredRole::AnyAuthenticated => "Forbidden.",
        }
    }
}

/// Guard decision when access is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    Unauthenticated,
    Forbidden(RequiredRole),
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => AppError::Unauthenticated,
            AccessError::Forbidden(required) => AppError::forbidden(required.denial_message()),
        }
    }
}

/// Allow or deny `identity` for an operation requiring `required`
pub fn authorize(identity: Option<&User>, required: RequiredRole) -> Result<&User, AccessError> {
    let user = identity.ok_or(AccessError::Unauthenticated)?;
    if required.admits(user.role) {
        Ok(user)
    } else {
        Err(AccessError::Forbidden(required))
    }
}

fn guard_request(parts: &Parts, required: RequiredRole) -> Result<User, AppError> {
    let identity = parts.extensions.get::<Identity>().and_then(Identity::user);
    match authorize(identity, required) {
        Ok(user) => Ok(user.clone()),
        Err(err) => {
            debug!(path = %parts.uri.path(), ?required, ?err, "Access denied");
            Err(err.into())
        }
    }
}

/// Caller must be an admin
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

/// Caller must be an employee
#[derive(Debug, Clone)]
pub struct RequireEmployee(pub User);

/// Caller must be logged in, any role
#[derive(Debug, Clone)]
pub struct Authenticated(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard_request(parts, RequiredRole::Admin).map(RequireAdmin)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireEmployee
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard_request(parts, RequiredRole::Employee).map(RequireEmployee)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard_request(parts, RequiredRole::AnyAuthenticated).map(Authenticated)
    }
}
