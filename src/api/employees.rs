//! Employee management endpoints (Admin only)

use super::response::parse_id;
use super::AppState;
use crate::auth::guard::RequireAdmin;
use crate::error::AppError;
use crate::models::Role;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

const EMPLOYEE_NOT_FOUND: &str = "Employee not found";

/// List employees - GET /api/employees
pub async fn list_employees(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let employees = state.db.list_users_by_role(Role::Employee)?;
    Ok(Json(json!({
        "status": true,
        "employees": employees,
    })))
}

/// Show employee - GET /api/employees/:id
pub async fn show_employee(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id, EMPLOYEE_NOT_FOUND)?;
    let employee = state
        .db
        .get_employee(id)?
        .ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))?;

    Ok(Json(json!({
        "status": true,
        "employee": employee,
    })))
}

/// Delete employee - DELETE /api/employees/:id
/// Their tickets stay, unassigned; their tokens go with them.
pub async fn delete_employee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id, EMPLOYEE_NOT_FOUND)?;
    if !state.db.delete_employee(id)? {
        return Err(AppError::not_found(EMPLOYEE_NOT_FOUND));
    }

    info!("🗑️  Employee {} deleted by {}", id, admin.email);
    Ok(Json(json!({
        "status": true,
        "message": "Employee deleted",
    })))
}
