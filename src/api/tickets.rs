//! Ticket endpoints for admins (`/api/tickets`) and employees (`/api/my-tickets`)

use super::response::{parse_id, ApiJson, ApiQuery};
use super::AppState;
use crate::auth::guard::{RequireAdmin, RequireEmployee};
use crate::error::{AppError, ValidationErrors};
use crate::models::TicketStatus;
use crate::tickets::{NewTicket, TicketChanges, NOT_MINE, TICKET_NOT_FOUND};
use crate::validation::{non_blank, required_string};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

const TITLE_MAX: usize = 255;
const ASSIGNEE_REQUIRED: &str = "The assigned to field is required.";

/// User id as sent by the frontend: a number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

/// Absent field stays `None`; explicit `null` becomes `Some(None)`
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank strings mean "no assignee"; anything else must be an integer id
fn assignee_id(errors: &mut ValidationErrors, input: Option<IdInput>) -> Option<i64> {
    match input? {
        IdInput::Number(id) => Some(id),
        IdInput::Text(text) => {
            let text = non_blank(Some(text))?;
            match text.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("assigned_to", "The selected assigned to is invalid.");
                    None
                }
            }
        }
    }
}

fn parse_status(errors: &mut ValidationErrors, raw: Option<String>) -> Option<TicketStatus> {
    let raw = non_blank(raw)?;
    let status = TicketStatus::parse(raw.trim());
    if status.is_none() {
        errors.add("status", "The selected status is invalid.");
    }
    status
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<IdInput>,
}

impl CreateTicketRequest {
    pub fn validate(self) -> Result<NewTicket, AppError> {
        let mut errors = ValidationErrors::new();
        let title = required_string(&mut errors, "title", self.title, TITLE_MAX);
        let assigned_to = assignee_id(&mut errors, self.assigned_to);
        errors.into_result()?;

        let title = title
            .ok_or_else(|| AppError::validation("title", "The title field is required."))?;
        Ok(NewTicket {
            title,
            description: non_blank(self.description),
            assigned_to,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub assigned_to: Option<Option<IdInput>>,
}

impl UpdateTicketRequest {
    pub fn validate(self) -> Result<TicketChanges, AppError> {
        let mut errors = ValidationErrors::new();

        // Present title must be non-blank
        let title = match self.title {
            Some(title) => required_string(&mut errors, "title", title, TITLE_MAX),
            None => None,
        };
        let status = parse_status(&mut errors, self.status);
        let assigned_to = self
            .assigned_to
            .map(|input| assignee_id(&mut errors, input));

        errors.into_result()?;

        Ok(TicketChanges {
            title,
            description: self.description.map(non_blank),
            status,
            assigned_to,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignTicketRequest {
    pub assigned_to: Option<IdInput>,
}

impl AssignTicketRequest {
    pub fn validate(self) -> Result<i64, AppError> {
        let mut errors = ValidationErrors::new();
        let id = assignee_id(&mut errors, self.assigned_to);
        if id.is_none() && errors.is_empty() {
            errors.add("assigned_to", ASSIGNEE_REQUIRED);
        }
        errors.into_result()?;

        id.ok_or_else(|| AppError::validation("assigned_to", ASSIGNEE_REQUIRED))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketListQuery {
    pub status: Option<String>,
}

/// List tickets - GET /api/tickets (Admin only)
pub async fn list_tickets(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TicketListQuery>,
) -> Result<Json<Value>, AppError> {
    let mut errors = ValidationErrors::new();
    let status = parse_status(&mut errors, query.status);
    errors.into_result()?;

    let tickets = state.tickets.list(status)?;
    Ok(Json(json!({
        "status": true,
        "tickets": tickets,
    })))
}

/// Create ticket - POST /api/tickets (Admin only)
pub async fn create_ticket(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let new_ticket = payload.validate()?;
    let ticket = state.tickets.create(&admin, new_ticket)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": true,
            "message": "Ticket created",
            "ticket": ticket,
        })),
    ))
}

/// Update ticket - PUT /api/tickets/:id (Admin only)
pub async fn update_ticket(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTicketRequest>,
) -> Result<Json<Value>, AppError> {
    let ticket_id = parse_id(&raw_id, TICKET_NOT_FOUND)?;
    let changes = payload.validate()?;
    let ticket = state.tickets.update(ticket_id, changes)?;

    Ok(Json(json!({
        "status": true,
        "message": "Ticket updated",
        "ticket": ticket,
    })))
}

/// Assign ticket - POST /api/tickets/:id/assign (Admin only)
pub async fn assign_ticket(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ApiJson(payload): ApiJson<AssignTicketRequest>,
) -> Result<Json<Value>, AppError> {
    let ticket_id = parse_id(&raw_id, TICKET_NOT_FOUND)?;
    let assignee = payload.validate()?;
    let ticket = state.tickets.assign(ticket_id, assignee)?;

    Ok(Json(json!({
        "status": true,
        "message": "Ticket assigned",
        "ticket": ticket,
    })))
}

/// Delete ticket - DELETE /api/tickets/:id (Admin only)
pub async fn delete_ticket(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ticket_id = parse_id(&raw_id, TICKET_NOT_FOUND)?;
    state.tickets.delete(ticket_id)?;

    Ok(Json(json!({
        "status": true,
        "message": "Ticket deleted",
    })))
}

/// My tickets - GET /api/my-tickets (Employee only)
pub async fn my_tickets(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let tickets = state.tickets.assigned_to(&me)?;
    Ok(Json(json!({
        "status": true,
        "tickets": tickets,
    })))
}

/// Complete ticket - POST /api/my-tickets/:id/complete (Employee only)
pub async fn complete_ticket(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ticket_id = parse_id(&raw_id, NOT_MINE)?;
    let ticket = state.tickets.complete(&me, ticket_id)?;

    Ok(Json(json!({
        "status": true,
        "message": "Ticket marked as completed",
        "ticket": ticket,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::from_value;

    fn update(body: Value) -> Result<TicketChanges, AppError> {
        from_value::<UpdateTicketRequest>(body).unwrap().validate()
    }

    fn validation_fields(err: AppError) -> ValidationErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_request() {
        let ticket = from_value::<CreateTicketRequest>(json!({
            "title": "Printer jam",
            "description": "",
            "assigned_to": "7",
        }))
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(ticket.title, "Printer jam");
        assert_eq!(ticket.description, None);
        assert_eq!(ticket.assigned_to, Some(7));

        let errors = validation_fields(
            from_value::<CreateTicketRequest>(json!({ "assigned_to": "seven" }))
                .unwrap()
                .validate()
                .unwrap_err(),
        );
        assert!(errors.has("title"));
        assert!(errors.has("assigned_to"));
    }

    #[test]
    fn test_update_distinguishes_absent_from_null() {
        let changes = update(json!({})).unwrap();
        assert!(changes.title.is_none());
        assert!(changes.description.is_none());
        assert!(changes.assigned_to.is_none());
        assert!(changes.status.is_none());

        let changes = update(json!({ "description": null, "assigned_to": null })).unwrap();
        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.assigned_to, Some(None));

        let changes = update(json!({ "assigned_to": "", "status": "completed" })).unwrap();
        assert_eq!(changes.assigned_to, Some(None));
        assert_eq!(changes.status, Some(TicketStatus::Completed));

        let changes = update(json!({ "assigned_to": 3, "description": "x" })).unwrap();
        assert_eq!(changes.assigned_to, Some(Some(3)));
        assert_eq!(changes.description, Some(Some("x".to_string())));
    }

    #[test]
    fn test_update_rejects_bad_fields() {
        let errors = validation_fields(
            update(json!({ "title": null, "status": "closed" })).unwrap_err(),
        );
        assert!(errors.has("title"));
        assert_eq!(errors.get("status").unwrap()[0], "The selected status is invalid.");

        let errors = validation_fields(update(json!({ "title": "t".repeat(256) })).unwrap_err());
        assert!(errors.has("title"));
    }

    #[test]
    fn test_assign_request_requires_id() {
        let id = from_value::<AssignTicketRequest>(json!({ "assigned_to": 4 }))
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(id, 4);

        for body in [json!({}), json!({ "assigned_to": null }), json!({ "assigned_to": " " })] {
            let errors = validation_fields(
                from_value::<AssignTicketRequest>(body)
                    .unwrap()
                    .validate()
                    .unwrap_err(),
            );
            assert_eq!(errors.get("assigned_to").unwrap()[0], ASSIGNEE_REQUIRED);
        }
    }
}
