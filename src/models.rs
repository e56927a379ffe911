//! Domain Models
//! Mission: Define users, roles, tickets and the shapes the frontend consumes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String, // credential record - never serialize
    pub role: Role,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

/// Fields required to insert a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
}

/// Compact user reference embedded in ticket listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Ticket status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Completed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "completed" => Some(TicketStatus::Completed),
            _ => None,
        }
    }
}

/// A support ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub created_by: Option<i64>,
    pub assigned_to: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket with its creator and assignee resolved (admin listing)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TicketDetails {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub creator: Option<UserSummary>,
    pub assignee: Option<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, r#""admin""#);

        let employee: Role = serde_json::from_str(r#""employee""#).unwrap();
        assert_eq!(employee, Role::Employee);
    }

    #[test]
    fn test_status_string_conversion() {
        for status in TicketStatus::ALL {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            r#""in_progress""#
        );
        assert_eq!(TicketStatus::parse("done"), None);
        assert_eq!(Role::parse("ADMIN"), None);
    }

    #[test]
    fn test_password_never_serialized() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "100000$abc$def".to_string(),
            role: Role::Employee,
            phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "employee");
    }

    #[test]
    fn test_ticket_details_flattens_ticket() {
        let details = TicketDetails {
            ticket: Ticket {
                id: 7,
                title: "Printer jam".to_string(),
                description: None,
                status: TicketStatus::Open,
                created_by: Some(1),
                assigned_to: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            creator: Some(UserSummary {
                id: 1,
                name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
            }),
            assignee: None,
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "open");
        assert_eq!(json["creator"]["email"], "admin@example.com");
        assert!(json["assignee"].is_null());
    }
}
