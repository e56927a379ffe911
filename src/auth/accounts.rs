//! Account Service
//! Mission: Register users, check credentials, seed the first admin

use crate::auth::password::{verify_password, PasswordHasher};
use crate::db::{is_constraint_violation, users as user_rows, Database};
use crate::error::{AppError, ValidationErrors};
use crate::models::{NewUser, Role, User};
use crate::validation::{is_email, max_length, min_length, non_blank, required_string};
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;
const PHONE_MAX: usize = 30;
const EMAIL_TAKEN: &str = "The email has already been taken.";

/// Emails are stored and looked up trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Raw registration body; every field may be missing
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
}

/// Registration that passed field validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
}

impl RegistrationForm {
    /// Field checks only; email uniqueness is checked on insert
    pub fn validate(self) -> Result<Registration, AppError> {
        let mut errors = ValidationErrors::new();

        let name = required_string(&mut errors, "name", self.name, NAME_MAX);

        let email = self.email.map(|e| normalize_email(&e));
        let email = required_string(&mut errors, "email", email, EMAIL_MAX);
        if let Some(email) = &email {
            if !is_email(email) {
                errors.add("email", "The email must be a valid email address.");
            }
        }

        let password = match self.password.filter(|p| !p.is_empty()) {
            Some(password) => {
                min_length(&mut errors, "password", &password, PASSWORD_MIN);
                Some(password)
            }
            None => {
                errors.add("password", "The password field is required.");
                None
            }
        };

        let role = match non_blank(self.role) {
            Some(raw) => {
                let role = Role::parse(raw.trim());
                if role.is_none() {
                    errors.add("role", "The selected role is invalid.");
                }
                role
            }
            None => {
                errors.add("role", "The role field is required.");
                None
            }
        };

        let phone = non_blank(self.phone);
        if let Some(phone) = &phone {
            max_length(&mut errors, "phone", phone, PHONE_MAX);
        }

        errors.into_result()?;

        match (name, email, password, role) {
            (Some(name), Some(email), Some(password), Some(role)) => Ok(Registration {
                name,
                email,
                password,
                role,
                phone,
            }),
            _ => Err(AppError::validation("body", "The given data was invalid.")),
        }
    }
}

/// Raw login body
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    pub fn validate(self) -> Result<(String, String), AppError> {
        let mut errors = ValidationErrors::new();

        let email = non_blank(self.email).map(|e| normalize_email(&e));
        match &email {
            Some(email) if !is_email(email) => {
                errors.add("email", "The email must be a valid email address.")
            }
            Some(_) => {}
            None => errors.add("email", "The email field is required."),
        }

        let password = self.password.filter(|p| !p.is_empty());
        if password.is_none() {
            errors.add("password", "The password field is required.");
        }

        errors.into_result()?;
        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AppError::validation("body", "The given data was invalid.")),
        }
    }
}

/// Hash the password and store the new user.
///
/// A duplicate email is a validation error on `email`, whether caught by the
/// lookup or by the unique index when two registrations race.
pub fn create_account(
    db: &Database,
    hasher: &PasswordHasher,
    registration: Registration,
) -> Result<User, AppError> {
    let credential = hasher.hash(&registration.password).to_string();
    let new_user = NewUser {
        name: registration.name,
        email: registration.email,
        password: credential,
        role: registration.role,
        phone: registration.phone,
    };

    let user = db.transaction(|tx| {
        if user_rows::email_taken(tx, &new_user.email)? {
            return Err(AppError::validation("email", EMAIL_TAKEN));
        }
        user_rows::insert_user(tx, &new_user).map_err(|e| {
            if is_constraint_violation(&e) {
                AppError::validation("email", EMAIL_TAKEN)
            } else {
                e.into()
            }
        })
    })?;

    info!("✅ Registered user: {} ({})", user.email, user.role.as_str());
    Ok(user)
}

/// Check an email/password pair. Unknown email and wrong password are the
/// same failure, and both pay for one key derivation.
pub fn authenticate(
    db: &Database,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let verified = match db.get_user_by_email(email)? {
        Some(user) => verify_password(password, &user.password).then_some(user),
        None => {
            hasher.burn(password);
            None
        }
    };

    verified.ok_or_else(|| {
        warn!("❌ Failed login attempt: {}", email);
        AppError::InvalidCredentials
    })
}

/// Credentials for the out-of-band admin account
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Create the seeded admin unless a user with that email already exists.
/// Returns the new admin, or `None` when nothing was created.
pub fn ensure_admin(
    db: &Database,
    hasher: &PasswordHasher,
    seed: &AdminSeed,
) -> Result<Option<User>> {
    let email = normalize_email(&seed.email);
    if db.get_user_by_email(&email)?.is_some() {
        info!("Admin seed skipped, {} already exists", email);
        return Ok(None);
    }

    let admin = db
        .create_user(&NewUser {
            name: seed.name.clone(),
            email,
            password: hasher.hash(&seed.password).to_string(),
            role: Role::Admin,
            phone: None,
        })
        .context("Failed to create admin user")?;

    info!("🔐 Admin user created: {}", admin.email);
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(role: &str) -> RegistrationForm {
        RegistrationForm {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            password: Some("secret1".to_string()),
            role: Some(role.to_string()),
            phone: None,
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_iterations(1_000)
    }

    fn errors_of(result: Result<Registration, AppError>) -> ValidationErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_registration() {
        let registration = form("employee").validate().unwrap();
        assert_eq!(registration.name, "Ada");
        assert_eq!(registration.role, Role::Employee);
        assert_eq!(registration.phone, None);
    }

    #[test]
    fn test_missing_fields_are_reported_together() {
        let errors = errors_of(RegistrationForm::default().validate());
        for field in ["name", "email", "password", "role"] {
            assert!(errors.has(field), "missing error for {}", field);
        }
        assert!(!errors.has("phone"));
    }

    #[test]
    fn test_field_rules() {
        let mut bad = form("manager");
        bad.email = Some("not-an-email".to_string());
        bad.password = Some("12345".to_string());
        bad.phone = Some("1".repeat(31));
        bad.name = Some("n".repeat(256));

        let errors = errors_of(bad.validate());
        assert_eq!(
            errors.get("email").unwrap()[0],
            "The email must be a valid email address."
        );
        assert_eq!(
            errors.get("password").unwrap()[0],
            "The password must be at least 6 characters."
        );
        assert_eq!(errors.get("role").unwrap()[0], "The selected role is invalid.");
        assert!(errors.has("phone"));
        assert!(errors.has("name"));
    }

    #[test]
    fn test_create_account_hashes_and_rejects_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let hasher = hasher();

        let user = create_account(&db, &hasher, form("employee").validate().unwrap()).unwrap();
        assert_ne!(user.password, "secret1");
        assert!(verify_password("secret1", &user.password));

        match create_account(&db, &hasher, form("admin").validate().unwrap()) {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.get("email").unwrap()[0], EMAIL_TAKEN)
            }
            other => panic!("expected duplicate email error, got {:?}", other),
        }
    }

    #[test]
    fn test_authenticate() {
        let db = Database::open_in_memory().unwrap();
        create_account(&db, &hasher(), form("employee").validate().unwrap()).unwrap();

        let user = authenticate(&db, &hasher(), "ada@example.com", "secret1").unwrap();
        assert_eq!(user.name, "Ada");

        assert!(matches!(
            authenticate(&db, &hasher(), "ada@example.com", "wrong"),
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&db, &hasher(), "nobody@example.com", "secret1"),
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&db, &hasher(), "nobody@example.com", ""),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_email_is_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        let mut first = form("employee");
        first.email = Some(" Ada@Example.COM ".to_string());
        let user = create_account(&db, &hasher(), first.validate().unwrap()).unwrap();
        assert_eq!(user.email, "ada@example.com");

        let mut second = form("employee");
        second.email = Some("ADA@example.com".to_string());
        match create_account(&db, &hasher(), second.validate().unwrap()) {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.get("email").unwrap()[0], EMAIL_TAKEN)
            }
            other => panic!("expected duplicate email error, got {:?}", other),
        }

        let (email, password) = LoginForm {
            email: Some("ADA@EXAMPLE.com".to_string()),
            password: Some("secret1".to_string()),
        }
        .validate()
        .unwrap();
        let found = authenticate(&db, &hasher(), &email, &password).unwrap();
        assert_eq!(found.id, user.id);
    }

    #[test]
    fn test_login_form_validation() {
        let ok = LoginForm {
            email: Some(" Ada@Example.com ".to_string()),
            password: Some("pw".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.0, "ada@example.com");

        match LoginForm::default().validate() {
            Err(AppError::Validation(errors)) => {
                assert!(errors.has("email"));
                assert!(errors.has("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_admin_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let seed = AdminSeed {
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            password: "changeme".to_string(),
        };

        let admin = ensure_admin(&db, &hasher(), &seed).unwrap().unwrap();
        assert!(admin.is_admin());
        assert!(db.admin_exists().unwrap());

        assert!(ensure_admin(&db, &hasher(), &seed).unwrap().is_none());
        assert!(authenticate(&db, &hasher(), "root@example.com", "changeme").is_ok());
    }
}
