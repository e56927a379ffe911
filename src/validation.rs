//! Field checks for request bodies.
//!
//! Messages follow the wording the frontend already displays.

use crate::error::ValidationErrors;

/// Treat blank strings as absent, the way form posts arrive.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Required string with an upper bound in characters.
pub fn required_string(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    match non_blank(value) {
        Some(v) => {
            max_length(errors, field, &v, max);
            Some(v)
        }
        None => {
            errors.add(field, format!("The {} field is required.", label(field)));
            None
        }
    }
}

pub fn max_length(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!(
                "The {} may not be greater than {} characters.",
                label(field),
                max
            ),
        );
    }
}

pub fn min_length(errors: &mut ValidationErrors, field: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(
            field,
            format!("The {} must be at least {} characters.", label(field), min),
        );
    }
}

/// Shape check only: one `@`, a non-empty local part, a dotted domain.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    domain.contains('.') && labels.all(|l| !l.is_empty())
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_email("ada@example.com"));
        assert!(is_email("first.last@mail.example.org"));

        assert!(!is_email("ada"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ada@localhost"));
        assert!(!is_email("ada@@example.com"));
        assert!(!is_email("ada @example.com"));
        assert!(!is_email("ada@example..com"));
    }

    #[test]
    fn test_required_string() {
        let mut errors = ValidationErrors::new();
        assert_eq!(required_string(&mut errors, "title", Some("  ".into()), 10), None);
        assert_eq!(
            errors.get("title").unwrap()[0],
            "The title field is required."
        );

        let mut errors = ValidationErrors::new();
        let long = "x".repeat(11);
        assert!(required_string(&mut errors, "assigned_to", Some(long), 10).is_some());
        assert_eq!(
            errors.get("assigned_to").unwrap()[0],
            "The assigned to may not be greater than 10 characters."
        );
    }

    #[test]
    fn test_min_length() {
        let mut errors = ValidationErrors::new();
        min_length(&mut errors, "password", "abc", 6);
        min_length(&mut errors, "name", "abcdef", 6);
        assert!(errors.has("password"));
        assert!(!errors.has("name"));
    }
}
