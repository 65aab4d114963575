//! Submit-time field validation.

use std::collections::BTreeMap;

use senselib_kernel::{ApiError, EntityDescriptor, Rule};
use serde_json::Value;

/// Reserved key for whole-form and server-side messages.
pub const FORM_KEY: &str = "form";

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whole-form banner message.
    pub fn form(&self) -> Option<&str> {
        self.get(FORM_KEY)
    }

    pub fn set_form(&mut self, message: impl Into<String>) {
        self.insert(FORM_KEY, message);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors for a failed mutation: field details plus the form banner.
    pub fn from_api_error(error: &ApiError) -> Self {
        let mut errors = Self::new();
        for (field, message) in error.field_errors() {
            errors.insert(field, message);
        }
        errors.set_form(error.user_message());
        errors
    }
}

/// Run the descriptor's rules against a serialized draft.
///
/// Only the first failing rule of each field is reported.
pub fn validate(descriptor: &EntityDescriptor, draft: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for rule in descriptor.rules() {
        if errors.contains(rule.field) {
            continue;
        }
        if !passes(&rule.rule, draft.get(rule.field)) {
            errors.insert(rule.field, rule.message.clone());
        }
    }
    errors
}

fn passes(rule: &Rule, value: Option<&Value>) -> bool {
    match rule {
        Rule::Required => match value {
            None | Some(Value::Null) => false,
            Some(Value::String(text)) => !text.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        },
        Rule::MinLength(min) => match value {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                text.trim().chars().count() >= *min
            }
            _ => true,
        },
        Rule::Email => match value {
            Some(Value::String(text)) if !text.trim().is_empty() => is_email(text.trim()),
            _ => true,
        },
        Rule::Positive => match value {
            Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n > 0.0),
            _ => true,
        },
    }
}

fn is_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !text.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::builder("users")
            .required("fullName", "Full name is required")
            .rule("fullName", Rule::MinLength(3), "Full name is too short")
            .required("email", "Email is required")
            .rule("email", Rule::Email, "Email is invalid")
            .rule("balance", Rule::Positive, "Balance must be positive")
            .build()
    }

    #[test]
    fn reports_exactly_the_empty_required_fields() {
        let errors = validate(
            &descriptor(),
            &json!({"fullName": "  ", "email": "reader@senselib.vn"}),
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["fullName"]);
        assert_eq!(errors.get("fullName"), Some("Full name is required"));
    }

    #[test]
    fn later_rules_apply_to_filled_fields() {
        let errors = validate(
            &descriptor(),
            &json!({"fullName": "Al", "email": "not-an-email", "balance": 0}),
        );
        assert_eq!(errors.get("fullName"), Some("Full name is too short"));
        assert_eq!(errors.get("email"), Some("Email is invalid"));
        assert_eq!(errors.get("balance"), Some("Balance must be positive"));
    }

    #[test]
    fn valid_draft_has_no_errors() {
        let errors = validate(
            &descriptor(),
            &json!({"fullName": "Lan Nguyen", "email": "lan@senselib.vn", "balance": 5000}),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn email_shape() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.de"));
        assert!(!is_email("a@@c.de"));
    }

    #[test]
    fn api_errors_fill_fields_and_form_banner() {
        let error = ApiError::validation(
            vec![json!({"field": "email", "error": "already registered"})],
            "Could not save user",
        );
        let errors = FieldErrors::from_api_error(&error);
        assert_eq!(errors.get("email"), Some("already registered"));
        assert_eq!(errors.form(), Some("Could not save user"));
    }
}
