// ── Form validation ──
//
// Field rules checked before a create or update is sent. Only the first
// failing rule of each field is reported.

use std::fmt;

use serde_json::{Map, Value};

use crate::table::FieldDescriptor;

/// A single field rule with its user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required { message: String },
    Email { message: String },
    MinLen { len: usize, message: String },
    MaxLen { len: usize, message: String },
    /// Numeric lower bound (inclusive).
    Min { min: f64, message: String },
    /// Only ASCII digits.
    Digits { message: String },
    OneOf { options: Vec<String>, message: String },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Self::Required { message: message.into() }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email { message: message.into() }
    }

    pub fn min_len(len: usize, message: impl Into<String>) -> Self {
        Self::MinLen { len, message: message.into() }
    }

    pub fn max_len(len: usize, message: impl Into<String>) -> Self {
        Self::MaxLen { len, message: message.into() }
    }

    pub fn min(min: f64, message: impl Into<String>) -> Self {
        Self::Min { min, message: message.into() }
    }

    pub fn digits(message: impl Into<String>) -> Self {
        Self::Digits { message: message.into() }
    }

    pub fn one_of<I, S>(options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            options: options.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Required { message }
            | Self::Email { message }
            | Self::MinLen { message, .. }
            | Self::MaxLen { message, .. }
            | Self::Min { message, .. }
            | Self::Digits { message }
            | Self::OneOf { message, .. } => message,
        }
    }

    /// Whether `value` satisfies this rule. Empty values pass everything
    /// except `Required`.
    pub fn check(&self, value: &Value) -> bool {
        if is_empty(value) {
            return !self.is_required();
        }
        match self {
            Self::Required { .. } => true,
            Self::Email { .. } => value.as_str().is_some_and(is_email),
            Self::MinLen { len, .. } => text_len(value) >= *len,
            Self::MaxLen { len, .. } => text_len(value) <= *len,
            Self::Min { min, .. } => as_number(value).is_some_and(|n| n >= *min),
            Self::Digits { .. } => text(value).chars().all(|c| c.is_ascii_digit()),
            Self::OneOf { options, .. } => options.iter().any(|o| *o == text(value)),
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_len(value: &Value) -> usize {
    text(value).chars().count()
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}

/// A rule failure on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every failing field of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A single non-field error, e.g. a missing default stage.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Check `values` against the rules of `fields`.
pub fn validate(fields: &[FieldDescriptor], values: &Map<String, Value>) -> Result<(), ValidationErrors> {
    let errors: Vec<FieldError> = fields
        .iter()
        .filter_map(|field| {
            let value = values.get(&field.name).unwrap_or(&Value::Null);
            field
                .rules
                .iter()
                .find(|rule| !rule.check(value))
                .map(|rule| FieldError {
                    field: field.name.clone(),
                    message: rule.message().to_owned(),
                })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn contact_form() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("name", "Name")
                .rule(Rule::required("Please enter name"))
                .rule(Rule::min_len(2, "Name must be at least 2 characters"))
                .rule(Rule::max_len(50, "Name cannot exceed 50 characters")),
            FieldDescriptor::new("email", "Email")
                .rule(Rule::required("Please enter email"))
                .rule(Rule::email("Please enter a valid email")),
            FieldDescriptor::new("phone", "Phone")
                .rule(Rule::digits("Phone must contain only digits"))
                .rule(Rule::min_len(10, "Phone must be 10-15 digits")),
        ]
    }

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn valid_submission_passes() {
        let ok = values(json!({ "name": "Ann", "email": "ann@example.com", "phone": "5551234567" }));
        assert!(validate(&contact_form(), &ok).is_ok());
    }

    #[test]
    fn first_failing_rule_per_field() {
        let bad = values(json!({ "name": "A", "email": "", "phone": "12ab" }));
        let errors = validate(&contact_form(), &bad).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.get("email"), Some("Please enter email"));
        assert_eq!(errors.get("phone"), Some("Phone must contain only digits"));
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let ok = values(json!({ "name": "Ann", "email": "ann@example.com" }));
        assert!(validate(&contact_form(), &ok).is_ok());
    }

    #[test]
    fn numeric_minimum_accepts_numeric_strings() {
        let rule = Rule::min(0.0, "Value must be positive");
        assert!(rule.check(&json!(0)));
        assert!(rule.check(&json!("12.5")));
        assert!(!rule.check(&json!(-1)));
        assert!(!rule.check(&json!("lots")));
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.io"));
        assert!(!is_email("a@@c.io"));
    }

    #[test]
    fn errors_display_field_by_field() {
        let errors = ValidationErrors(vec![
            FieldError { field: "a".into(), message: "x".into() },
            FieldError { field: "b".into(), message: "y".into() },
        ]);
        assert_eq!(errors.to_string(), "a: x; b: y");
    }
}
