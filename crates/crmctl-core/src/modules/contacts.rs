// ── Contacts ──

use crate::table::{ColumnOptions, FieldDescriptor};
use crate::validation::Rule;

use super::{RecordActions, delete_action, edit_action, menu, view_action};

pub const DATE_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

pub fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Name"),
        FieldDescriptor::new("email", "Email"),
        FieldDescriptor::new("phone", "Phone"),
        FieldDescriptor::new("createdAt", "Created At"),
        FieldDescriptor::new("updatedAt", "Updated At"),
    ]
}

pub fn column_options() -> ColumnOptions {
    ColumnOptions::new().date_fields(DATE_FIELDS)
}

pub fn actions() -> RecordActions {
    menu(vec![view_action(), edit_action(), delete_action()])
}

pub fn form() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Name")
            .rule(Rule::required("Please enter name"))
            .rule(Rule::min_len(2, "Name must be at least 2 characters"))
            .rule(Rule::max_len(50, "Name cannot exceed 50 characters")),
        FieldDescriptor::new("email", "Email")
            .rule(Rule::required("Please enter email"))
            .rule(Rule::email("Please enter a valid email")),
        FieldDescriptor::new("phone", "Phone")
            .rule(Rule::required("Please enter phone number"))
            .rule(Rule::digits("Phone number must contain only digits"))
            .rule(Rule::min_len(10, "Phone number must be 10-15 digits"))
            .rule(Rule::max_len(15, "Phone number must be 10-15 digits")),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validation::validate;

    #[test]
    fn phone_must_be_ten_to_fifteen_digits() {
        let check = |phone: &str| {
            let values = json!({ "name": "Ann", "email": "ann@example.com", "phone": phone });
            validate(&form(), values.as_object().unwrap()).err().and_then(|e| e.get("phone").map(str::to_owned))
        };
        assert_eq!(check("5551234567"), None);
        assert_eq!(check("555123456789012"), None);
        assert_eq!(check("555-123-4567").as_deref(), Some("Phone number must contain only digits"));
        assert_eq!(check("555123").as_deref(), Some("Phone number must be 10-15 digits"));
        assert_eq!(check("5551234567890123").as_deref(), Some("Phone number must be 10-15 digits"));
    }
}
