// ── Users ──

use std::sync::Arc;

use crate::table::{ColumnOptions, FieldDescriptor, FieldType, display_value};
use crate::validation::Rule;

use super::{FormMode, Lookups, RecordActions, delete_action, edit_action, menu, view_action};

pub const DATE_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

pub fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("username", "Username"),
        FieldDescriptor::new("email", "Email"),
        FieldDescriptor::new("role_id", "Role"),
        FieldDescriptor::new("createdAt", "Created At"),
        FieldDescriptor::new("updatedAt", "Updated At"),
    ]
}

/// Role ids render as role names, `N/A` when unknown.
pub fn column_options(lookups: &Lookups) -> ColumnOptions {
    let roles = Arc::new(lookups.roles.clone());
    ColumnOptions::new()
        .date_fields(DATE_FIELDS)
        .render("role_id", move |value, _| {
            roles
                .get(&display_value(value))
                .cloned()
                .unwrap_or_else(|| "N/A".to_owned())
        })
}

pub fn actions() -> RecordActions {
    menu(vec![view_action(), edit_action(), delete_action()])
}

pub fn form(mode: FormMode) -> Vec<FieldDescriptor> {
    let password = FieldDescriptor::new("password", "Password").kind(FieldType::Password);
    let password = match mode {
        FormMode::Create => password.rule(Rule::required("Please enter password")),
        FormMode::Edit => password,
    }
    .rule(Rule::min_len(6, "Password must be at least 6 characters"));

    vec![
        FieldDescriptor::new("username", "Username")
            .rule(Rule::required("Please enter username"))
            .rule(Rule::min_len(3, "Username must be at least 3 characters")),
        FieldDescriptor::new("email", "Email")
            .rule(Rule::required("Please enter email"))
            .rule(Rule::email("Please enter a valid email")),
        password,
        FieldDescriptor::new("role_id", "Role")
            .kind(FieldType::Select)
            .rule(Rule::required("Please select a role")),
        FieldDescriptor::new("first_name", "First Name"),
        FieldDescriptor::new("last_name", "Last Name"),
        FieldDescriptor::new("phone", "Phone"),
        FieldDescriptor::new("address", "Address").kind(FieldType::Textarea),
        FieldDescriptor::new("city", "City"),
        FieldDescriptor::new("state", "State"),
        FieldDescriptor::new("country", "Country"),
        FieldDescriptor::new("zip_code", "Zip Code"),
        FieldDescriptor::new("is_active", "Active").kind(FieldType::Checkbox),
    ]
}
