// ── Roles ──

use serde_json::Value;

use crate::model::ADMIN_ROLE;
use crate::table::{ColumnOptions, FieldDescriptor, FieldType, is_blank};
use crate::validation::Rule;

use super::{RecordActions, delete_action, edit_action, menu, view_action};

pub const DATE_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

pub fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("role_name", "Role Name"),
        FieldDescriptor::new("permissions", "Permissions").render(|value, _| permissions_summary(value)),
        FieldDescriptor::new("createdAt", "Created At"),
        FieldDescriptor::new("updatedAt", "Updated At"),
    ]
}

pub fn column_options() -> ColumnOptions {
    ColumnOptions::new().date_fields(DATE_FIELDS)
}

/// The built-in admin role can be viewed and edited but never deleted.
pub fn actions() -> RecordActions {
    menu(vec![
        view_action(),
        edit_action(),
        delete_action().disabled_when(|r| r.get("role_name").and_then(Value::as_str) == Some(ADMIN_ROLE)),
    ])
}

pub fn form() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("role_name", "Role Name")
            .rule(Rule::required("Please enter role name"))
            .rule(Rule::min_len(3, "Role name must be at least 3 characters"))
            .rule(Rule::max_len(50, "Role name must be less than 50 characters")),
        FieldDescriptor::new("permissions", "Permissions").kind(FieldType::Textarea),
    ]
}

/// One-line summary of a permission map: `N module(s)`, plus `Full access`
/// when any module grants create, read, update and delete.
///
/// Accepts the map itself or its JSON text.
pub fn permissions_summary(permissions: &Value) -> String {
    const NONE: &str = "No permissions";

    if is_blank(permissions) {
        return NONE.to_owned();
    }
    let parsed;
    let permissions = match permissions {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(_) => return "Invalid format".to_owned(),
        },
        other => other,
    };

    let modules: Vec<&Value> = match permissions {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => Vec::new(),
    };
    if modules.is_empty() {
        return NONE.to_owned();
    }

    let full_access = modules.iter().any(|module| {
        ["create", "read", "update", "delete"]
            .iter()
            .all(|op| module.get(op).is_some_and(|v| !is_blank(v)))
    });
    let noun = if modules.len() == 1 { "module" } else { "modules" };
    let mut summary = format!("{} {noun}", modules.len());
    if full_access {
        summary.push_str(", Full access");
    }
    summary
}
