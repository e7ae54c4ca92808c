// ── Pipelines ──

use std::sync::Arc;

use crate::table::{ActionDescriptor, ColumnOptions, FieldDescriptor, FieldType};
use crate::validation::Rule;

use super::{Intent, Lookups, RecordActions, delete_action, edit_action, is_system, menu, record_id};

pub fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Name"),
        FieldDescriptor::new("createdAt", "Created At"),
    ]
}

pub fn column_options() -> ColumnOptions {
    ColumnOptions::new().date_fields(["createdAt"])
}

/// "View" needs at least one stage to show; seeded pipelines cannot be
/// deleted.
pub fn actions(lookups: &Lookups) -> RecordActions {
    let counts = Arc::new(lookups.stage_counts.clone());
    menu(vec![
        ActionDescriptor::new("view", "View Pipeline")
            .icon("eye")
            .show_when(move |r| counts.get(&record_id(r)).copied().unwrap_or(0) > 0)
            .on_click(|r| Intent::OpenBoard(record_id(r))),
        edit_action(),
        delete_action().show_when(|r| !is_system(r)),
    ])
}

pub fn form() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Pipeline Name").rule(Rule::required("Please enter pipeline name")),
        FieldDescriptor::new("description", "Description").kind(FieldType::Textarea),
    ]
}
