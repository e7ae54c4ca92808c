// ── Stages ──
//
// The form edits the owning pipeline as `pipeline_id`; the backend stores
// it as `pipeline`.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::model::StageType;
use crate::table::{ColumnOptions, FieldDescriptor, FieldType, display_value};
use crate::validation::Rule;

use super::{Lookups, RecordActions, delete_action, edit_action, is_system, lookup, menu};

pub fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Name"),
        FieldDescriptor::new("type", "Type").render(|value, _| display_value(value).to_uppercase()),
        FieldDescriptor::new("is_default", "Default").render(|value, _| {
            if crate::table::is_blank(value) { "No" } else { "YES" }.to_owned()
        }),
        FieldDescriptor::new("pipeline", "Pipeline"),
    ]
}

pub fn column_options(lookups: &Lookups) -> ColumnOptions {
    let pipelines = Arc::new(lookups.pipelines.clone());
    ColumnOptions::new().render("pipeline", move |value, _| lookup(&pipelines, value, "Unknown Pipeline"))
}

pub fn actions() -> RecordActions {
    menu(vec![edit_action(), delete_action().show_when(|r| !is_system(r))])
}

pub fn form() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Stage Name").rule(Rule::required("Please enter stage name")),
        FieldDescriptor::new("pipeline_id", "Pipeline")
            .kind(FieldType::Select)
            .rule(Rule::required("Please select a pipeline")),
        FieldDescriptor::new("type", "Stage Type")
            .select(StageType::names())
            .rule(Rule::required("Please select stage type"))
            .rule(Rule::one_of(StageType::names(), "Stage type must be lead or proposal")),
        FieldDescriptor::new("is_default", "Set as default stage").kind(FieldType::Checkbox),
    ]
}

/// Form values → request body: `pipeline_id` becomes `pipeline`.
pub fn to_payload(mut values: Map<String, Value>) -> Map<String, Value> {
    if let Some(pipeline) = values.remove("pipeline_id") {
        values.insert("pipeline".into(), pipeline);
    }
    values
}

/// Record → form values: `pipeline` becomes `pipeline_id`.
pub fn to_form(mut record: Map<String, Value>) -> Map<String, Value> {
    if !record.contains_key("pipeline_id") {
        if let Some(pipeline) = record.get("pipeline").cloned() {
            record.insert("pipeline_id".into(), pipeline);
        }
    }
    record
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::table::generate_columns;

    #[test]
    fn columns_label_type_default_and_pipeline() {
        let lookups = Lookups {
            pipelines: [("p1".to_owned(), "Sales".to_owned())].into(),
            ..Lookups::default()
        };
        let columns = generate_columns(&fields(), &column_options(&lookups));
        let record = json!({ "name": "New", "type": "lead", "is_default": true, "pipeline": "p1" });
        let cells: Vec<String> = columns.iter().map(|c| c.render(&record)).collect();
        assert_eq!(cells, ["New", "LEAD", "YES", "Sales"]);
    }

    #[test]
    fn pipeline_field_is_renamed_both_ways() {
        let values = json!({ "name": "New", "pipeline_id": "p1" }).as_object().cloned().unwrap();
        let payload = to_payload(values);
        assert_eq!(payload["pipeline"], "p1");
        assert!(!payload.contains_key("pipeline_id"));
        assert_eq!(to_form(payload)["pipeline_id"], "p1");
    }

    #[test]
    fn system_stages_cannot_be_deleted() {
        let menu = actions();
        assert!(menu.find(&json!({ "id": "s1", "created_by": "SYSTEM" }), "delete").is_none());
        assert!(menu.find(&json!({ "id": "s2" }), "delete").is_some());
    }
}
