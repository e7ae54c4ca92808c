// ── Filters ──

use serde_json::Value;

use crate::model::FilterType;
use crate::table::{ColumnOptions, FieldDescriptor, is_blank};
use crate::validation::Rule;

use super::{RecordActions, delete_action, edit_action, is_system, menu};

pub fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Name"),
        FieldDescriptor::new("type", "Type"),
        FieldDescriptor::new("created_by", "Created By").render(|value, _| match value {
            Value::String(s) if !is_blank(value) => s.clone(),
            _ => "System".to_owned(),
        }),
        FieldDescriptor::new("createdAt", "Created"),
    ]
}

pub fn column_options() -> ColumnOptions {
    ColumnOptions::new().date_fields(["createdAt"])
}

pub fn actions() -> RecordActions {
    menu(vec![edit_action(), delete_action().show_when(|r| !is_system(r))])
}

/// The type is fixed once a filter exists.
pub fn form() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", "Filter Name").rule(Rule::required("Please enter filter name")),
        FieldDescriptor::new("type", "Filter Type")
            .select(FilterType::names())
            .locked_on_edit()
            .rule(Rule::required("Please select filter type"))
            .rule(Rule::one_of(FilterType::names(), "Unknown filter type")),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::table::generate_columns;
    use crate::validation::validate;

    #[test]
    fn creator_defaults_to_system() {
        let columns = generate_columns(&fields(), &column_options());
        let creator = columns.iter().find(|c| c.key == "created_by").unwrap();
        assert_eq!(creator.render(&json!({})), "System");
        assert_eq!(creator.render(&json!({ "created_by": "ann" })), "ann");
    }

    #[test]
    fn type_must_be_known() {
        let values = json!({ "name": "Web", "type": "channel" });
        let err = validate(&form(), values.as_object().unwrap()).unwrap_err();
        assert_eq!(err.get("type"), Some("Unknown filter type"));
        assert!(form()[1].locked_on_edit);
    }
}
