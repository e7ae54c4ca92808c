// ── Leads ──
//
// List columns, the lead form with its default-stage rule, and the kanban
// board that groups a pipeline's leads by lead stage.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::model::{Lead, LeadStatus, Priority, Stage};
use crate::table::{ColumnOptions, FieldDescriptor, FieldType, is_blank};
use crate::validation::{Rule, ValidationErrors};

use super::{FormMode, Lookups, RecordActions, delete_action, edit_action, lookup, menu, value_id_of};

pub const NO_PIPELINE: &str = "No Pipeline";
pub const NO_STAGE: &str = "No Stage";

pub fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("leadTitle", "Title"),
        FieldDescriptor::new("leadValue", "Value")
            .render(|value, _| format!("₹{}", format_amount(number(value))))
            .sorter(|a, b| {
                number(&a["leadValue"]).total_cmp(&number(&b["leadValue"]))
            }),
        FieldDescriptor::new("pipeline", "Pipeline / Stage"),
        FieldDescriptor::new("source", "Source"),
        FieldDescriptor::new("status", "Status").render(|value, _| {
            let open = value.as_str() == Some("open");
            if open { "Open" } else { "Closed" }.to_owned()
        }),
        FieldDescriptor::new("priority", "Priority"),
    ]
}

pub fn column_options(lookups: &Lookups) -> ColumnOptions {
    let pipelines = Arc::new(lookups.pipelines.clone());
    let stages = Arc::new(lookups.stages.clone());
    let sources = Arc::new(lookups.sources.clone());
    ColumnOptions::new()
        .render("pipeline", move |value, record| {
            let stage = record.get("stage").unwrap_or(&Value::Null);
            format!(
                "{} / {}",
                lookup(&pipelines, value, NO_PIPELINE),
                lookup(&stages, stage, NO_STAGE)
            )
        })
        .render("source", move |value, _| lookup(&sources, value, ""))
}

pub fn actions() -> RecordActions {
    menu(vec![edit_action(), delete_action()])
}

pub fn form(mode: FormMode) -> Vec<FieldDescriptor> {
    let mut fields = vec![
        FieldDescriptor::new("leadTitle", "Lead Title").rule(Rule::required("Please enter lead title")),
        FieldDescriptor::new("leadValue", "Lead Value")
            .kind(FieldType::Number)
            .rule(Rule::required("Please enter lead value"))
            .rule(Rule::min(0.0, "Lead value must be positive")),
        FieldDescriptor::new("pipeline", "Pipeline")
            .kind(FieldType::Select)
            .rule(Rule::required("Please select pipeline")),
    ];
    let stage = FieldDescriptor::new("stage", "Stage").kind(FieldType::Select);
    let priority = FieldDescriptor::new("priority", "Priority")
        .select(Priority::names())
        .rule(Rule::one_of(Priority::names(), "Priority must be low, medium or high"));
    let source = FieldDescriptor::new("source", "Source").kind(FieldType::Select);
    let category = FieldDescriptor::new("category", "Category").kind(FieldType::Select);

    match mode {
        FormMode::Create => fields.extend([
            stage,
            priority,
            source.rule(Rule::required("Please select source")),
            category.rule(Rule::required("Please select category")),
        ]),
        FormMode::Edit => fields.extend([
            stage.rule(Rule::required("Please select stage")),
            priority,
            FieldDescriptor::new("status", "Status").kind(FieldType::Select),
            source,
            category,
        ]),
    }
    fields.push(FieldDescriptor::new("contact", "Contact").kind(FieldType::Select));
    fields
}

// ── Stage selection ──

/// The stage a new lead in `pipeline` lands in: the pipeline's default lead
/// stage, else any of its lead stages, else any of its stages.
pub fn default_stage<'a>(pipeline: &str, stages: &'a [Stage]) -> Option<&'a Stage> {
    let mut owned = stages.iter().filter(|s| s.belongs_to(pipeline));
    owned
        .clone()
        .find(|s| s.is_lead_stage() && s.is_default)
        .or_else(|| owned.clone().find(|s| s.is_lead_stage()))
        .or_else(|| owned.next())
}

/// Fill in `stage` for a lead submission that leaves it blank.
pub fn with_default_stage(mut values: Map<String, Value>, stages: &[Stage]) -> Result<Map<String, Value>, CoreError> {
    if values.get("stage").is_some_and(|s| !is_blank(s)) {
        return Ok(values);
    }
    let stage = values
        .get("pipeline")
        .and_then(value_id_of)
        .and_then(|pipeline| default_stage(&pipeline, stages))
        .ok_or_else(|| {
            CoreError::InvalidInput(ValidationErrors::single(
                "stage",
                "No valid stage found for the selected pipeline",
            ))
        })?;
    values.insert("stage".into(), Value::String(stage.id.clone()));
    Ok(values)
}

// ── Status switch ──

/// Body that flips a lead open or closed, every other field kept.
pub fn status_payload(record: &Value, status: LeadStatus) -> Result<Value, CoreError> {
    with_field(record, "status", Value::String(status.to_string()))
}

// ── Kanban board ──

/// Lead stages of `pipeline`, by `order`. Stages without an order keep
/// their relative position after the ordered ones.
pub fn pipeline_stages(pipeline: &str, stages: &[Stage]) -> Vec<Stage> {
    let mut owned: Vec<Stage> = stages
        .iter()
        .filter(|s| s.belongs_to(pipeline) && s.is_lead_stage())
        .cloned()
        .collect();
    owned.sort_by_key(|s| (s.order.is_none(), s.order));
    owned
}

/// A lead card with its foreign keys resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BoardCard {
    #[serde(flatten)]
    pub lead: Lead,
    #[serde(rename = "contactName", skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(rename = "sourceName", skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub stage: Stage,
    pub leads: Vec<BoardCard>,
}

/// Leads of one pipeline grouped by stage.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub pipeline: String,
    pub columns: Vec<BoardColumn>,
}

impl Board {
    pub fn column(&self, stage_id: &str) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.stage.id == stage_id)
    }

    /// Position of `stage_id` among the columns.
    pub fn position(&self, stage_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.stage.id == stage_id)
    }
}

/// Group `leads` under the lead stages of `pipeline`.
///
/// A lead sitting in a stage outside that set still gets a column when the
/// stage exists at all; leads with no stage or an unknown one are left off.
pub fn build_board(pipeline: &str, stages: &[Stage], leads: &[Lead], lookups: &Lookups) -> Board {
    let mut groups: IndexMap<String, BoardColumn> = pipeline_stages(pipeline, stages)
        .into_iter()
        .map(|stage| {
            (
                stage.id.clone(),
                BoardColumn {
                    stage,
                    leads: Vec::new(),
                },
            )
        })
        .collect();

    for lead in leads {
        let Some(stage_id) = lead.stage.as_deref() else {
            continue;
        };
        let card = BoardCard {
            lead: lead.clone(),
            contact_name: lead
                .contact
                .as_ref()
                .map(|id| lookups.contacts.get(id).cloned().unwrap_or_else(|| id.clone())),
            source_name: lead
                .source
                .as_ref()
                .map(|id| lookups.sources.get(id).cloned().unwrap_or_else(|| id.clone())),
        };
        if let Some(column) = groups.get_mut(stage_id) {
            column.leads.push(card);
        } else if let Some(stage) = stages.iter().find(|s| s.id == stage_id) {
            groups.insert(
                stage_id.to_owned(),
                BoardColumn {
                    stage: stage.clone(),
                    leads: vec![card],
                },
            );
        }
    }

    Board {
        pipeline: pipeline.to_owned(),
        columns: groups.into_values().collect(),
    }
}

/// Body that moves `lead` into `stage_id`, or `None` when it is already there.
pub fn move_payload(lead: &Value, stage_id: &str) -> Result<Option<Value>, CoreError> {
    let current = lead.get("stage").and_then(value_id_of);
    if current.as_deref() == Some(stage_id) {
        return Ok(None);
    }
    with_field(lead, "stage", Value::String(stage_id.to_owned())).map(Some)
}

/// Body that places `stage` at board position `index`.
pub fn reorder_payload(stage: &Value, index: usize) -> Result<Value, CoreError> {
    with_field(stage, "order", Value::from(index))
}

// ── Helpers ──

/// `record` with `key` set to `value`; the server must have sent an object.
fn with_field(record: &Value, key: &str, value: Value) -> Result<Value, CoreError> {
    let mut body = record.clone();
    let fields = body.as_object_mut().ok_or_else(|| CoreError::Decode {
        message: format!("expected a record object, got {record}"),
    })?;
    fields.insert(key.to_owned(), value);
    Ok(body)
}

fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Group thousands and keep up to three decimals: `2500.5` → `2,500.5`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "NaN".to_owned();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::from_record;
    use crate::table::generate_columns;
    use crate::validation::validate;

    fn stage(id: &str, pipeline: &str, kind: &str, is_default: bool, order: Option<i64>) -> Stage {
        from_record(&json!({
            "id": id,
            "name": id.to_uppercase(),
            "pipeline": pipeline,
            "type": kind,
            "is_default": is_default,
            "order": order,
        }))
        .unwrap()
    }

    fn lead(id: &str, stage: Option<&str>) -> Lead {
        from_record(&json!({ "id": id, "leadTitle": id, "leadValue": 1, "pipeline": "p1", "stage": stage })).unwrap()
    }

    #[test]
    fn amounts_group_thousands() {
        assert_eq!(format_amount(2500.5), "2,500.5");
        assert_eq!(format_amount(1_234_567.0), "1,234,567");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(0.1234), "0.123");
        assert_eq!(format_amount(-1500.0), "-1,500");
    }

    #[test]
    fn list_columns() {
        let lookups = Lookups {
            pipelines: [("p1".to_owned(), "Sales".to_owned())].into(),
            stages: [("s1".to_owned(), "New".to_owned())].into(),
            sources: [("f1".to_owned(), "Web".to_owned())].into(),
            ..Lookups::default()
        };
        let columns = generate_columns(&fields(), &column_options(&lookups));
        let record = json!({
            "leadTitle": "Acme", "leadValue": "2500", "pipeline": "p1", "stage": "s1",
            "source": "f1", "status": "open", "priority": "high"
        });
        let cells: Vec<String> = columns.iter().map(|c| c.render(&record)).collect();
        assert_eq!(cells, ["Acme", "₹2,500", "Sales / New", "Web", "Open", "high"]);

        let bare = json!({ "leadTitle": "x", "leadValue": 1 });
        assert_eq!(columns[2].render(&bare), "No Pipeline / No Stage");
        assert_eq!(columns[4].render(&bare), "Closed");
    }

    #[test]
    fn value_column_sorts_numerically_across_strings() {
        let columns = generate_columns(&fields(), &ColumnOptions::new());
        let mut records = vec![json!({ "leadValue": "10" }), json!({ "leadValue": 5 })];
        columns[1].sort(&mut records);
        assert_eq!(records[0]["leadValue"], 5);
    }

    #[test]
    fn default_stage_preference() {
        let stages = vec![
            stage("any", "p1", "proposal", false, None),
            stage("lead", "p1", "lead", false, None),
            stage("dflt", "p1", "lead", true, None),
            stage("other", "p2", "lead", true, None),
        ];
        assert_eq!(default_stage("p1", &stages).unwrap().id, "dflt");
        assert_eq!(default_stage("p1", &stages[..2]).unwrap().id, "lead");
        assert_eq!(default_stage("p1", &stages[..1]).unwrap().id, "any");
        assert!(default_stage("p3", &stages).is_none());
    }

    #[test]
    fn blank_stage_is_filled_or_rejected() {
        let stages = vec![stage("s1", "p1", "lead", true, None)];
        let values = json!({ "leadTitle": "x", "pipeline": "p1", "stage": "" }).as_object().cloned().unwrap();
        assert_eq!(with_default_stage(values, &stages).unwrap()["stage"], "s1");

        let values = json!({ "leadTitle": "x", "pipeline": "p9" }).as_object().cloned().unwrap();
        let err = with_default_stage(values, &stages).unwrap_err();
        assert!(err.to_string().contains("No valid stage found for the selected pipeline"));
    }

    #[test]
    fn create_and_edit_forms_differ() {
        let values = json!({ "leadTitle": "x", "leadValue": 0, "pipeline": "p1" });
        let values = values.as_object().unwrap();

        let create = validate(&form(FormMode::Create), values).unwrap_err();
        assert_eq!(create.get("source"), Some("Please select source"));
        assert_eq!(create.get("category"), Some("Please select category"));
        assert_eq!(create.get("stage"), None);

        let edit = validate(&form(FormMode::Edit), values).unwrap_err();
        assert_eq!(edit.get("stage"), Some("Please select stage"));
        assert_eq!(edit.get("source"), None);

        let mut negative = values.clone();
        negative.insert("leadValue".into(), json!(-5));
        negative.insert("stage".into(), json!("s1"));
        let edit = validate(&form(FormMode::Edit), &negative).unwrap_err();
        assert_eq!(edit.get("leadValue"), Some("Lead value must be positive"));
    }

    #[test]
    fn board_groups_by_ordered_lead_stages() {
        let stages = vec![
            stage("won", "p1", "lead", false, Some(2)),
            stage("new", "p1", "lead", true, Some(0)),
            stage("quote", "p1", "proposal", false, Some(1)),
            stage("elsewhere", "p2", "lead", false, Some(0)),
        ];
        let leads = vec![
            lead("a", Some("new")),
            lead("b", Some("won")),
            lead("c", Some("new")),
            lead("d", Some("elsewhere")),
            lead("e", Some("ghost")),
            lead("f", None),
        ];
        let board = build_board("p1", &stages, &leads, &Lookups::default());

        let columns: Vec<(&str, Vec<&str>)> = board
            .columns
            .iter()
            .map(|c| (c.stage.id.as_str(), c.leads.iter().map(|l| l.lead.id.as_str()).collect()))
            .collect();
        assert_eq!(
            columns,
            vec![("new", vec!["a", "c"]), ("won", vec!["b"]), ("elsewhere", vec!["d"])]
        );
        assert_eq!(board.position("won"), Some(1));
    }

    #[test]
    fn unordered_stages_follow_ordered_ones() {
        let stages = vec![
            stage("x", "p1", "lead", false, None),
            stage("b", "p1", "lead", false, Some(1)),
            stage("a", "p1", "lead", false, Some(0)),
        ];
        let ids: Vec<String> = pipeline_stages("p1", &stages).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["a", "b", "x"]);
    }

    #[test]
    fn move_and_reorder_payloads_keep_other_fields() {
        let record = json!({ "id": "l1", "leadTitle": "Acme", "stage": "s1" });
        assert!(move_payload(&record, "s1").unwrap().is_none());
        let moved = move_payload(&record, "s2").unwrap().unwrap();
        assert_eq!(moved, json!({ "id": "l1", "leadTitle": "Acme", "stage": "s2" }));

        let stage = json!({ "id": "s1", "name": "New", "order": 0 });
        assert_eq!(reorder_payload(&stage, 3).unwrap()["order"], 3);

        let closed = status_payload(&record, LeadStatus::Closed).unwrap();
        assert_eq!(closed["status"], "closed");
        assert_eq!(closed["leadTitle"], "Acme");
    }

    #[test]
    fn payloads_reject_records_that_are_not_objects() {
        let odd = json!(["l1"]);
        assert!(matches!(
            status_payload(&odd, LeadStatus::Open),
            Err(CoreError::Decode { .. })
        ));
        assert!(move_payload(&odd, "s2").is_err());
        assert!(reorder_payload(&Value::Null, 1).is_err());
    }
}
