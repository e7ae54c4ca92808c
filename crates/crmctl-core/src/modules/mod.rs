// ── Feature modules ──
//
// Per-resource table fields, row actions and form definitions. Row actions
// resolve to an `Intent` that the front end carries out.

pub mod contacts;
pub mod filters;
pub mod leads;
pub mod pipelines;
pub mod roles;
pub mod stages;
pub mod users;

use std::collections::HashMap;

use serde_json::Value;

use crmctl_api::value_id;

use crate::model::{Contact, Filter, FilterType, Pipeline, Role, Stage};
use crate::resource::ResourceDescriptor;
use crate::table::{ActionDescriptor, ActionMenu, ColumnOptions, FieldDescriptor, generate_action_items};

/// What a row action asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    View(String),
    Edit(String),
    Delete(String),
    /// Open the lead board of a pipeline.
    OpenBoard(String),
}

/// Whether a form creates a record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Row actions over raw records.
pub type RecordActions = ActionMenu<Value, Intent>;

/// id → label maps used to render foreign keys.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub roles: HashMap<String, String>,
    pub pipelines: HashMap<String, String>,
    pub stages: HashMap<String, String>,
    pub sources: HashMap<String, String>,
    pub contacts: HashMap<String, String>,
    /// Number of stages per pipeline id.
    pub stage_counts: HashMap<String, usize>,
}

impl Lookups {
    pub fn build(roles: &[Role], pipelines: &[Pipeline], stages: &[Stage], filters: &[Filter]) -> Self {
        let mut stage_counts: HashMap<String, usize> = HashMap::new();
        for stage in stages {
            if let Some(pipeline) = stage.pipeline_id() {
                *stage_counts.entry(pipeline.to_owned()).or_default() += 1;
            }
        }
        Self {
            roles: roles.iter().map(|r| (r.id.clone(), r.role_name.clone())).collect(),
            pipelines: pipelines.iter().map(|p| (p.id.clone(), p.name.clone())).collect(),
            stages: stages.iter().map(|s| (s.id.clone(), s.name.clone())).collect(),
            sources: filters
                .iter()
                .filter(|f| f.kind() == Some(FilterType::Source))
                .map(|f| (f.id.clone(), f.name.clone()))
                .collect(),
            contacts: HashMap::new(),
            stage_counts,
        }
    }

    /// Add contact names, used by lead board cards.
    #[must_use]
    pub fn with_contacts(mut self, contacts: &[Contact]) -> Self {
        self.contacts = contacts.iter().map(|c| (c.id.clone(), c.name.clone())).collect();
        self
    }
}

/// Everything a list screen needs for one resource.
pub struct ResourceView {
    pub descriptor: ResourceDescriptor,
    pub fields: Vec<FieldDescriptor>,
    pub options: ColumnOptions,
    pub actions: RecordActions,
}

/// The list screen of `resource`, if it has one.
pub fn view(resource: &str, lookups: &Lookups) -> Option<ResourceView> {
    let descriptor = ResourceDescriptor::by_name(resource)?;
    let (fields, options, actions) = match descriptor.name {
        "user" => (users::fields(), users::column_options(lookups), users::actions()),
        "role" => (roles::fields(), roles::column_options(), roles::actions()),
        "contact" => (contacts::fields(), contacts::column_options(), contacts::actions()),
        "lead" => (leads::fields(), leads::column_options(lookups), leads::actions()),
        "pipeline" => (pipelines::fields(), pipelines::column_options(), pipelines::actions(lookups)),
        "stage" => (stages::fields(), stages::column_options(lookups), stages::actions()),
        "filter" => (filters::fields(), filters::column_options(), filters::actions()),
        _ => return None,
    };
    Some(ResourceView {
        descriptor,
        fields,
        options,
        actions,
    })
}

/// The form of `resource` in `mode`.
pub fn form(resource: &str, mode: FormMode) -> Option<Vec<FieldDescriptor>> {
    Some(match resource {
        "user" => users::form(mode),
        "role" => roles::form(),
        "contact" => contacts::form(),
        "lead" => leads::form(mode),
        "pipeline" => pipelines::form(),
        "stage" => stages::form(),
        "filter" => filters::form(),
        _ => return None,
    })
}

// ── Shared action builders ──

pub(crate) fn record_id(record: &Value) -> String {
    value_id(record).unwrap_or_default()
}

pub(crate) fn view_action() -> ActionDescriptor<Value, Intent> {
    ActionDescriptor::new("view", "View")
        .icon("eye")
        .on_click(|r| Intent::View(record_id(r)))
}

pub(crate) fn edit_action() -> ActionDescriptor<Value, Intent> {
    ActionDescriptor::new("edit", "Edit")
        .icon("edit")
        .on_click(|r| Intent::Edit(record_id(r)))
}

pub(crate) fn delete_action() -> ActionDescriptor<Value, Intent> {
    ActionDescriptor::new("delete", "Delete")
        .icon("delete")
        .danger()
        .on_click(|r| Intent::Delete(record_id(r)))
}

pub(crate) fn menu(actions: Vec<ActionDescriptor<Value, Intent>>) -> RecordActions {
    generate_action_items(actions, HashMap::new())
}

pub(crate) fn is_system(record: &Value) -> bool {
    record.get("created_by").and_then(Value::as_str) == Some(crate::model::SYSTEM_CREATOR)
}

/// `id` resolved through `names`, or `fallback`.
pub(crate) fn lookup(names: &HashMap<String, String>, id: &Value, fallback: &str) -> String {
    value_id_of(id)
        .and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| fallback.to_owned())
}

/// A foreign-key cell as an id string, whether sent bare or as `{id, ...}`.
pub(crate) fn value_id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => value_id(value),
        _ => None,
    }
}
