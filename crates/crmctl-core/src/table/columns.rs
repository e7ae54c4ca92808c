// ── Column generation ──
//
// Turns field descriptors plus per-screen overrides into renderable,
// sortable columns. Records are raw JSON objects; every lookup goes through
// the field name.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::format::{date_millis, display_value, format_date};
use crate::validation::Rule;

/// Cell renderer: `(value, record) -> text`.
pub type RenderFn = Arc<dyn Fn(&Value, &Value) -> String + Send + Sync>;

/// Record comparator.
pub type CompareFn = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Input control a field is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Select,
    Checkbox,
    Textarea,
    Password,
}

/// How a column sorts.
#[derive(Clone, Default)]
pub enum SorterSpec {
    /// Numeric when both cells are numbers, lexicographic otherwise.
    #[default]
    Default,
    Disabled,
    Custom(CompareFn),
}

impl fmt::Debug for SorterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Disabled => f.write_str("Disabled"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One field of a resource: a table column and a form input.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub title: String,
    pub field_type: FieldType,
    pub rules: Vec<Rule>,
    /// Choices for `Select` fields.
    pub options: Vec<String>,
    /// Read-only once the record exists.
    pub locked_on_edit: bool,
    pub render: Option<RenderFn>,
    pub sorter: SorterSpec,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("field_type", &self.field_type)
            .field("rules", &self.rules)
            .field("options", &self.options)
            .field("locked_on_edit", &self.locked_on_edit)
            .field("render", &self.render.as_ref().map(|_| ".."))
            .field("sorter", &self.sorter)
            .finish()
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            field_type: FieldType::Text,
            rules: Vec::new(),
            options: Vec::new(),
            locked_on_edit: false,
            render: None,
            sorter: SorterSpec::Default,
        }
    }

    #[must_use]
    pub fn kind(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// A `Select` field offering `options`.
    #[must_use]
    pub fn select<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_type = FieldType::Select;
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn locked_on_edit(mut self) -> Self {
        self.locked_on_edit = true;
        self
    }

    #[must_use]
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value, &Value) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    #[must_use]
    pub fn sorter<F>(mut self, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.sorter = SorterSpec::Custom(Arc::new(compare));
        self
    }

    #[must_use]
    pub fn unsortable(mut self) -> Self {
        self.sorter = SorterSpec::Disabled;
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(Rule::is_required)
    }
}

/// Per-screen overrides applied on top of field descriptors.
#[derive(Clone, Default)]
pub struct ColumnOptions {
    pub custom_renders: HashMap<String, RenderFn>,
    pub custom_sorters: HashMap<String, CompareFn>,
    /// Raw value → display label, per field.
    pub value_mappers: HashMap<String, HashMap<String, String>>,
    pub date_fields: Vec<String>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn render<F>(mut self, field: impl Into<String>, render: F) -> Self
    where
        F: Fn(&Value, &Value) -> String + Send + Sync + 'static,
    {
        self.custom_renders.insert(field.into(), Arc::new(render));
        self
    }

    #[must_use]
    pub fn sorter<F>(mut self, field: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.custom_sorters.insert(field.into(), Arc::new(compare));
        self
    }

    #[must_use]
    pub fn map_values<I, K, V>(mut self, field: impl Into<String>, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mapping = mapping.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.value_mappers.insert(field.into(), mapping);
        self
    }

    #[must_use]
    pub fn date_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    fn is_date(&self, field: &str) -> bool {
        self.date_fields.iter().any(|f| f == field)
    }
}

#[derive(Clone)]
enum Renderer {
    Custom(RenderFn),
    Mapped(Arc<HashMap<String, String>>),
    Date,
    Raw,
}

/// A generated table column.
#[derive(Clone)]
pub struct Column {
    pub title: String,
    pub key: String,
    renderer: Renderer,
    sorter: Option<CompareFn>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("title", &self.title)
            .field("key", &self.key)
            .field("sortable", &self.is_sortable())
            .finish_non_exhaustive()
    }
}

impl Column {
    /// The cell text for `record`.
    pub fn render(&self, record: &Value) -> String {
        let value = cell(record, &self.key);
        match &self.renderer {
            Renderer::Custom(render) => render(value, record),
            Renderer::Mapped(mapping) => {
                let raw = display_value(value);
                mapping.get(&raw).cloned().unwrap_or(raw)
            }
            Renderer::Date => format_date(value),
            Renderer::Raw => display_value(value),
        }
    }

    pub fn is_sortable(&self) -> bool {
        self.sorter.is_some()
    }

    /// Order two records by this column, `None` when it does not sort.
    pub fn compare(&self, a: &Value, b: &Value) -> Option<Ordering> {
        self.sorter.as_ref().map(|compare| compare(a, b))
    }

    /// Stable in-place sort; a no-op for unsortable columns.
    pub fn sort(&self, records: &mut [Value]) {
        if let Some(compare) = &self.sorter {
            records.sort_by(|a, b| compare(a, b));
        }
    }
}

fn cell<'a>(record: &'a Value, key: &str) -> &'a Value {
    record.get(key).unwrap_or(&Value::Null)
}

/// Build the columns for `fields`.
///
/// Rendering prefers the field's own render, then a custom render, then a
/// value mapper, then date formatting, then the raw value. Sorting prefers
/// a custom sorter, then date order, then the field's own comparator, then
/// the default comparator; a disabled sorter wins over all of them.
pub fn generate_columns(fields: &[FieldDescriptor], options: &ColumnOptions) -> Vec<Column> {
    fields
        .iter()
        .map(|field| {
            let name = field.name.as_str();
            let is_date = options.is_date(name);

            let renderer = if let Some(render) = &field.render {
                Renderer::Custom(Arc::clone(render))
            } else if let Some(render) = options.custom_renders.get(name) {
                Renderer::Custom(Arc::clone(render))
            } else if let Some(mapping) = options.value_mappers.get(name) {
                Renderer::Mapped(Arc::new(mapping.clone()))
            } else if is_date {
                Renderer::Date
            } else {
                Renderer::Raw
            };

            let sorter = match &field.sorter {
                SorterSpec::Disabled => None,
                own => Some(
                    options
                        .custom_sorters
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| match own {
                            _ if is_date => date_order(name),
                            SorterSpec::Custom(compare) => Arc::clone(compare),
                            _ => default_order(name),
                        }),
                ),
            };

            Column {
                title: field.title.clone(),
                key: field.name.clone(),
                renderer,
                sorter,
            }
        })
        .collect()
}

fn date_order(key: &str) -> CompareFn {
    let key = key.to_owned();
    Arc::new(move |a, b| {
        // Unparseable dates go last so the order stays total.
        let position = |record: &Value| date_millis(cell(record, &key)).map_or((1, 0), |ms| (0, ms));
        position(a).cmp(&position(b))
    })
}

fn default_order(key: &str) -> CompareFn {
    let key = key.to_owned();
    Arc::new(move |a, b| compare_values(cell(a, &key), cell(b, &key)))
}

/// Numbers compare numerically; anything else by its text. A number
/// sorts before a non-number.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => display_value(a).cmp(&display_value(b)),
    }
}

/// Cell text for every record, column by column.
pub fn render_rows(columns: &[Column], records: &[Value]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| columns.iter().map(|c| c.render(record)).collect())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn keys(records: &[Value], field: &str) -> Vec<String> {
        records.iter().map(|r| display_value(&r[field])).collect()
    }

    #[test]
    fn numbers_sort_numerically() {
        let columns = generate_columns(&[FieldDescriptor::new("value", "Value")], &ColumnOptions::new());
        let mut records = vec![json!({ "value": 10 }), json!({ "value": 5 }), json!({ "value": 100 })];
        columns[0].sort(&mut records);
        assert_eq!(keys(&records, "value"), ["5", "10", "100"]);
    }

    #[test]
    fn text_sorts_lexicographically() {
        let columns = generate_columns(&[FieldDescriptor::new("name", "Name")], &ColumnOptions::new());
        let a = json!({ "name": "Acme" });
        let b = json!({ "name": "Beta" });
        assert_eq!(columns[0].compare(&a, &b), Some(Ordering::Less));
    }

    #[test]
    fn date_fields_render_and_sort_by_time() {
        let options = ColumnOptions::new().date_fields(["createdAt"]);
        let columns = generate_columns(&[FieldDescriptor::new("createdAt", "Created")], &options);
        let column = &columns[0];

        assert_eq!(column.render(&json!({ "createdAt": "2024-03-05T00:00:00Z" })), "5 March 2024");
        assert_eq!(column.render(&json!({})), "N/A");

        let mut records = vec![
            json!({ "createdAt": "2024-03-05T00:00:00Z" }),
            json!({ "createdAt": null }),
            json!({ "createdAt": "2023-01-01T00:00:00Z" }),
        ];
        column.sort(&mut records);
        assert_eq!(
            keys(&records, "createdAt"),
            ["", "2023-01-01T00:00:00Z", "2024-03-05T00:00:00Z"]
        );
    }

    #[test]
    fn mapped_values_fall_back_to_raw() {
        let options = ColumnOptions::new().map_values("role_id", [("r1", "Admin")]);
        let columns = generate_columns(&[FieldDescriptor::new("role_id", "Role")], &options);
        assert_eq!(columns[0].render(&json!({ "role_id": "r1" })), "Admin");
        assert_eq!(columns[0].render(&json!({ "role_id": "r9" })), "r9");
    }

    #[test]
    fn field_render_beats_custom_render_and_sees_the_record() {
        let field = FieldDescriptor::new("name", "Name").render(|v, r| format!("{} <{}>", display_value(v), display_value(&r["email"])));
        let options = ColumnOptions::new().render("name", |_, _| "ignored".into());
        let columns = generate_columns(&[field], &options);
        assert_eq!(
            columns[0].render(&json!({ "name": "Ann", "email": "ann@x.io" })),
            "Ann <ann@x.io>"
        );
    }

    #[test]
    fn disabled_sorter_wins() {
        let field = FieldDescriptor::new("status", "Status").unsortable();
        let options = ColumnOptions::new().sorter("status", |_, _| Ordering::Less);
        let columns = generate_columns(&[field], &options);
        assert!(!columns[0].is_sortable());
        assert_eq!(columns[0].compare(&json!({}), &json!({})), None);
    }

    #[test]
    fn custom_sorter_beats_field_sorter() {
        let field = FieldDescriptor::new("n", "N").sorter(|_, _| Ordering::Less);
        let options = ColumnOptions::new().sorter("n", |_, _| Ordering::Greater);
        let columns = generate_columns(&[field], &options);
        assert_eq!(columns[0].compare(&json!({}), &json!({})), Some(Ordering::Greater));
    }

    #[test]
    fn rows_follow_column_order() {
        let fields = [FieldDescriptor::new("b", "B"), FieldDescriptor::new("a", "A")];
        let columns = generate_columns(&fields, &ColumnOptions::new());
        let rows = render_rows(&columns, &[json!({ "a": 1, "b": "two" })]);
        assert_eq!(rows, vec![vec!["two".to_owned(), "1".to_owned()]]);
    }
}
