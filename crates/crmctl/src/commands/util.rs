//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use serde_json::{Map, Value};

use crmctl_core::ListQuery;

use crate::cli::{ListArgs, WriteArgs};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes { action: action.into() });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Split a `KEY=VALUE` argument.
pub fn split_pair<'a>(raw: &'a str, flag: &str) -> Result<(&'a str, &'a str), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(CliError::Validation {
            field: flag.into(),
            reason: format!("expected KEY=VALUE, got '{raw}'"),
        }),
    }
}

/// The list query described by `args`.
pub fn list_query(args: &ListArgs) -> Result<ListQuery, CliError> {
    let mut query = ListQuery::new();
    if let Some(page) = args.page {
        query = query.page(page);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    for raw in &args.filters {
        let (key, value) = split_pair(raw, "filter")?;
        query = query.filter(key, value);
    }
    Ok(query)
}

/// Read and parse a JSON object file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Collect field values from `--data`, `--from-file` and `--set`, in that
/// order; later sources win.
pub fn write_values(args: &WriteArgs) -> Result<Map<String, Value>, CliError> {
    let base = match (&args.data, &args.from_file) {
        (Some(data), _) => serde_json::from_str(data)?,
        (None, Some(path)) => read_json_file(path)?,
        (None, None) => Value::Object(Map::new()),
    };
    let Value::Object(mut values) = base else {
        return Err(CliError::Validation {
            field: "data".into(),
            reason: "expected a JSON object".into(),
        });
    };
    for raw in &args.set {
        let (key, value) = split_pair(raw, "set")?;
        values.insert(key.to_owned(), parse_scalar(value));
    }
    Ok(values)
}

/// `VALUE` as JSON when it parses, else as a string.
fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn set_values_are_typed_when_possible() {
        let args = WriteArgs {
            data: Some(r#"{"leadTitle": "Acme", "priority": "low"}"#.into()),
            from_file: None,
            set: vec!["leadValue=1000".into(), "priority=high".into(), "is_default=true".into()],
        };
        let values = write_values(&args).unwrap();
        assert_eq!(values["leadTitle"], "Acme");
        assert_eq!(values["leadValue"], json!(1000));
        assert_eq!(values["priority"], "high");
        assert_eq!(values["is_default"], json!(true));
    }

    #[test]
    fn data_must_be_an_object() {
        let args = WriteArgs {
            data: Some("[1, 2]".into()),
            from_file: None,
            set: Vec::new(),
        };
        assert!(matches!(write_values(&args), Err(CliError::Validation { .. })));
    }

    #[test]
    fn filters_become_query_params() {
        let args = ListArgs {
            page: Some(2),
            limit: None,
            filters: vec!["type=source".into()],
            sort: None,
            desc: false,
        };
        let query = list_query(&args).unwrap();
        assert_eq!(query.canonical(), "page=2&limit=10&type=source");

        let bad = ListArgs {
            filters: vec!["=x".into()],
            ..args
        };
        assert!(list_query(&bad).is_err());
    }

    #[test]
    fn values_may_contain_equals_signs() {
        assert_eq!(split_pair("q=a=b", "filter").unwrap(), ("q", "a=b"));
    }
}
