//! Record command handlers, shared by every resource.
//!
//! Tables come from the resource's generated columns; writes go through
//! the console so form validation and row-action rules apply.

use serde::Serialize;
use serde_json::Value;

use crmctl_core::modules::{self, ResourceView};
use crmctl_core::table::{Column, generate_columns};
use crmctl_core::{Console, Lookups};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat, RecordCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Action rows ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct ActionRow {
    key: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    danger: bool,
    disabled: bool,
}

/// Resources whose columns render foreign keys through lookups.
fn uses_lookups(resource: &str) -> bool {
    matches!(resource, "user" | "lead" | "pipeline" | "stage")
}

/// The list view of `resource`, resolving lookups only when `with_lookups`.
pub async fn view_for(console: &Console, resource: &str, with_lookups: bool) -> Result<ResourceView, CliError> {
    let lookups = if with_lookups && uses_lookups(resource) {
        console.lookups().await?
    } else {
        Lookups::default()
    };
    modules::view(resource, &lookups).ok_or_else(|| CliError::Validation {
        field: "resource".into(),
        reason: format!("unknown resource '{resource}'"),
    })
}

fn columns(view: &ResourceView) -> Vec<Column> {
    generate_columns(&view.fields, &view.options)
}

/// Sort `records` by the column keyed `key`.
fn sort_records(columns: &[Column], key: &str, desc: bool, records: &mut [Value]) -> Result<(), CliError> {
    let column = columns.iter().find(|c| c.key == key).ok_or_else(|| CliError::Validation {
        field: "sort".into(),
        reason: format!(
            "unknown column '{key}', expected one of: {}",
            columns.iter().map(|c| c.key.as_str()).collect::<Vec<_>>().join(", ")
        ),
    })?;
    if !column.is_sortable() {
        return Err(CliError::Validation {
            field: "sort".into(),
            reason: format!("column '{key}' does not sort"),
        });
    }
    column.sort(records);
    if desc {
        records.reverse();
    }
    Ok(())
}

async fn list(console: &Console, resource: &str, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let query = util::list_query(&args)?;
    let page = console.resource(resource)?.list(&query).await?;

    let table = global.output == OutputFormat::Table;
    let view = view_for(console, resource, table).await?;
    let columns = columns(&view);

    let mut items = page.items;
    if let Some(key) = &args.sort {
        sort_records(&columns, key, args.desc, &mut items)?;
    }

    let out = output::render_records(global.output, &columns, &items)?;
    output::print_output(&out, global.quiet);
    if table {
        output::note(
            global,
            &format!("Page {} · {} of {} {resource}s", page.current_page, items.len(), page.total),
        );
    }
    Ok(())
}

async fn print_record(console: &Console, resource: &str, record: &Value, global: &GlobalOpts) -> Result<(), CliError> {
    let view = view_for(console, resource, global.output == OutputFormat::Table).await?;
    let out = output::render_record(global.output, &columns(&view), record)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    resource: &str,
    cmd: RecordCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        RecordCommand::List(args) => list(console, resource, args, global).await,

        RecordCommand::Get { id } => {
            let record = console.resource(resource)?.get(&id).await?;
            print_record(console, resource, &record, global).await
        }

        RecordCommand::Create(values) => {
            let values = util::write_values(&values)?;
            let record = console.create_record(resource, values).await?;
            output::success(
                global,
                &format!("Created {resource} {}", output::record_id(&record)),
            );
            print_record(console, resource, &record, global).await
        }

        RecordCommand::Update { id, values } => {
            let patch = util::write_values(&values)?;
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "values".into(),
                    reason: "nothing to update; pass --data, --from-file or --set".into(),
                });
            }
            let record = console.update_record(resource, &id, patch).await?;
            output::success(global, &format!("Updated {resource} {id}"));
            print_record(console, resource, &record, global).await
        }

        RecordCommand::Delete { id } => {
            let prompt = format!("Delete {resource} {id}?");
            if !util::confirm(&prompt, &format!("{resource} delete"), global.yes)? {
                output::note(global, "Cancelled");
                return Ok(());
            }
            let message = console.delete_record(resource, &id).await?;
            output::success(
                global,
                &message.unwrap_or_else(|| format!("Deleted {resource} {id}")),
            );
            Ok(())
        }

        RecordCommand::Actions { id } => {
            let record = console.resource(resource)?.get(&id).await?;
            let view = view_for(console, resource, true).await?;
            let rows: Vec<ActionRow> = view
                .actions
                .items(&record)
                .into_iter()
                .map(|item| ActionRow {
                    key: item.key.to_owned(),
                    label: item.label.to_owned(),
                    icon: item.icon.map(str::to_owned),
                    danger: item.danger,
                    disabled: item.disabled,
                })
                .collect();

            let out = output::render_single(
                global.output,
                &rows,
                |rows| {
                    output::render_grid(
                        ["Key", "Label", "Danger", "Disabled"].map(String::from).to_vec(),
                        rows.iter()
                            .map(|r| {
                                vec![
                                    r.key.clone(),
                                    r.label.clone(),
                                    yes_no(r.danger),
                                    yes_no(r.disabled),
                                ]
                            })
                            .collect(),
                    )
                },
                |rows| {
                    rows.iter()
                        .filter(|r| !r.disabled)
                        .map(|r| r.key.clone())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.into()
}
