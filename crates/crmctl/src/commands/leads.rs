//! Lead command handlers: records plus the board.

use crmctl_core::Console;
use crmctl_core::modules::leads::{Board, format_amount};

use crate::cli::{GlobalOpts, LeadsArgs, LeadsCommand};
use crate::error::CliError;
use crate::output;

use super::records;

// ── Board rendering ─────────────────────────────────────────────────

fn board_detail(board: &Board) -> String {
    if board.columns.is_empty() {
        return format!("Pipeline {} has no lead stages", board.pipeline);
    }
    board
        .columns
        .iter()
        .map(|column| {
            let heading = format!("{} ({})", column.stage.name, column.leads.len());
            if column.leads.is_empty() {
                return format!("{heading}\n  (empty)");
            }
            let rows = column
                .leads
                .iter()
                .map(|card| {
                    vec![
                        card.lead.id.clone(),
                        card.lead.lead_title.clone(),
                        format!("₹{}", format_amount(card.lead.lead_value)),
                        card.contact_name.clone().unwrap_or_default(),
                        card.source_name.clone().unwrap_or_default(),
                        card.lead.priority.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            let table = output::render_grid(
                ["ID", "Title", "Value", "Contact", "Source", "Priority"]
                    .map(String::from)
                    .to_vec(),
                rows,
            );
            format!("{heading}\n{table}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn board_ids(board: &Board) -> String {
    board
        .columns
        .iter()
        .flat_map(|c| c.leads.iter().map(move |card| format!("{}\t{}", c.stage.id, card.lead.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: LeadsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LeadsCommand::Record(cmd) => records::handle(console, "lead", cmd, global).await,

        LeadsCommand::Board { pipeline } => {
            let board = console.board(&pipeline).await?;
            let out = output::render_single(global.output, &board, board_detail, board_ids)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LeadsCommand::Move { lead, stage } => {
            match console.move_lead(&lead, &stage).await? {
                Some(_) => output::success(global, &format!("Moved lead {lead} to stage {stage}")),
                None => output::note(global, &format!("Lead {lead} is already in stage {stage}")),
            }
            Ok(())
        }

        LeadsCommand::Status { lead, status } => {
            console.set_lead_status(&lead, status).await?;
            output::success(global, &format!("Lead {lead} is now {status}"));
            Ok(())
        }
    }
}
