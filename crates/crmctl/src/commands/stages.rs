//! Stage command handlers.

use crmctl_core::Console;

use crate::cli::{GlobalOpts, StagesArgs, StagesCommand};
use crate::error::CliError;
use crate::output;

use super::records;

pub async fn handle(console: &Console, args: StagesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        StagesCommand::Record(cmd) => records::handle(console, "stage", cmd, global).await,

        StagesCommand::Reorder { stage, index } => {
            console.reorder_stage(&stage, index).await?;
            output::success(global, &format!("Stage {stage} moved to position {index}"));
            Ok(())
        }
    }
}
