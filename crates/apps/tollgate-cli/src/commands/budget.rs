//! Show budget command.

use tollgate_ledger::SpendLedger;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{BudgetOutput, OutputFormat, Render};

/// Execute the budget command.
pub fn budget(config: &CliConfig, format: OutputFormat) -> CliResult<String> {
    let policy = config.policy()?;
    let state_file = config.state_path();
    let ledger = SpendLedger::with_file(&state_file);

    let output = BudgetOutput {
        status: ledger.status(&policy),
        state_file,
    };

    Ok(output.render(format))
}
