//! Outputs command implementation.

use crate::commands::plan::FormatArg;
use crate::error::CliError;
use crate::utils::{outcome_error, plan, write_output, GlobalOptions};
use clap::Args;
use eksplan::{OutputFormat, OutputFormatter};

/// Show the values a deployment of the plan would report.
#[derive(Args)]
pub struct OutputsCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "human", ignore_case = true)]
    pub format: FormatArg,
}

impl OutputsCommand {
    /// Execute the outputs command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let outcome = plan(global)?;
        for violation in outcome.violations() {
            eprintln!("  - {violation}");
        }

        let outputs = outcome
            .into_result()
            .map_err(outcome_error)?
            .map(|plan| plan.outputs)
            .unwrap_or_default();

        let rendered = OutputFormat::from(self.format)
            .create_formatter()
            .format_outputs(&outputs)?;
        write_output(&rendered, None)
    }
}
