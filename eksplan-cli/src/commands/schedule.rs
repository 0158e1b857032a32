//! Schedule command implementation.
//!
//! Prints the batches an applier can create concurrently: every resource in
//! a batch depends only on resources in earlier batches.

use crate::error::CliError;
use crate::utils::{outcome_error, plan, print_warnings, write_output, GlobalOptions};
use clap::Args;
use eksplan::{DependencyScheduler, PlanOutcome};

/// Show the order resources can be created in.
#[derive(Args)]
pub struct ScheduleCommand {
    /// Print the batches as a JSON array of arrays
    #[arg(long)]
    pub json: bool,
}

impl ScheduleCommand {
    /// Execute the schedule command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let outcome = plan(global)?;

        let plan = match outcome {
            PlanOutcome::Valid(plan) => plan,
            PlanOutcome::Empty { warnings } => {
                print_warnings(global, &warnings);
                if self.json {
                    write_output("[]", None)?;
                } else if !global.quiet {
                    println!("Nothing to schedule.");
                }
                return Ok(());
            }
            invalid @ PlanOutcome::Invalid { .. } => {
                for violation in invalid.violations() {
                    eprintln!("  - {violation}");
                }
                invalid.into_result().map_err(outcome_error)?;
                return Ok(());
            }
        };
        print_warnings(global, &plan.warnings);

        let levels = DependencyScheduler::new(&plan.graph).levels();

        let rendered = if self.json {
            let ids: Vec<Vec<&str>> = levels
                .iter()
                .map(|level| level.iter().map(|id| id.as_str()).collect())
                .collect();
            serde_json::to_string_pretty(&ids).map_err(|e| CliError::Library(e.into()))?
        } else {
            levels
                .iter()
                .enumerate()
                .map(|(index, level)| {
                    let ids: Vec<&str> = level.iter().map(|id| id.as_str()).collect();
                    format!("{index}: {}", ids.join(", "))
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        write_output(&rendered, None)
    }
}
