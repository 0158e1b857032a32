//! Plan command implementation.
//!
//! This module implements the `plan` command, which resolves the merged
//! configuration, validates it, and renders the resource graph in one of
//! several formats (human, JSON, YAML, DOT).

use crate::error::CliError;
use crate::utils::{outcome_error, plan, print_warnings, write_output, GlobalOptions};
use clap::{Args, ValueEnum};
use eksplan::{OutputFormat, OutputFormatter, PlanOutcome};
use std::path::PathBuf;

/// Plan the resources the configuration requests.
#[derive(Args)]
pub struct PlanCommand {
    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "human",
        env = "EKSPLAN_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: FormatArg,

    /// Write the rendered plan to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for rendered plans.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FormatArg {
    /// Numbered steps (human-readable)
    Human,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Graphviz DOT format
    Dot,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Human => OutputFormat::Human,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Dot => OutputFormat::Dot,
        }
    }
}

impl PlanCommand {
    /// Execute the plan command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let outcome = plan(global)?;
        let format = OutputFormat::from(self.format);

        // The human report lists warnings itself.
        if format != OutputFormat::Human {
            match &outcome {
                PlanOutcome::Valid(plan) => print_warnings(global, &plan.warnings),
                PlanOutcome::Empty { warnings } => print_warnings(global, warnings),
                PlanOutcome::Invalid { .. } => {}
            }
        }

        let rendered = format.create_formatter().format(&outcome)?;

        // Human reports of invalid configurations are diagnostics, not output.
        if format == OutputFormat::Human && !outcome.violations().is_empty() {
            eprintln!("{rendered}");
        } else {
            write_output(&rendered, self.output.as_deref())?;
        }

        outcome.into_result().map_err(outcome_error)?;
        Ok(())
    }
}
