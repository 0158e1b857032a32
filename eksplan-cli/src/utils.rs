//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading, policy source selection, planning and
//! output writing.

use crate::error::CliError;
use crate::policy::HttpPolicySource;
use eksplan::config::{parse_override, ConfigBuilder, OptionMap};
use eksplan::external::{FilePolicySource, PolicyDocumentSource};
use eksplan::{Error, PlanOutcome, Planner};
use std::fs;
use std::path::{Path, PathBuf};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Directory to start configuration discovery from.
    pub working_dir: Option<PathBuf>,

    /// Explicit configuration files, in command-line order.
    pub config_files: Vec<PathBuf>,

    /// Raw `KEY=VALUE` overrides.
    pub context: Vec<String>,

    /// Do not discover configuration files.
    pub skip_files: bool,

    /// Ignore the environment.
    pub skip_env: bool,

    /// Local replacement for the load balancer controller policy document.
    pub policy_file: Option<PathBuf>,
}

/// Load hierarchical configuration.
///
/// Options are merged from multiple sources with precedence:
/// 1. `-c KEY=VALUE` overrides (highest priority)
/// 2. Environment variables
/// 3. `--config` files, then discovered files
/// 4. Built-in defaults (lowest priority)
pub fn load_options(global: &GlobalOptions) -> Result<OptionMap, CliError> {
    let mut builder = ConfigBuilder::new();

    if let Some(dir) = &global.working_dir {
        builder = builder.with_working_dir(dir);
    }
    for file in &global.config_files {
        builder = builder.with_file(file);
    }
    if global.skip_files {
        builder = builder.skip_files();
    }
    if global.skip_env {
        builder = builder.skip_env();
    }
    for raw in &global.context {
        let (key, value) =
            parse_override(raw).map_err(|e| CliError::InvalidArguments(e.to_string()))?;
        builder = builder.with_override(key, value);
    }

    builder.load().map_err(CliError::from)
}

/// The policy document source selected by the global options.
pub fn policy_source(global: &GlobalOptions) -> Box<dyn PolicyDocumentSource> {
    match &global.policy_file {
        Some(path) => Box::new(FilePolicySource::new(path)),
        None => Box::new(HttpPolicySource::new()),
    }
}

/// Load the configuration and plan it.
pub fn plan(global: &GlobalOptions) -> Result<PlanOutcome, CliError> {
    let options = load_options(global)?;
    let source = policy_source(global);
    let outcome = Planner::new()
        .with_policy_source(source.as_ref())
        .plan(&options)?;
    Ok(outcome)
}

/// Convert the error of an invalid outcome into a CLI error.
///
/// The violations themselves are expected to have been reported already, so
/// only their count is kept.
pub fn outcome_error(err: Error) -> CliError {
    match err {
        Error::Validation { violations } => CliError::SemanticFailure(format!(
            "configuration is invalid ({} violation(s))",
            violations.len()
        )),
        Error::Configuration { violations } => {
            CliError::Config(format!("{} problem(s) found", violations.len()))
        }
        other => CliError::Library(other),
    }
}

/// Print warnings to stderr unless quiet.
pub fn print_warnings(global: &GlobalOptions, warnings: &[String]) {
    if global.quiet {
        return;
    }
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

/// Write rendered output to a file or stdout.
pub fn write_output(rendered: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))?;
            Ok(())
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
