//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    CompletionsCommand, OutputsCommand, PlanCommand, ScheduleCommand, ShowConfigCommand,
    ValidateCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for planning EKS cluster add-on provisioning.
#[derive(Parser)]
#[command(name = "eksplan")]
#[command(version, about = "Plan EKS cluster add-on provisioning", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Directory to start configuration discovery from
    #[arg(long, value_name = "PATH", global = true, env = "EKSPLAN_WORKING_DIR")]
    pub working_dir: Option<PathBuf>,

    /// Additional configuration file (repeatable, later files win)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_files: Vec<PathBuf>,

    /// Override an option (repeatable)
    #[arg(short = 'c', long, value_name = "KEY=VALUE", global = true)]
    pub context: Vec<String>,

    /// Do not discover configuration files
    #[arg(long, global = true)]
    pub skip_files: bool,

    /// Ignore EKSPLAN_* and CDK_DEFAULT_* environment variables
    #[arg(long, global = true)]
    pub skip_env: bool,

    /// Read the load balancer controller policy from a file instead of its URL
    #[arg(long, value_name = "FILE", global = true, env = "EKSPLAN_POLICY_FILE")]
    pub policy_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Plan the resources to create
    Plan(PlanCommand),

    /// Check the configuration without planning
    Validate(ValidateCommand),

    /// Show the merged or resolved configuration
    ShowConfig(ShowConfigCommand),

    /// Show the order resources can be created in
    Schedule(ScheduleCommand),

    /// Show the values a deployment reports
    Outputs(OutputsCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
