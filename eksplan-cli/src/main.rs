//! Main entry point for the eksplan CLI.
//!
//! This is the command-line interface for the eksplan add-on planner.
//! It provides commands for inspecting a cluster configuration:
//! - `plan`: Render the resources to create and their dependencies
//! - `validate`: Check the configuration without planning
//! - `show-config`: Show the merged or resolved configuration
//! - `schedule`: Show the batches resources can be created in
//! - `outputs`: Show the values a deployment reports

mod cli;
mod commands;
mod error;
mod policy;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let _logger = eksplan::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        working_dir: cli.working_dir,
        config_files: cli.config_files,
        context: cli.context,
        skip_files: cli.skip_files,
        skip_env: cli.skip_env,
        policy_file: cli.policy_file,
    };

    let result = match cli.command {
        cli::Command::Plan(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::ShowConfig(cmd) => cmd.execute(&global),
        cli::Command::Schedule(cmd) => cmd.execute(&global),
        cli::Command::Outputs(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
