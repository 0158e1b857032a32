//! Build script for eksplan-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("eksplan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plan EKS cluster add-on provisioning")
        .long_about(
            "Resolve a cluster configuration, validate it, and plan the add-on resources \
             it requests together with the order they must be created in",
        )
        .arg(flag("verbose", "Enable verbose output"))
        .arg(flag("quiet", "Suppress non-essential output"))
        .arg(
            Arg::new("working-dir")
                .long("working-dir")
                .help("Directory to start configuration discovery from")
                .value_name("PATH")
                .global(true)
                .env("EKSPLAN_WORKING_DIR"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Additional configuration file (repeatable, later files win)")
                .value_name("FILE")
                .global(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("context")
                .short('c')
                .long("context")
                .help("Override an option (repeatable)")
                .value_name("KEY=VALUE")
                .global(true)
                .action(ArgAction::Append),
        )
        .arg(flag("skip-files", "Do not discover configuration files"))
        .arg(flag(
            "skip-env",
            "Ignore EKSPLAN_* and CDK_DEFAULT_* environment variables",
        ))
        .arg(
            Arg::new("policy-file")
                .long("policy-file")
                .help("Read the load balancer controller policy from a file instead of its URL")
                .value_name("FILE")
                .global(true)
                .env("EKSPLAN_POLICY_FILE"),
        )
        .subcommands(vec![
            Command::new("plan")
                .about("Plan the resources to create")
                .long_about("Render the planned resources and their dependencies as text, JSON, YAML or DOT"),
            Command::new("validate")
                .about("Check the configuration without planning")
                .long_about("Resolve and validate the merged configuration, reporting every violation"),
            Command::new("show-config")
                .about("Show the merged or resolved configuration")
                .long_about("Print the configuration the other commands would use"),
            Command::new("schedule")
                .about("Show the order resources can be created in")
                .long_about("Print the batches of resources that can be created concurrently"),
            Command::new("outputs")
                .about("Show the values a deployment reports")
                .long_about("Print the outputs a deployment of the plan would report"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .global(true)
        .action(ArgAction::SetTrue)
}

fn main() -> io::Result<()> {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").map_err(io::Error::other)?);
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    fs::write(man_dir.join("eksplan.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
