//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `plan`: Render the planned resources and their dependencies
//! - `validate`: Check the configuration without planning
//! - `show_config`: Show the merged or resolved configuration
//! - `schedule`: Show the batches resources can be created in
//! - `outputs`: Show the values a deployment reports
//! - `completions`: Generate shell completion scripts

pub mod completions;
pub mod outputs;
pub mod plan;
pub mod schedule;
pub mod show_config;
pub mod validate;

pub use completions::CompletionsCommand;
pub use outputs::OutputsCommand;
pub use plan::PlanCommand;
pub use schedule::ScheduleCommand;
pub use show_config::ShowConfigCommand;
pub use validate::ValidateCommand;
