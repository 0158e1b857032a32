//! Show the configuration the other commands would use.

use crate::error::CliError;
use crate::utils::{load_options, write_output, GlobalOptions};
use clap::{Args, ValueEnum};
use eksplan::config::ConfigResolver;
use serde::Serialize;

/// Show the merged or resolved configuration.
#[derive(Args)]
pub struct ShowConfigCommand {
    /// Show the merged raw options instead of the resolved configuration
    #[arg(long)]
    pub raw: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml", ignore_case = true)]
    pub format: ConfigFormat,
}

/// Serialization format for `show-config`.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl ShowConfigCommand {
    /// Execute the show-config command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let options = load_options(global)?;

        let rendered = if self.raw {
            self.render(&options)?
        } else {
            let config = ConfigResolver::resolve(&options)?;
            self.render(&config)?
        };

        write_output(rendered.trim_end(), None)
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String, CliError> {
        match self.format {
            ConfigFormat::Yaml => {
                serde_yaml::to_string(value).map_err(|e| CliError::Library(e.into()))
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(value).map_err(|e| CliError::Library(e.into()))
            }
        }
    }
}
