//! Output formatting module for planning outcomes.
//!
//! This module renders a [`PlanOutcome`] and its deployment outputs as
//! human-readable text, JSON, YAML, or a Graphviz DOT graph.

mod formatters;

use std::fmt;
use std::str::FromStr;

use crate::external::DeploymentOutput;
use crate::operations::PlanOutcome;
use crate::{Error, Result, Violation};

pub use formatters::{DotFormatter, HumanFormatter, JsonFormatter, YamlFormatter};

/// Trait for formatting planning outcomes into different output formats.
pub trait OutputFormatter {
    /// Format the given outcome into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format(&self, outcome: &PlanOutcome) -> Result<String>;

    /// Format deployment outputs into a string.
    ///
    /// The default renders one `key = value` line per output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_outputs(&self, outputs: &[DeploymentOutput]) -> Result<String> {
        if outputs.is_empty() {
            return Ok("No outputs.".to_string());
        }
        let mut lines = vec!["Outputs:".to_string()];
        for output in outputs {
            lines.push(format!("  {} = {}", output.key, output.value));
        }
        Ok(lines.join("\n"))
    }
}

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable format.
    #[default]
    Human,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
    /// Graphviz DOT format.
    Dot,
}

impl OutputFormat {
    /// Create a formatter for this output format.
    #[must_use]
    pub fn create_formatter(&self) -> Box<dyn OutputFormatter> {
        match self {
            Self::Human => Box::new(HumanFormatter),
            Self::Json => Box::new(JsonFormatter),
            Self::Yaml => Box::new(YamlFormatter),
            Self::Dot => Box::new(DotFormatter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Human => "human",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Dot => "dot",
        };
        f.write_str(s)
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "dot" => Ok(Self::Dot),
            _ => Err(Error::Configuration {
                violations: vec![Violation::configuration(
                    "format",
                    format!("unknown output format '{s}' (expected human, json, yaml or dot)"),
                )],
            }),
        }
    }
}
