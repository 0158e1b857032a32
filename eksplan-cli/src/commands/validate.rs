//! Command to check a configuration without planning it.

use crate::error::CliError;
use crate::utils::{load_options, outcome_error, print_warnings, GlobalOptions};
use clap::Args;
use eksplan::config::ConfigResolver;
use eksplan::{Error, ValidationEngine};

/// Check the merged configuration.
///
/// Unlike `plan`, this never fetches the load balancer controller's policy
/// document.
#[derive(Args)]
pub struct ValidateCommand {}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let options = load_options(global)?;

        let warnings: Vec<String> = ConfigResolver::unknown_options(&options)
            .into_iter()
            .map(|name| format!("ignoring unrecognized option '{name}'"))
            .collect();
        print_warnings(global, &warnings);

        let config = match ConfigResolver::resolve(&options) {
            Ok(config) => config,
            Err(e @ Error::Configuration { .. }) => {
                report(e.violations());
                return Err(outcome_error(e));
            }
            Err(e) => return Err(e.into()),
        };

        let violations = ValidationEngine::validate(&config);
        if !violations.is_empty() {
            report(&violations);
            return Err(outcome_error(Error::Validation { violations }));
        }

        if !global.quiet {
            if config.requests_nothing() {
                println!("Configuration is valid (nothing requested)");
            } else {
                println!("Configuration is valid");
            }
        }
        Ok(())
    }
}

fn report(violations: &[eksplan::Violation]) {
    for violation in violations {
        eprintln!("  - {violation}");
    }
}
