//! Environment variable handling for configuration.
//!
//! Two kinds of variables are read: `CDK_DEFAULT_REGION` and
//! `CDK_DEFAULT_ACCOUNT` provide defaults at the lowest precedence, and
//! `EKSPLAN_<OPTION>` variables override file-based configuration.

use crate::config::options::{env_var_name, names, OptionMap, RECOGNIZED_OPTIONS};
use std::env;

/// Default region supplied by the CDK toolchain.
pub const CDK_DEFAULT_REGION: &str = "CDK_DEFAULT_REGION";

/// Default account supplied by the CDK toolchain.
pub const CDK_DEFAULT_ACCOUNT: &str = "CDK_DEFAULT_ACCOUNT";

/// Handles environment variable defaults and overrides.
///
/// # Examples
///
/// ```no_run
/// use eksplan::config::{EnvironmentConfig, OptionMap};
///
/// let mut options = OptionMap::new();
/// EnvironmentConfig::apply_overrides(&mut options);
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Options defaulted from the CDK environment.
    #[must_use]
    pub fn cdk_defaults() -> OptionMap {
        Self::cdk_defaults_from(|name| env::var(name).ok())
    }

    /// Apply `EKSPLAN_*` overrides to an option map.
    ///
    /// Values are stored as strings; the resolver types them.
    pub fn apply_overrides(options: &mut OptionMap) {
        Self::apply_overrides_from(options, |name| env::var(name).ok());
    }

    /// Like [`Self::cdk_defaults`], reading variables through `lookup`.
    pub fn cdk_defaults_from<F>(lookup: F) -> OptionMap
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = OptionMap::new();
        for (var, option) in [
            (CDK_DEFAULT_REGION, names::REGION),
            (CDK_DEFAULT_ACCOUNT, names::ACCOUNT),
        ] {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                options.insert(option, value);
            }
        }
        options
    }

    /// Like [`Self::apply_overrides`], reading variables through `lookup`.
    pub fn apply_overrides_from<F>(options: &mut OptionMap, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for spec in RECOGNIZED_OPTIONS {
            let var = env_var_name(spec.name);
            if let Some(value) = lookup(&var) {
                log::debug!("{var} overrides {}", spec.name);
                options.insert(spec.name, value);
            }
        }
    }
}
