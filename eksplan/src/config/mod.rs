//! Configuration system for eksplan.
//!
//! This module turns configuration sources into a typed [`ClusterConfig`]:
//! - YAML project files and `cdk.json` context blocks
//! - Environment variable defaults and overrides
//! - Programmatic `Key=Value` overrides via the builder
//! - Typed resolution with defaults ([`ConfigResolver`])
//! - Cross-field validation ([`ValidationEngine`])
//!
//! # Configuration Precedence
//!
//! Options are merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_override`)
//! 2. Environment variables (`EKSPLAN_*`)
//! 3. Explicit configuration files
//! 4. Private project config (`eksplan.local.yaml`)
//! 5. Project config (`eksplan.yaml`)
//! 6. `cdk.json` context
//! 7. Environment defaults (`CDK_DEFAULT_REGION`, `CDK_DEFAULT_ACCOUNT`)
//! 8. Built-in defaults
//!
//! # Examples
//!
//! Loading from a specific directory:
//!
//! ```no_run
//! use eksplan::config::ConfigBuilder;
//! use std::path::Path;
//!
//! let config = ConfigBuilder::new()
//!     .with_working_dir(Path::new("/path/to/project"))
//!     .build()
//!     .unwrap();
//! ```
//!
//! Resolving a hand-built option map:
//!
//! ```
//! use eksplan::config::{ConfigResolver, OptionMap, ValidationEngine};
//!
//! let options: OptionMap = [
//!     ("EksClusterName", "prod"),
//!     ("KubectlRoleName", "eks-admin"),
//!     ("Region", "eu-west-1"),
//!     ("MeshedNamespace", "appns"),
//!     ("OnDemandInstanceCount", "2"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let config = ConfigResolver::resolve(&options).unwrap();
//! assert!(ValidationEngine::validate(&config).is_empty());
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod options;
pub mod resolver;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{parse_override, ConfigLoader, ConfigSource};
pub use merger::ConfigMerger;
pub use options::{OptionKind, OptionMap, OptionSpec, RECOGNIZED_OPTIONS};
pub use resolver::{parse_bool, split_list, ConfigResolver};
pub use schema::{
    is_standard_namespace, AmiType, CapacityType, ClusterConfig, ComputePoolSpec,
    ControllerSettings, NodeGroupSettings, PoolVariant, STANDARD_NAMESPACES,
};
pub use validator::{is_dns_label, is_dns_subdomain, is_label_value, ValidationEngine};
