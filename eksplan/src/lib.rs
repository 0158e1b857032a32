#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # eksplan
//!
//! A library for planning the provisioning of EKS cluster add-ons.
//!
//! Given a set of named options, this library resolves them into a typed
//! configuration, validates it, and produces a dependency graph of the
//! resources to create (namespaces, IAM-bound service accounts, Helm
//! controllers, a service mesh, an ingress gateway, compute pools, image
//! repositories). An external [`Applier`](external::Applier) realizes the
//! graph in dependency order.
//!
//! ## Core Types
//!
//! - [`OptionMap`] and [`ClusterConfig`]: raw and resolved configuration
//! - [`ResourceGraph`] and [`DependencyScheduler`]: what to create, and in which order
//! - [`Planner`] and [`PlanOutcome`]: the planning entry point
//! - [`PlanExecutor`]: drives an applier through a plan
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use eksplan::{OptionMap, PlanOutcome, Planner};
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
//! match Planner::new().plan(&options).unwrap() {
//!     PlanOutcome::Valid(plan) => assert_eq!(plan.len(), 8),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod graph;
pub mod logging;
pub mod operations;
pub mod output;

// Re-export key types at crate root for convenience
pub use config::{ClusterConfig, ConfigBuilder, ConfigResolver, OptionMap, ValidationEngine};
pub use error::{Error, Result, Violation, ViolationKind};
pub use graph::{DependencyScheduler, ResourceGraph, ResourceGraphBuilder, ResourceId, ResourceNode};
pub use logging::{init_logger, LogLevel, Logger};
pub use operations::{ExecutionResult, Plan, PlanExecutor, PlanOutcome, PlanStep, Planner};
pub use output::{OutputFormat, OutputFormatter};
