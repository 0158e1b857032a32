//! Planning and applying add-on provisioning using the plan-execute pattern.
//!
//! Planning is separated from execution to enable dry-run mode, rendering
//! a plan for review, and clear error messages before anything is created.
//!
//! # Architecture
//!
//! Operations are split into two phases:
//! 1. **Planning**: resolves and validates the options, then builds the
//!    resource graph ([`Planner`])
//! 2. **Execution**: walks the graph in dependency order and hands every
//!    node to an [`Applier`](crate::external::Applier) ([`PlanExecutor`])
//!
//! # Examples
//!
//! ```
//! use eksplan::config::OptionMap;
//! use eksplan::operations::{PlanExecutor, Planner};
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
//! // Generate plan
//! let plan = Planner::new().plan(&options).unwrap().into_result().unwrap().unwrap();
//! assert_eq!(plan.steps()[0].id.as_str(), "namespace/appmesh-system");
//!
//! // Preview without creating anything
//! # struct Noop;
//! # impl eksplan::external::Applier for Noop {
//! #     fn create_namespace(&mut self, s: &eksplan::graph::NamespaceSpec, _: &[eksplan::external::Handle]) -> eksplan::Result<eksplan::external::Handle> { Ok(eksplan::external::Handle::new(&s.name)) }
//! #     fn create_service_account(&mut self, s: &eksplan::graph::ServiceAccountSpec, _: &[eksplan::external::Handle]) -> eksplan::Result<eksplan::external::Handle> { Ok(eksplan::external::Handle::new(&s.name)) }
//! #     fn install_chart(&mut self, s: &eksplan::graph::ControllerSpec, _: &[eksplan::external::Handle]) -> eksplan::Result<eksplan::external::Handle> { Ok(eksplan::external::Handle::new(&s.chart.release)) }
//! #     fn create_mesh(&mut self, s: &eksplan::graph::MeshSpec, _: &[eksplan::external::Handle]) -> eksplan::Result<eksplan::external::Handle> { Ok(eksplan::external::Handle::new(&s.name)) }
//! #     fn create_ingress_gateway(&mut self, s: &eksplan::graph::IngressGatewaySpec, _: &[eksplan::external::Handle]) -> eksplan::Result<eksplan::external::Handle> { Ok(eksplan::external::Handle::new(&s.name)) }
//! #     fn create_node_pool(&mut self, s: &eksplan::config::ComputePoolSpec, _: &[eksplan::external::Handle]) -> eksplan::Result<eksplan::external::Handle> { Ok(eksplan::external::Handle::new(s.variant.to_string())) }
//! #     fn create_repository(&mut self, s: &eksplan::graph::RepositorySpec, _: &[eksplan::external::Handle]) -> eksplan::Result<eksplan::external::Handle> { Ok(eksplan::external::Handle::new(&s.name)) }
//! # }
//! let mut applier = Noop;
//! let result = PlanExecutor::new(&mut applier).dry_run().execute(&plan).unwrap();
//! assert!(result.dry_run);
//! assert_eq!(result.actions_taken.len(), plan.len());
//! ```

pub mod executor;
pub mod plan;

pub use executor::{ExecutionResult, PlanExecutor};
pub use plan::{describe_node, Plan, PlanOutcome, PlanStep, Planner};
