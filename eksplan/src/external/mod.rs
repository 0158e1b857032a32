//! Seams to the collaborators outside the planner.
//!
//! - [`Applier`] realizes resource nodes.
//! - [`PolicyDocumentSource`] supplies IAM policy documents by URL.
//! - [`OutputSink`] receives the values a deployment reports.

pub mod applier;
pub mod outputs;
pub mod policy;

pub use applier::{apply_node, Applier, Handle};
pub use outputs::{collect_outputs, docker_login_command, publish, DeploymentOutput, OutputSink};
pub use policy::{
    fetch_statements, parse_statements, FilePolicySource, PolicyDocumentSource,
    StaticPolicySource, POLICY_SOURCE,
};
