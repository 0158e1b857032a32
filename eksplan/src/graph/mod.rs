//! Resource graph construction and scheduling.
//!
//! [`ResourceGraphBuilder`] turns a [`ClusterConfig`](crate::config::ClusterConfig)
//! into a checked [`ResourceGraph`]; [`DependencyScheduler`] exposes the
//! graph as a partial order.

pub mod builder;
pub mod dag;
pub mod resource;
pub mod scheduler;

#[cfg(all(test, feature = "property-tests"))]
mod graph_proptests;

pub use builder::{ResourceGraphBuilder, Role, EDGE_RULES};
pub use dag::{Edge, ResourceGraph};
pub use resource::{
    ChartSpec, ControllerKind, ControllerSpec, CreationPolicy, IngressGatewaySpec, MeshSpec,
    NamespaceSpec, NodePayload, RepositorySpec, ResourceId, ResourceKind, ResourceNode,
    ServiceAccountSpec,
};
pub use scheduler::DependencyScheduler;
