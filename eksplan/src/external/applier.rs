//! The seam to whatever realizes a plan.

use crate::config::ComputePoolSpec;
use crate::error::Result;
use crate::graph::{
    ControllerSpec, IngressGatewaySpec, MeshSpec, NamespaceSpec, NodePayload, RepositorySpec,
    ResourceNode, ServiceAccountSpec,
};
use serde::Serialize;
use std::fmt;

/// Opaque reference to something an applier created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Wraps an applier-specific reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The wrapped reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates the resources of a plan.
///
/// Every call receives the typed payload of one node and the handles of the
/// node's prerequisites, in prerequisite id order. Failures should be
/// reported as [`crate::Error::Collaborator`]; they are propagated unchanged.
pub trait Applier {
    /// Creates a namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be created.
    fn create_namespace(&mut self, spec: &NamespaceSpec, dependencies: &[Handle]) -> Result<Handle>;

    /// Creates a service account and its IAM role.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created.
    fn create_service_account(
        &mut self,
        spec: &ServiceAccountSpec,
        dependencies: &[Handle],
    ) -> Result<Handle>;

    /// Installs a controller's Helm chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart cannot be installed.
    fn install_chart(&mut self, spec: &ControllerSpec, dependencies: &[Handle]) -> Result<Handle>;

    /// Creates a mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh cannot be created.
    fn create_mesh(&mut self, spec: &MeshSpec, dependencies: &[Handle]) -> Result<Handle>;

    /// Creates an ingress gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway cannot be created.
    fn create_ingress_gateway(
        &mut self,
        spec: &IngressGatewaySpec,
        dependencies: &[Handle],
    ) -> Result<Handle>;

    /// Creates a compute pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created.
    fn create_node_pool(&mut self, spec: &ComputePoolSpec, dependencies: &[Handle]) -> Result<Handle>;

    /// Creates a container image repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be created.
    fn create_repository(&mut self, spec: &RepositorySpec, dependencies: &[Handle]) -> Result<Handle>;
}

/// Dispatches one node to the matching applier call.
///
/// # Errors
///
/// Returns whatever the applier returns.
pub fn apply_node<A: Applier + ?Sized>(
    applier: &mut A,
    node: &ResourceNode,
    dependencies: &[Handle],
) -> Result<Handle> {
    match &node.payload {
        NodePayload::Namespace(spec) => applier.create_namespace(spec, dependencies),
        NodePayload::ServiceAccount(spec) => applier.create_service_account(spec, dependencies),
        NodePayload::Controller(spec) => applier.install_chart(spec, dependencies),
        NodePayload::Mesh(spec) => applier.create_mesh(spec, dependencies),
        NodePayload::IngressGateway(spec) => applier.create_ingress_gateway(spec, dependencies),
        NodePayload::NodePool(spec) => applier.create_node_pool(spec, dependencies),
        NodePayload::Repository(spec) => applier.create_repository(spec, dependencies),
    }
}
