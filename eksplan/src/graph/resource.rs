//! Resource nodes and their typed payloads.
//!
//! Every node handed to an applier carries one of the payload types below.
//! Payloads are plain data: the applier decides how to realize them.

use crate::config::ComputePoolSpec;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Helm repository hosting both controller charts.
pub const EKS_CHARTS_REPOSITORY: &str = "https://aws.github.io/eks-charts";

/// Label that selects namespaces into a mesh.
pub const MESH_LABEL: &str = "mesh";

/// Label that enables Envoy sidecar injection.
pub const SIDECAR_INJECTOR_LABEL: &str = "appmesh.k8s.aws/sidecarInjectorWebhook";

/// Stable, human-readable identifier of a resource node.
///
/// # Examples
///
/// ```
/// use eksplan::graph::ResourceId;
///
/// assert_eq!(ResourceId::namespace("appns").as_str(), "namespace/appns");
/// assert_eq!(
///     ResourceId::service_account("appns", "envoy-proxy").as_str(),
///     "service-account/appns/envoy-proxy"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Id of a namespace.
    #[must_use]
    pub fn namespace(name: &str) -> Self {
        Self(format!("namespace/{name}"))
    }

    /// Id of a service account inside a namespace.
    #[must_use]
    pub fn service_account(namespace: &str, name: &str) -> Self {
        Self(format!("service-account/{namespace}/{name}"))
    }

    /// Id of a controller installation.
    #[must_use]
    pub fn controller(name: &str) -> Self {
        Self(format!("controller/{name}"))
    }

    /// Id of a mesh.
    #[must_use]
    pub fn mesh(name: &str) -> Self {
        Self(format!("mesh/{name}"))
    }

    /// Id of an ingress gateway.
    #[must_use]
    pub fn ingress_gateway(name: &str) -> Self {
        Self(format!("ingress-gateway/{name}"))
    }

    /// Id of a compute pool.
    #[must_use]
    pub fn node_pool(variant: impl fmt::Display) -> Self {
        Self(format!("node-pool/{variant}"))
    }

    /// Id of a container image repository.
    #[must_use]
    pub fn repository(name: &str) -> Self {
        Self(format!("repository/{name}"))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of a resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// A Kubernetes namespace.
    Namespace,
    /// A service account bound to an IAM role.
    ServiceAccount,
    /// A Helm-installed controller.
    Controller,
    /// A service mesh.
    Mesh,
    /// An ingress gateway into the mesh.
    IngressGateway,
    /// A compute pool.
    NodePool,
    /// A container image repository.
    Repository,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Namespace => "namespace",
            Self::ServiceAccount => "service-account",
            Self::Controller => "controller",
            Self::Mesh => "mesh",
            Self::IngressGateway => "ingress-gateway",
            Self::NodePool => "node-pool",
            Self::Repository => "repository",
        };
        f.write_str(s)
    }
}

/// Whether a namespace is created by the plan or expected to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreationPolicy {
    /// The plan creates the namespace.
    Create,
    /// The namespace already exists.
    AssumeExisting,
}

/// A namespace the plan touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceSpec {
    /// Namespace name.
    pub name: String,
    /// Create it or assume it exists.
    pub policy: CreationPolicy,
    /// Labels set on creation.
    pub labels: BTreeMap<String, String>,
}

impl NamespaceSpec {
    /// The `v1/Namespace` manifest for this namespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksplan::graph::{CreationPolicy, NamespaceSpec};
    ///
    /// let ns = NamespaceSpec {
    ///     name: "appns".to_string(),
    ///     policy: CreationPolicy::Create,
    ///     labels: [("mesh".to_string(), "prod-mesh".to_string())].into_iter().collect(),
    /// };
    /// let manifest = ns.manifest();
    /// assert_eq!(manifest["kind"], "Namespace");
    /// assert_eq!(manifest["metadata"]["labels"]["mesh"], "prod-mesh");
    /// ```
    #[must_use]
    pub fn manifest(&self) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {
                "name": self.name,
                "labels": self.labels,
            }
        })
    }
}

/// A service account with its IAM permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAccountSpec {
    /// Service account name.
    pub name: String,
    /// Namespace the account lives in.
    pub namespace: String,
    /// Managed policies attached to the account's role.
    pub managed_policies: Vec<String>,
    /// Inline policy statements attached to the account's role.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inline_statements: Vec<Value>,
}

/// The controllers the plan can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerKind {
    /// AWS load balancer controller.
    LoadBalancerController,
    /// AWS App Mesh controller.
    MeshController,
}

impl ControllerKind {
    /// Controller (and chart) name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LoadBalancerController => "aws-load-balancer-controller",
            Self::MeshController => "appmesh-controller",
        }
    }

    /// Name of the controller's service account.
    #[must_use]
    pub const fn service_account_name(self) -> &'static str {
        match self {
            Self::LoadBalancerController => "aws-lb-controller",
            Self::MeshController => "appmesh-controller",
        }
    }

    /// Helm release name.
    #[must_use]
    pub const fn release_name(self) -> &'static str {
        match self {
            Self::LoadBalancerController => "aws-lb-controller-by-cdk",
            Self::MeshController => "app-mesh-by-cdk",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coordinates and values of a Helm chart installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    /// Chart repository URL.
    pub repository: String,
    /// Chart name.
    pub chart: String,
    /// Release name.
    pub release: String,
    /// Namespace to install into.
    pub namespace: String,
    /// Chart values.
    pub values: Value,
}

/// A controller installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSpec {
    /// Which controller.
    pub kind: ControllerKind,
    /// Namespace the controller runs in.
    pub namespace: String,
    /// Service account the controller runs as.
    pub service_account: String,
    /// Whether the controller is installed.
    pub enabled: bool,
    /// X-Ray tracing (mesh controller only).
    pub tracing: bool,
    /// The chart to install.
    pub chart: ChartSpec,
}

/// A service mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshSpec {
    /// Mesh name.
    pub name: String,
}

impl MeshSpec {
    /// The `appmesh.k8s.aws/v1beta2 Mesh` manifest for this mesh.
    #[must_use]
    pub fn manifest(&self) -> Value {
        json!({
            "apiVersion": "appmesh.k8s.aws/v1beta2",
            "kind": "Mesh",
            "metadata": { "name": self.name },
            "spec": {
                "namespaceSelector": {
                    "matchLabels": { "mesh": self.name }
                }
            }
        })
    }
}

/// An ingress gateway into the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressGatewaySpec {
    /// Gateway name.
    pub name: String,
    /// Namespace the gateway runs in.
    pub namespace: String,
    /// Service account of the gateway's Envoy proxies.
    pub service_account: String,
    /// Mesh the gateway joins, when the plan creates one.
    pub mesh: Option<String>,
    /// The gateway's load balancer targets pod IPs (namespace runs on Fargate).
    pub fargate_target_type: bool,
}

/// A container image repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySpec {
    /// Repository name.
    pub name: String,
}

/// What the applier needs to realize a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodePayload {
    /// Create a namespace.
    Namespace(NamespaceSpec),
    /// Create a service account.
    ServiceAccount(ServiceAccountSpec),
    /// Install a controller chart.
    Controller(ControllerSpec),
    /// Create a mesh.
    Mesh(MeshSpec),
    /// Create an ingress gateway.
    IngressGateway(IngressGatewaySpec),
    /// Create a compute pool.
    NodePool(ComputePoolSpec),
    /// Create a repository.
    Repository(RepositorySpec),
}

impl NodePayload {
    /// The kind of node this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Namespace(_) => ResourceKind::Namespace,
            Self::ServiceAccount(_) => ResourceKind::ServiceAccount,
            Self::Controller(_) => ResourceKind::Controller,
            Self::Mesh(_) => ResourceKind::Mesh,
            Self::IngressGateway(_) => ResourceKind::IngressGateway,
            Self::NodePool(_) => ResourceKind::NodePool,
            Self::Repository(_) => ResourceKind::Repository,
        }
    }

    /// The id a node with this payload gets.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        match self {
            Self::Namespace(ns) => ResourceId::namespace(&ns.name),
            Self::ServiceAccount(sa) => ResourceId::service_account(&sa.namespace, &sa.name),
            Self::Controller(c) => ResourceId::controller(c.kind.name()),
            Self::Mesh(m) => ResourceId::mesh(&m.name),
            Self::IngressGateway(g) => ResourceId::ingress_gateway(&g.name),
            Self::NodePool(p) => ResourceId::node_pool(p.variant),
            Self::Repository(r) => ResourceId::repository(&r.name),
        }
    }
}

/// An abstract unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNode {
    /// Stable id.
    pub id: ResourceId,
    /// Typed payload for the applier.
    pub payload: NodePayload,
}

impl ResourceNode {
    /// Creates a node whose id is derived from its payload.
    #[must_use]
    pub fn new(payload: NodePayload) -> Self {
        Self {
            id: payload.id(),
            payload,
        }
    }

    /// The node's kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.payload.kind()
    }
}
