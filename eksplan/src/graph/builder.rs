//! Maps a validated configuration to a resource graph.
//!
//! Nodes are emitted under *roles* (meshed namespace, Envoy service account,
//! mesh controller, ...). Edges come from [`EDGE_RULES`], a table of
//! `dependent ← prerequisite` role pairs; a rule fires only when both roles
//! are present in the plan.

use crate::config::schema::is_standard_namespace;
use crate::config::{ClusterConfig, ValidationEngine};
use crate::error::{Error, Result};
use crate::graph::dag::{Edge, ResourceGraph};
use crate::graph::resource::{
    ChartSpec, ControllerKind, ControllerSpec, CreationPolicy, IngressGatewaySpec, MeshSpec,
    NamespaceSpec, NodePayload, RepositorySpec, ResourceId, ResourceNode, ServiceAccountSpec,
    EKS_CHARTS_REPOSITORY, MESH_LABEL, SIDECAR_INJECTOR_LABEL,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Managed policies of the mesh controller's service account.
pub const MESH_CONTROLLER_POLICIES: [&str; 2] = ["AWSCloudMapFullAccess", "AWSAppMeshFullAccess"];

/// What a node is for in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    /// The namespace being meshed.
    MeshedNamespace,
    /// Service account of the Envoy proxies.
    EnvoyServiceAccount,
    /// Namespace of the load balancer controller.
    LbControllerNamespace,
    /// Service account of the load balancer controller.
    LbControllerServiceAccount,
    /// The load balancer controller.
    LbController,
    /// Namespace of the mesh controller.
    MeshControllerNamespace,
    /// Service account of the mesh controller.
    MeshControllerServiceAccount,
    /// The mesh controller.
    MeshController,
    /// The mesh.
    Mesh,
    /// The ingress gateway.
    IngressGateway,
}

/// `(dependent, prerequisite)` pairs.
pub const EDGE_RULES: &[(Role, Role)] = &[
    (Role::EnvoyServiceAccount, Role::MeshedNamespace),
    (Role::LbControllerServiceAccount, Role::LbControllerNamespace),
    (Role::LbController, Role::LbControllerServiceAccount),
    (Role::MeshControllerServiceAccount, Role::MeshControllerNamespace),
    (Role::MeshController, Role::MeshControllerServiceAccount),
    (Role::Mesh, Role::MeshController),
    (Role::IngressGateway, Role::EnvoyServiceAccount),
    (Role::IngressGateway, Role::Mesh),
    (Role::IngressGateway, Role::LbController),
    (Role::IngressGateway, Role::MeshController),
];

/// Nodes collected so far and the roles they fill.
#[derive(Default)]
struct NodeSet {
    nodes: Vec<ResourceNode>,
    roles: BTreeMap<Role, ResourceId>,
}

impl NodeSet {
    fn add(&mut self, role: Option<Role>, payload: NodePayload) {
        let node = ResourceNode::new(payload);
        if let Some(role) = role {
            self.roles.insert(role, node.id.clone());
        }
        self.nodes.push(node);
    }

    /// Points a role at a node added earlier.
    fn alias(&mut self, role: Role, id: ResourceId) {
        self.roles.insert(role, id);
    }

    fn edges(&self) -> Vec<Edge> {
        EDGE_RULES
            .iter()
            .filter_map(|(dependent, prerequisite)| {
                let to = self.roles.get(dependent)?;
                let from = self.roles.get(prerequisite)?;
                Some(Edge::new(from.clone(), to.clone()))
            })
            .collect()
    }
}

/// Builds the resource graph of one planning run.
///
/// # Examples
///
/// ```
/// use eksplan::config::{ConfigResolver, OptionMap};
/// use eksplan::graph::{ResourceGraphBuilder, ResourceId};
///
/// let options: OptionMap = [
///     ("EksClusterName", "prod"),
///     ("MeshedNamespace", "appns"),
///     ("AddIngressGatewayToNs", "false"),
///     ("SkipAppMeshControllerInstallation", "true"),
///     ("SkipCreatingAppMesh", "true"),
/// ]
/// .into_iter()
/// .collect();
/// let config = ConfigResolver::resolve(&options).unwrap();
/// let graph = ResourceGraphBuilder::new(&config).build().unwrap();
///
/// let namespace = ResourceId::namespace("appns");
/// let envoy = ResourceId::service_account("appns", "envoy-proxy");
/// assert_eq!(graph.len(), 2);
/// assert!(graph.has_edge(&namespace, &envoy));
/// ```
pub struct ResourceGraphBuilder<'a> {
    config: &'a ClusterConfig,
    lb_policy_statements: Vec<Value>,
}

impl<'a> ResourceGraphBuilder<'a> {
    /// Creates a builder for a resolved configuration.
    #[must_use]
    pub fn new(config: &'a ClusterConfig) -> Self {
        Self {
            config,
            lb_policy_statements: Vec::new(),
        }
    }

    /// Inline IAM statements for the load balancer controller's service account.
    #[must_use]
    pub fn with_lb_policy_statements(mut self, statements: Vec<Value>) -> Self {
        self.lb_policy_statements = statements;
        self
    }

    /// Builds the graph.
    ///
    /// A configuration that requests nothing yields the empty graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the plan would create a standard
    /// namespace or touch a namespace a Fargate-only cluster cannot run, and
    /// [`Error::InvalidGraph`] if the emitted nodes do not form a valid graph.
    pub fn build(&self) -> Result<ResourceGraph> {
        let config = self.config;

        if config.requests_nothing() {
            log::debug!("configuration requests nothing; planning an empty graph");
            return Ok(ResourceGraph::empty());
        }

        let violations = ValidationEngine::namespace_violations(config);
        if !violations.is_empty() {
            return Err(Error::Validation { violations });
        }

        let mut set = NodeSet::default();
        self.add_namespaces(&mut set);
        self.add_controllers(&mut set);
        self.add_mesh_members(&mut set);
        Self::add_standalone(config, &mut set);

        let edges = set.edges();
        let graph = ResourceGraph::new(set.nodes, edges)?;
        log::debug!(
            "planned {} resources with {} dependencies",
            graph.len(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Every namespace the plan creates, merged by name.
    fn add_namespaces(&self, set: &mut NodeSet) {
        let config = self.config;
        let meshed = config.effective_namespace();
        let mut created: BTreeMap<String, NamespaceSpec> = BTreeMap::new();

        if config.creates_meshed_namespace() {
            let labels = [
                (MESH_LABEL.to_string(), config.mesh_name.clone()),
                (SIDECAR_INJECTOR_LABEL.to_string(), "enabled".to_string()),
            ];
            created.insert(
                meshed.to_string(),
                NamespaceSpec {
                    name: meshed.to_string(),
                    policy: CreationPolicy::Create,
                    labels: labels.into_iter().collect(),
                },
            );
        }

        let mut roles = Vec::new();
        if config.creates_meshed_namespace() {
            roles.push((Role::MeshedNamespace, meshed));
        }
        for (role, settings) in [
            (Role::LbControllerNamespace, &config.lb_controller),
            (Role::MeshControllerNamespace, &config.mesh_controller),
        ] {
            let name = settings.namespace.as_str();
            if !settings.enabled || is_standard_namespace(name) {
                continue;
            }
            // The meshed namespace is left alone when the user said it exists.
            if config.meshing_requested() && config.skip_creating_namespace && name == meshed {
                continue;
            }
            created.entry(name.to_string()).or_insert_with(|| NamespaceSpec {
                name: name.to_string(),
                policy: CreationPolicy::Create,
                labels: BTreeMap::new(),
            });
            roles.push((role, name));
        }

        for spec in created.into_values() {
            set.add(None, NodePayload::Namespace(spec));
        }
        for (role, name) in roles {
            set.alias(role, ResourceId::namespace(name));
        }
    }

    fn add_controllers(&self, set: &mut NodeSet) {
        let config = self.config;

        if config.lb_controller.enabled {
            let kind = ControllerKind::LoadBalancerController;
            let namespace = &config.lb_controller.namespace;
            set.add(
                Some(Role::LbControllerServiceAccount),
                NodePayload::ServiceAccount(ServiceAccountSpec {
                    name: kind.service_account_name().to_string(),
                    namespace: namespace.clone(),
                    managed_policies: Vec::new(),
                    inline_statements: self.lb_policy_statements.clone(),
                }),
            );
            let values = json!({
                "fullnameOverride": "aws-lb-controller",
                "clusterName": config.cluster_name,
                "vpcId": config.vpc_id,
                "region": config.region,
                "serviceAccount": {
                    "create": false,
                    "name": kind.service_account_name(),
                },
            });
            set.add(
                Some(Role::LbController),
                NodePayload::Controller(controller_spec(kind, namespace, false, values)),
            );
        }

        if config.mesh_controller.enabled {
            let kind = ControllerKind::MeshController;
            let namespace = &config.mesh_controller.namespace;
            set.add(
                Some(Role::MeshControllerServiceAccount),
                NodePayload::ServiceAccount(ServiceAccountSpec {
                    name: kind.service_account_name().to_string(),
                    namespace: namespace.clone(),
                    managed_policies: MESH_CONTROLLER_POLICIES
                        .iter()
                        .map(|p| (*p).to_string())
                        .collect(),
                    inline_statements: Vec::new(),
                }),
            );
            let mut values = json!({
                "region": config.region,
                "serviceAccount": {
                    "create": false,
                    "name": kind.service_account_name(),
                },
            });
            if config.trace_with_xray {
                values["tracing"] = json!({ "enabled": true, "provider": "x-ray" });
            }
            set.add(
                Some(Role::MeshController),
                NodePayload::Controller(controller_spec(
                    kind,
                    namespace,
                    config.trace_with_xray,
                    values,
                )),
            );
        }
    }

    /// The mesh, the Envoy service account and the gateway.
    fn add_mesh_members(&self, set: &mut NodeSet) {
        let config = self.config;
        let namespace = config.effective_namespace();

        if config.create_mesh {
            set.add(
                Some(Role::Mesh),
                NodePayload::Mesh(MeshSpec {
                    name: config.mesh_name.clone(),
                }),
            );
        }

        if config.meshing_requested() {
            set.add(
                Some(Role::EnvoyServiceAccount),
                NodePayload::ServiceAccount(ServiceAccountSpec {
                    name: config.envoy_service_account_name.clone(),
                    namespace: namespace.to_string(),
                    managed_policies: config.envoy_managed_policies.clone(),
                    inline_statements: Vec::new(),
                }),
            );
        }

        if config.add_ingress_gateway {
            set.add(
                Some(Role::IngressGateway),
                NodePayload::IngressGateway(IngressGatewaySpec {
                    name: config.gateway_name(),
                    namespace: namespace.to_string(),
                    service_account: config.envoy_service_account_name.clone(),
                    mesh: config.create_mesh.then(|| config.mesh_name.clone()),
                    fargate_target_type: config.runs_on_fargate(namespace),
                }),
            );
        }
    }

    /// Node pools and repositories; they have no dependencies.
    fn add_standalone(config: &ClusterConfig, set: &mut NodeSet) {
        for pool in config.compute_pools() {
            set.add(None, NodePayload::NodePool(pool));
        }
        for name in &config.ecr_repo_names {
            set.add(
                None,
                NodePayload::Repository(RepositorySpec { name: name.clone() }),
            );
        }
    }
}

fn controller_spec(kind: ControllerKind, namespace: &str, tracing: bool, values: Value) -> ControllerSpec {
    ControllerSpec {
        kind,
        namespace: namespace.to_string(),
        service_account: kind.service_account_name().to_string(),
        enabled: true,
        tracing,
        chart: ChartSpec {
            repository: EKS_CHARTS_REPOSITORY.to_string(),
            chart: kind.name().to_string(),
            release: kind.release_name().to_string(),
            namespace: namespace.to_string(),
            values,
        },
    }
}
