//! Resolved configuration types.
//!
//! A [`ClusterConfig`] is produced once per planning run by the
//! [`ConfigResolver`](crate::config::ConfigResolver) and never mutated
//! afterward. The derived queries on it (`meshing_requested`,
//! `compute_pools`, ...) are what the validator and graph builder reason
//! about.

use serde::Serialize;
use std::fmt;

/// Namespaces that always exist in a cluster and are never created.
pub const STANDARD_NAMESPACES: [&str; 3] = ["default", "kube-system", "kube-public"];

/// Namespace used when meshing is requested without naming one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Most namespace selectors a single Fargate profile accepts.
pub const MAX_FARGATE_NAMESPACES: usize = 5;

/// Whether a namespace belongs to the standard set.
///
/// # Examples
///
/// ```
/// use eksplan::config::is_standard_namespace;
///
/// assert!(is_standard_namespace("kube-system"));
/// assert!(!is_standard_namespace("appns"));
/// ```
#[must_use]
pub fn is_standard_namespace(name: &str) -> bool {
    STANDARD_NAMESPACES.contains(&name)
}

/// The four kinds of compute pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolVariant {
    /// On-demand EC2 instances.
    OnDemand,
    /// Spot EC2 instances.
    Spot,
    /// ARM64 (Graviton) on-demand instances.
    Graviton,
    /// Fargate profile.
    Fargate,
}

impl fmt::Display for PoolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnDemand => write!(f, "on-demand"),
            Self::Spot => write!(f, "spot"),
            Self::Graviton => write!(f, "graviton"),
            Self::Fargate => write!(f, "fargate"),
        }
    }
}

/// How instances in a pool are paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityType {
    /// Regular on-demand capacity.
    OnDemand,
    /// Interruptible spot capacity.
    Spot,
    /// Serverless Fargate capacity.
    Fargate,
}

/// Machine image architecture for EC2 node pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmiType {
    /// Amazon Linux 2, `x86_64`.
    #[serde(rename = "AL2_x86_64")]
    Al2X86_64,
    /// Amazon Linux 2, ARM64.
    #[serde(rename = "AL2_ARM_64")]
    Al2Arm64,
}

/// One compute pool of the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputePoolSpec {
    /// Which kind of pool this is.
    pub variant: PoolVariant,
    /// Instance types; empty for Fargate.
    pub instance_types: Vec<String>,
    /// Minimum (and desired) number of instances; zero for Fargate.
    pub min_size: u32,
    /// How capacity is purchased.
    pub capacity_type: CapacityType,
    /// Machine image architecture; absent for Fargate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami_type: Option<AmiType>,
    /// Namespace selectors; only used by Fargate pools.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
}

/// Size and instance types requested for one EC2 pool variant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodeGroupSettings {
    /// Requested number of instances.
    pub count: u32,
    /// Requested instance types.
    pub instance_types: Vec<String>,
}

/// Whether an add-on controller is installed and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSettings {
    /// Install the controller.
    pub enabled: bool,
    /// Namespace the controller runs in.
    pub namespace: String,
}

/// The resolved, typed configuration of one planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterConfig {
    /// Name of the EKS cluster.
    pub cluster_name: String,
    /// Kubernetes version, `<major>.<minor>`.
    pub kubernetes_version: String,
    /// VPC hosting the cluster.
    pub vpc_id: Option<String>,
    /// IAM role allowed to run kubectl.
    pub kubectl_role_name: Option<String>,
    /// AWS region.
    pub region: Option<String>,
    /// AWS account.
    pub account: Option<String>,
    /// Explicit plan name.
    pub stack_name: Option<String>,
    /// Namespace explicitly named for meshing.
    pub meshed_namespace: Option<String>,
    /// Assume the meshed namespace already exists.
    pub skip_creating_namespace: bool,
    /// Add an ingress gateway to the meshed namespace.
    pub add_ingress_gateway: bool,
    /// Override for the gateway name.
    pub ingress_gateway_name: Option<String>,
    /// Load balancer controller settings.
    pub lb_controller: ControllerSettings,
    /// Where the load balancer controller IAM policy document lives.
    pub lb_controller_policy_url: String,
    /// App Mesh controller settings.
    pub mesh_controller: ControllerSettings,
    /// Enable X-Ray tracing in the mesh controller.
    pub trace_with_xray: bool,
    /// Create the mesh resource.
    pub create_mesh: bool,
    /// Name of the mesh.
    pub mesh_name: String,
    /// Envoy service account name.
    pub envoy_service_account_name: String,
    /// Managed policies attached to the Envoy service account.
    pub envoy_managed_policies: Vec<String>,
    /// On-demand node pool request.
    pub on_demand: NodeGroupSettings,
    /// Spot node pool request.
    pub spot: NodeGroupSettings,
    /// Graviton node pool request.
    pub graviton: NodeGroupSettings,
    /// Namespaces scheduled on Fargate.
    pub fargate_namespaces: Vec<String>,
    /// Container image repositories.
    pub ecr_repo_names: Vec<String>,
}

impl ClusterConfig {
    /// The namespace meshing operates on.
    #[must_use]
    pub fn effective_namespace(&self) -> &str {
        self.meshed_namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Meshing is requested when a namespace was named or a gateway is wanted.
    #[must_use]
    pub fn meshing_requested(&self) -> bool {
        self.meshed_namespace.is_some() || self.add_ingress_gateway
    }

    /// Whether the meshed namespace is created in this run.
    #[must_use]
    pub fn creates_meshed_namespace(&self) -> bool {
        self.meshing_requested() && !self.skip_creating_namespace
    }

    /// Whether any add-on controller is installed.
    #[must_use]
    pub fn installs_any_controller(&self) -> bool {
        self.lb_controller.enabled || self.mesh_controller.enabled
    }

    /// The gateway name, derived from cluster and namespace unless overridden.
    #[must_use]
    pub fn gateway_name(&self) -> String {
        self.ingress_gateway_name.clone().unwrap_or_else(|| {
            format!(
                "ingressgw-{}-{}",
                self.cluster_name,
                self.effective_namespace()
            )
        })
    }

    /// Name of the plan: the explicit stack name or one derived from the cluster.
    #[must_use]
    pub fn plan_name(&self) -> String {
        if let Some(name) = &self.stack_name {
            return name.clone();
        }
        if self.meshing_requested() {
            format!(
                "EksPlan--{}--{}",
                self.cluster_name,
                self.effective_namespace()
            )
        } else {
            format!("EksPlan--{}", self.cluster_name)
        }
    }

    /// Every compute pool with a positive size, plus Fargate when configured.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksplan::config::{ConfigResolver, OptionMap, PoolVariant};
    ///
    /// let options: OptionMap = [
    ///     ("EksClusterName", "prod"),
    ///     ("OnDemandInstanceCount", "2"),
    ///     ("FargateNamespaces", "apps"),
    /// ]
    /// .into_iter()
    /// .collect();
    /// let config = ConfigResolver::resolve(&options).unwrap();
    /// let variants: Vec<_> = config.compute_pools().iter().map(|p| p.variant).collect();
    /// assert_eq!(variants, vec![PoolVariant::OnDemand, PoolVariant::Fargate]);
    /// ```
    #[must_use]
    pub fn compute_pools(&self) -> Vec<ComputePoolSpec> {
        let mut pools = Vec::new();
        let ec2 = [
            (PoolVariant::OnDemand, &self.on_demand, CapacityType::OnDemand, AmiType::Al2X86_64),
            (PoolVariant::Spot, &self.spot, CapacityType::Spot, AmiType::Al2X86_64),
            (PoolVariant::Graviton, &self.graviton, CapacityType::OnDemand, AmiType::Al2Arm64),
        ];
        for (variant, settings, capacity_type, ami_type) in ec2 {
            if settings.count > 0 {
                pools.push(ComputePoolSpec {
                    variant,
                    instance_types: settings.instance_types.clone(),
                    min_size: settings.count,
                    capacity_type,
                    ami_type: Some(ami_type),
                    namespaces: Vec::new(),
                });
            }
        }
        if !self.fargate_namespaces.is_empty() {
            pools.push(ComputePoolSpec {
                variant: PoolVariant::Fargate,
                instance_types: Vec::new(),
                min_size: 0,
                capacity_type: CapacityType::Fargate,
                ami_type: None,
                namespaces: self.fargate_namespaces.clone(),
            });
        }
        pools
    }

    /// Whether any EC2 pool has a positive size.
    #[must_use]
    pub fn has_ec2_compute(&self) -> bool {
        self.on_demand.count > 0 || self.spot.count > 0 || self.graviton.count > 0
    }

    /// Whether the only compute is Fargate.
    #[must_use]
    pub fn is_fargate_only(&self) -> bool {
        !self.has_ec2_compute() && !self.fargate_namespaces.is_empty()
    }

    /// Whether a namespace runs on Fargate.
    #[must_use]
    pub fn runs_on_fargate(&self, namespace: &str) -> bool {
        self.fargate_namespaces.iter().any(|ns| ns == namespace)
    }

    /// Whether anything inside the cluster is planned.
    ///
    /// Namespaces, service accounts, controllers, meshes and gateways all need
    /// kubectl access; node pools and repositories do not.
    #[must_use]
    pub fn plans_cluster_side_resources(&self) -> bool {
        self.meshing_requested() || self.installs_any_controller() || self.create_mesh
    }

    /// Whether the configuration asks for nothing at all.
    #[must_use]
    pub fn requests_nothing(&self) -> bool {
        !self.plans_cluster_side_resources()
            && !self.has_ec2_compute()
            && self.fargate_namespaces.is_empty()
            && self.ecr_repo_names.is_empty()
    }

    /// Namespaces the plan operates on, deduplicated, in first-use order.
    ///
    /// The meshed namespace counts when meshing is requested; controller
    /// namespaces count when the controller is installed.
    #[must_use]
    pub fn namespaces_operated_on(&self) -> Vec<&str> {
        let candidates = [
            (self.meshing_requested(), self.effective_namespace()),
            (self.lb_controller.enabled, self.lb_controller.namespace.as_str()),
            (self.mesh_controller.enabled, self.mesh_controller.namespace.as_str()),
        ];
        let mut namespaces: Vec<&str> = Vec::new();
        for (used, ns) in candidates {
            if used && !namespaces.contains(&ns) {
                namespaces.push(ns);
            }
        }
        namespaces
    }
}
