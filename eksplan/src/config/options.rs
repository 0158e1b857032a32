//! The flat option map and the table of recognized options.
//!
//! Options arrive as a flat `name → value` map, the same shape as a
//! `cdk.json` context block. Values stay untyped here; the
//! [`ConfigResolver`](crate::config::ConfigResolver) turns them into a typed
//! [`ClusterConfig`](crate::config::ClusterConfig).

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Option names recognized by the resolver.
pub mod names {
    /// Name of the EKS cluster (required).
    pub const EKS_CLUSTER_NAME: &str = "EksClusterName";
    /// Kubernetes version of the cluster.
    pub const K8S_VERSION: &str = "K8sVersion";
    /// Identifier of the VPC the cluster lives in.
    pub const VPC_ID: &str = "VpcId";
    /// IAM role that is allowed to run kubectl against the cluster.
    pub const KUBECTL_ROLE_NAME: &str = "KubectlRoleName";
    /// AWS region.
    pub const REGION: &str = "Region";
    /// AWS account identifier.
    pub const ACCOUNT: &str = "Account";
    /// Explicit plan (stack) name.
    pub const STACK_NAME: &str = "StackName";
    /// Namespace to add to the mesh.
    pub const MESHED_NAMESPACE: &str = "MeshedNamespace";
    /// Assume the meshed namespace already exists.
    pub const SKIP_CREATING_NAMESPACE: &str = "SkipCreatingNamespace";
    /// Add an ingress gateway to the meshed namespace.
    pub const ADD_INGRESS_GATEWAY_TO_NS: &str = "AddIngressGatewayToNs";
    /// Override for the ingress gateway name.
    pub const INGRESS_GATEWAY_NAME: &str = "IngressGatewayName";
    /// Do not install the load balancer controller.
    pub const SKIP_LB_CONTROLLER_INSTALLATION: &str = "SkipLbControllerInstallation";
    /// Namespace of the load balancer controller.
    pub const LB_CONTROLLER_NAMESPACE: &str = "LbControllerNamespace";
    /// Where the load balancer controller IAM policy document lives.
    pub const LB_CONTROLLER_POLICY_URL: &str = "LbControllerPolicyUrl";
    /// Do not install the App Mesh controller.
    pub const SKIP_APP_MESH_CONTROLLER_INSTALLATION: &str = "SkipAppMeshControllerInstallation";
    /// Namespace of the App Mesh controller.
    pub const APP_MESH_CONTROLLER_NAMESPACE: &str = "AppMeshControllerNamespace";
    /// Enable X-Ray tracing in the App Mesh controller.
    pub const TRACE_WITH_XRAY_ON_APP_MESH: &str = "TraceWithXRayOnAppMesh";
    /// Do not create the mesh resource.
    pub const SKIP_CREATING_APP_MESH: &str = "SkipCreatingAppMesh";
    /// Name of the mesh.
    pub const APP_MESH_NAME: &str = "AppMeshName";
    /// Name of the Envoy proxies' service account.
    pub const ENVOY_SERVICE_ACCOUNT_NAME: &str = "EnvoyServiceAccountName";
    /// Managed policies attached to the Envoy service account.
    pub const ENVOY_SERVICE_ACCOUNT_MANAGED_POLICIES: &str = "EnvoyServiceAccountManagedPolicies";
    /// Size of the on-demand node pool.
    pub const ON_DEMAND_INSTANCE_COUNT: &str = "OnDemandInstanceCount";
    /// Instance type of the on-demand node pool.
    pub const ON_DEMAND_INSTANCE_TYPE: &str = "OnDemandInstanceType";
    /// Size of the spot node pool.
    pub const SPOT_INSTANCE_COUNT: &str = "SpotInstanceCount";
    /// Instance types of the spot node pool.
    pub const SPOT_INSTANCE_TYPES: &str = "SpotInstanceTypes";
    /// Size of the Graviton node pool.
    pub const GRAVITON_INSTANCE_COUNT: &str = "GravitonInstanceCount";
    /// Instance type of the Graviton node pool.
    pub const GRAVITON_INSTANCE_TYPE: &str = "GravitonInstanceType";
    /// Namespaces scheduled on Fargate.
    pub const FARGATE_NAMESPACES: &str = "FargateNamespaces";
    /// Container image repositories to create.
    pub const ECR_REPO_NAMES: &str = "EcrRepoNames";
}

/// The value type an option resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Free-form string.
    String,
    /// Boolean flag.
    Bool,
    /// Non-negative whole number.
    Number,
    /// Comma- or semicolon-delimited list.
    List,
}

/// Description of one recognized option.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OptionSpec {
    /// The option name as it appears in configuration.
    pub name: &'static str,
    /// The type the option resolves to.
    pub kind: OptionKind,
    /// Documented default, as shown to users.
    pub default: &'static str,
    /// What the option controls.
    pub description: &'static str,
}

const fn spec(
    name: &'static str,
    kind: OptionKind,
    default: &'static str,
    description: &'static str,
) -> OptionSpec {
    OptionSpec {
        name,
        kind,
        default,
        description,
    }
}

/// Every option the resolver understands.
pub const RECOGNIZED_OPTIONS: &[OptionSpec] = &[
    spec(names::EKS_CLUSTER_NAME, OptionKind::String, "(required)", "Name of the EKS cluster"),
    spec(names::K8S_VERSION, OptionKind::String, "1.19", "Kubernetes version"),
    spec(names::VPC_ID, OptionKind::String, "(none)", "VPC hosting the cluster"),
    spec(names::KUBECTL_ROLE_NAME, OptionKind::String, "(none)", "IAM role used to run kubectl"),
    spec(names::REGION, OptionKind::String, "$CDK_DEFAULT_REGION", "AWS region"),
    spec(names::ACCOUNT, OptionKind::String, "$CDK_DEFAULT_ACCOUNT", "AWS account"),
    spec(names::STACK_NAME, OptionKind::String, "(derived)", "Name of the plan"),
    spec(names::MESHED_NAMESPACE, OptionKind::String, "default", "Namespace to add to the mesh"),
    spec(names::SKIP_CREATING_NAMESPACE, OptionKind::Bool, "false", "Assume the meshed namespace exists"),
    spec(names::ADD_INGRESS_GATEWAY_TO_NS, OptionKind::Bool, "true", "Add an ingress gateway to the meshed namespace"),
    spec(names::INGRESS_GATEWAY_NAME, OptionKind::String, "ingressgw-<cluster>-<namespace>", "Ingress gateway name"),
    spec(names::SKIP_LB_CONTROLLER_INSTALLATION, OptionKind::Bool, "true", "Skip the load balancer controller"),
    spec(names::LB_CONTROLLER_NAMESPACE, OptionKind::String, "kube-system", "Load balancer controller namespace"),
    spec(names::LB_CONTROLLER_POLICY_URL, OptionKind::String, "(upstream iam_policy.json)", "Load balancer controller IAM policy document"),
    spec(names::SKIP_APP_MESH_CONTROLLER_INSTALLATION, OptionKind::Bool, "false", "Skip the App Mesh controller"),
    spec(names::APP_MESH_CONTROLLER_NAMESPACE, OptionKind::String, "appmesh-system", "App Mesh controller namespace"),
    spec(names::TRACE_WITH_XRAY_ON_APP_MESH, OptionKind::Bool, "true", "Enable X-Ray tracing on the mesh"),
    spec(names::SKIP_CREATING_APP_MESH, OptionKind::Bool, "false", "Skip creating the mesh"),
    spec(names::APP_MESH_NAME, OptionKind::String, "<cluster>-mesh", "Mesh name"),
    spec(names::ENVOY_SERVICE_ACCOUNT_NAME, OptionKind::String, "envoy-proxy", "Envoy service account name"),
    spec(names::ENVOY_SERVICE_ACCOUNT_MANAGED_POLICIES, OptionKind::List, "AWSAppMeshEnvoyAccess,AWSCloudMapDiscoverInstanceAccess,AWSXRayDaemonWriteAccess", "Managed policies for Envoy"),
    spec(names::ON_DEMAND_INSTANCE_COUNT, OptionKind::Number, "0", "On-demand node pool size"),
    spec(names::ON_DEMAND_INSTANCE_TYPE, OptionKind::String, "t3a.small", "On-demand instance type"),
    spec(names::SPOT_INSTANCE_COUNT, OptionKind::Number, "0", "Spot node pool size"),
    spec(names::SPOT_INSTANCE_TYPES, OptionKind::List, "(none)", "Spot instance types"),
    spec(names::GRAVITON_INSTANCE_COUNT, OptionKind::Number, "0", "Graviton node pool size"),
    spec(names::GRAVITON_INSTANCE_TYPE, OptionKind::String, "t4g.small", "Graviton instance type"),
    spec(names::FARGATE_NAMESPACES, OptionKind::List, "(none)", "Namespaces running on Fargate"),
    spec(names::ECR_REPO_NAMES, OptionKind::List, "(none)", "Container image repositories"),
];

/// Looks up a recognized option by name.
#[must_use]
pub fn find_option(name: &str) -> Option<&'static OptionSpec> {
    RECOGNIZED_OPTIONS.iter().find(|spec| spec.name == name)
}

/// Whether a key is a CDK feature flag rather than an option.
///
/// Feature flags such as `@aws-cdk/core:newStyleStackSynthesis` or
/// `aws:cdk:enable-path-metadata` live in the same context block.
#[must_use]
pub fn is_feature_flag(name: &str) -> bool {
    name.starts_with('@') || name.starts_with("aws:")
}

/// Converts an option name to its `EKSPLAN_*` environment variable.
///
/// # Examples
///
/// ```
/// use eksplan::config::options::env_var_name;
///
/// assert_eq!(env_var_name("EksClusterName"), "EKSPLAN_EKS_CLUSTER_NAME");
/// assert_eq!(env_var_name("K8sVersion"), "EKSPLAN_K8S_VERSION");
/// ```
#[must_use]
pub fn env_var_name(option: &str) -> String {
    let mut out = String::from("EKSPLAN_");
    let mut prev: Option<char> = None;
    for c in option.chars() {
        if c.is_ascii_uppercase() {
            if let Some(p) = prev {
                if p.is_ascii_lowercase() || p.is_ascii_digit() {
                    out.push('_');
                }
            }
        }
        out.push(c.to_ascii_uppercase());
        prev = Some(c);
    }
    out
}

/// A flat map of option names to untyped values.
///
/// # Examples
///
/// ```
/// use eksplan::config::OptionMap;
///
/// let options: OptionMap = [("EksClusterName", "prod"), ("MeshedNamespace", "shop")]
///     .into_iter()
///     .collect();
/// assert_eq!(options.len(), 2);
/// assert!(options.get("EksClusterName").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionMap {
    values: BTreeMap<String, Value>,
}

impl OptionMap {
    /// Creates an empty option map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Sets an option, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Removes an option.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Whether the option is present (blank values count as present here).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over option names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of options in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map holds no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for OptionMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
