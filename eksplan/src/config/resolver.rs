//! Resolution of raw options into a typed [`ClusterConfig`].
//!
//! Every recognized option is read from the [`OptionMap`], converted to its
//! type, and replaced by its documented default when absent or blank. All
//! malformed values are collected before the resolver gives up.

use crate::config::options::{find_option, is_feature_flag, names, OptionMap};
use crate::config::schema::{ClusterConfig, ControllerSettings, NodeGroupSettings};
use crate::error::{Error, Result, Violation};
use serde_yaml::Value;

/// Default Kubernetes version.
pub const DEFAULT_K8S_VERSION: &str = "1.19";

/// Default namespace of the load balancer controller.
pub const DEFAULT_LB_CONTROLLER_NAMESPACE: &str = "kube-system";

/// Default namespace of the App Mesh controller.
pub const DEFAULT_APP_MESH_CONTROLLER_NAMESPACE: &str = "appmesh-system";

/// Upstream IAM policy document of the load balancer controller.
pub const DEFAULT_LB_CONTROLLER_POLICY_URL: &str = "https://raw.githubusercontent.com/kubernetes-sigs/aws-load-balancer-controller/main/docs/install/iam_policy.json";

/// Default Envoy service account name.
pub const DEFAULT_ENVOY_SERVICE_ACCOUNT_NAME: &str = "envoy-proxy";

/// Managed policies attached to the Envoy service account by default.
pub const DEFAULT_ENVOY_MANAGED_POLICIES: [&str; 3] = [
    "AWSAppMeshEnvoyAccess",
    "AWSCloudMapDiscoverInstanceAccess",
    "AWSXRayDaemonWriteAccess",
];

/// Default on-demand instance type.
pub const DEFAULT_ON_DEMAND_INSTANCE_TYPE: &str = "t3a.small";

/// Default Graviton instance type.
pub const DEFAULT_GRAVITON_INSTANCE_TYPE: &str = "t4g.small";

/// Parses a boolean the way configuration files and environment variables
/// spell it.
///
/// Accepts true/false, 1/0, yes/no and on/off in any case.
///
/// # Examples
///
/// ```
/// use eksplan::config::parse_bool;
///
/// assert_eq!(parse_bool("Yes"), Some(true));
/// assert_eq!(parse_bool("off"), Some(false));
/// assert_eq!(parse_bool("maybe"), None);
/// ```
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a delimited list on `,` and `;`, trimming and dropping empty items.
///
/// # Examples
///
/// ```
/// use eksplan::config::split_list;
///
/// assert_eq!(split_list(" a, b;;c "), vec!["a", "b", "c"]);
/// assert!(split_list(" , ").is_empty());
/// ```
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Resolves an [`OptionMap`] into a [`ClusterConfig`].
///
/// # Examples
///
/// ```
/// use eksplan::config::{ConfigResolver, OptionMap};
///
/// let options: OptionMap = [("EksClusterName", "prod")].into_iter().collect();
/// let config = ConfigResolver::resolve(&options).unwrap();
/// assert_eq!(config.kubernetes_version, "1.19");
/// assert_eq!(config.mesh_name, "prod-mesh");
/// assert!(config.meshed_namespace.is_none());
/// ```
pub struct ConfigResolver;

impl ConfigResolver {
    /// Resolve every recognized option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] listing every problem when the
    /// cluster name is missing or any value is malformed.
    pub fn resolve(options: &OptionMap) -> Result<ClusterConfig> {
        for name in Self::unknown_options(options) {
            log::warn!("ignoring unrecognized option '{name}'");
        }

        let mut r = Resolution::new(options);

        let cluster_name = r.string(names::EKS_CLUSTER_NAME);
        if cluster_name.is_none() {
            r.violations.push(Violation::configuration(
                names::EKS_CLUSTER_NAME,
                "must be specified",
            ));
        }
        let cluster_name = cluster_name.unwrap_or_default();

        let lb_controller = ControllerSettings {
            enabled: !r.flag(names::SKIP_LB_CONTROLLER_INSTALLATION, true),
            namespace: r.string_or(names::LB_CONTROLLER_NAMESPACE, DEFAULT_LB_CONTROLLER_NAMESPACE),
        };
        let mesh_controller = ControllerSettings {
            enabled: !r.flag(names::SKIP_APP_MESH_CONTROLLER_INSTALLATION, false),
            namespace: r.string_or(
                names::APP_MESH_CONTROLLER_NAMESPACE,
                DEFAULT_APP_MESH_CONTROLLER_NAMESPACE,
            ),
        };

        let config = ClusterConfig {
            kubernetes_version: r.string_or(names::K8S_VERSION, DEFAULT_K8S_VERSION),
            vpc_id: r.string(names::VPC_ID),
            kubectl_role_name: r.string(names::KUBECTL_ROLE_NAME),
            region: r.string(names::REGION),
            account: r.string(names::ACCOUNT),
            stack_name: r.string(names::STACK_NAME),
            meshed_namespace: r.string(names::MESHED_NAMESPACE),
            skip_creating_namespace: r.flag(names::SKIP_CREATING_NAMESPACE, false),
            add_ingress_gateway: r.flag(names::ADD_INGRESS_GATEWAY_TO_NS, true),
            ingress_gateway_name: r.string(names::INGRESS_GATEWAY_NAME),
            lb_controller,
            lb_controller_policy_url: r
                .string_or(names::LB_CONTROLLER_POLICY_URL, DEFAULT_LB_CONTROLLER_POLICY_URL),
            mesh_controller,
            trace_with_xray: r.flag(names::TRACE_WITH_XRAY_ON_APP_MESH, true),
            create_mesh: !r.flag(names::SKIP_CREATING_APP_MESH, false),
            mesh_name: r
                .string(names::APP_MESH_NAME)
                .unwrap_or_else(|| format!("{cluster_name}-mesh")),
            envoy_service_account_name: r.string_or(
                names::ENVOY_SERVICE_ACCOUNT_NAME,
                DEFAULT_ENVOY_SERVICE_ACCOUNT_NAME,
            ),
            envoy_managed_policies: r.list(names::ENVOY_SERVICE_ACCOUNT_MANAGED_POLICIES).unwrap_or_else(|| {
                DEFAULT_ENVOY_MANAGED_POLICIES
                    .iter()
                    .map(|p| (*p).to_string())
                    .collect()
            }),
            on_demand: NodeGroupSettings {
                count: r.count(names::ON_DEMAND_INSTANCE_COUNT),
                instance_types: vec![r.string_or(
                    names::ON_DEMAND_INSTANCE_TYPE,
                    DEFAULT_ON_DEMAND_INSTANCE_TYPE,
                )],
            },
            spot: NodeGroupSettings {
                count: r.count(names::SPOT_INSTANCE_COUNT),
                instance_types: r.list(names::SPOT_INSTANCE_TYPES).unwrap_or_default(),
            },
            graviton: NodeGroupSettings {
                count: r.count(names::GRAVITON_INSTANCE_COUNT),
                instance_types: vec![r.string_or(
                    names::GRAVITON_INSTANCE_TYPE,
                    DEFAULT_GRAVITON_INSTANCE_TYPE,
                )],
            },
            fargate_namespaces: r.list(names::FARGATE_NAMESPACES).unwrap_or_default(),
            ecr_repo_names: r.list(names::ECR_REPO_NAMES).unwrap_or_default(),
            cluster_name,
        };

        if r.violations.is_empty() {
            log::debug!("resolved configuration for cluster '{}'", config.cluster_name);
            Ok(config)
        } else {
            Err(Error::Configuration {
                violations: r.violations,
            })
        }
    }

    /// Option names that are neither recognized nor CDK feature flags.
    #[must_use]
    pub fn unknown_options(options: &OptionMap) -> Vec<&str> {
        options
            .iter()
            .map(|(name, _)| name)
            .filter(|name| find_option(name).is_none() && !is_feature_flag(name))
            .collect()
    }
}

/// Typed reads over an option map that accumulate violations.
struct Resolution<'a> {
    options: &'a OptionMap,
    violations: Vec<Violation>,
}

impl<'a> Resolution<'a> {
    fn new(options: &'a OptionMap) -> Self {
        Self {
            options,
            violations: Vec::new(),
        }
    }

    /// A string option; blank values are absent.
    fn string(&mut self, name: &str) -> Option<String> {
        let value = self.options.get(name)?;
        let text = match value {
            Value::Null => return None,
            Value::String(s) => s.trim().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.violations
                    .push(Violation::configuration(name, "expected a string value"));
                return None;
            }
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn string_or(&mut self, name: &str, default: &str) -> String {
        self.string(name).unwrap_or_else(|| default.to_string())
    }

    /// A boolean option; blank or malformed values fall back to `default`.
    fn flag(&mut self, name: &str, default: bool) -> bool {
        let Some(value) = self.options.get(name) else {
            return default;
        };
        match value {
            Value::Null => default,
            Value::Bool(b) => *b,
            Value::Number(n) => match n.as_u64() {
                Some(0) => false,
                Some(1) => true,
                _ => {
                    self.violations.push(Violation::configuration(
                        name,
                        format!("not a boolean: '{n}'"),
                    ));
                    default
                }
            },
            Value::String(s) if s.trim().is_empty() => default,
            Value::String(s) => parse_bool(s).unwrap_or_else(|| {
                self.violations.push(Violation::configuration(
                    name,
                    format!("not a boolean: '{s}'"),
                ));
                default
            }),
            _ => {
                self.violations
                    .push(Violation::configuration(name, "expected a boolean value"));
                default
            }
        }
    }

    /// A non-negative whole number; absent or blank values resolve to zero.
    fn count(&mut self, name: &str) -> u32 {
        let Some(value) = self.options.get(name) else {
            return 0;
        };
        let number = match value {
            Value::Null => return 0,
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.trim().is_empty() => return 0,
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            None => {
                self.violations.push(Violation::configuration(
                    name,
                    format!("not a number: {}", describe(value)),
                ));
                0
            }
            Some(n) if n < 0.0 => {
                self.violations
                    .push(Violation::configuration(name, format!("must not be negative, got {n}")));
                0
            }
            Some(n) if n.fract() != 0.0 || !n.is_finite() => {
                self.violations
                    .push(Violation::configuration(name, format!("must be a whole number, got {n}")));
                0
            }
            Some(n) if n > f64::from(u32::MAX) => {
                self.violations
                    .push(Violation::configuration(name, format!("too large: {n}")));
                0
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(n) => n as u32,
        }
    }

    /// A list option; absent when missing, blank, or empty after splitting.
    fn list(&mut self, name: &str) -> Option<Vec<String>> {
        let value = self.options.get(name)?;
        let items = match value {
            Value::Null => return None,
            Value::String(s) => split_list(s),
            Value::Sequence(seq) => {
                let mut items = Vec::new();
                for item in seq {
                    match item {
                        Value::String(s) => items.extend(split_list(s)),
                        Value::Number(n) => items.push(n.to_string()),
                        _ => {
                            self.violations.push(Violation::configuration(
                                name,
                                "list items must be strings",
                            ));
                            return None;
                        }
                    }
                }
                items
            }
            _ => {
                self.violations
                    .push(Violation::configuration(name, "expected a list value"));
                return None;
            }
        };
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "value".to_string()),
    }
}
