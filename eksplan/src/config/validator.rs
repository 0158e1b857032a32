//! Cross-field validation of a resolved configuration.
//!
//! The engine evaluates every rule against a [`ClusterConfig`] and returns
//! the full list of violations, so a user sees every problem in one run.
//! Nothing is built and no collaborator is called when this list is not
//! empty.

use crate::config::options::names;
use crate::config::schema::{is_standard_namespace, ClusterConfig, MAX_FARGATE_NAMESPACES};
use crate::error::{Error, Result, Violation};
use crate::graph::resource::ControllerKind;
use std::collections::BTreeSet;

/// Longest cluster name EKS accepts.
const MAX_CLUSTER_NAME_LEN: usize = 100;

/// Longest DNS-1123 label.
const MAX_DNS_LABEL_LEN: usize = 63;

/// Longest DNS-1123 subdomain.
const MAX_DNS_SUBDOMAIN_LEN: usize = 253;

/// Longest Kubernetes label value.
const MAX_LABEL_VALUE_LEN: usize = 63;

/// Container registry repository name length bounds.
const REPOSITORY_NAME_LEN: std::ops::RangeInclusive<usize> = 2..=256;

/// Validates cluster configurations.
///
/// # Examples
///
/// ```
/// use eksplan::config::{ConfigResolver, OptionMap, ValidationEngine};
///
/// let options: OptionMap = [
///     ("EksClusterName", "prod"),
///     ("AddIngressGatewayToNs", "false"),
///     ("SkipAppMeshControllerInstallation", "true"),
///     ("SkipCreatingAppMesh", "true"),
/// ]
/// .into_iter()
/// .collect();
/// let config = ConfigResolver::resolve(&options).unwrap();
/// assert!(ValidationEngine::validate(&config).is_empty());
/// ```
pub struct ValidationEngine;

impl ValidationEngine {
    /// Evaluate every rule and return all violations, in rule order.
    #[must_use]
    pub fn validate(config: &ClusterConfig) -> Vec<Violation> {
        let mut violations = Vec::new();

        Self::check_cluster_name(config, &mut violations);
        Self::check_kubernetes_version(config, &mut violations);
        Self::check_required_references(config, &mut violations);
        Self::check_compute(config, &mut violations);
        Self::check_namespace_names(config, &mut violations);
        violations.extend(Self::namespace_violations(config));
        Self::check_mesh_name(config, &mut violations);
        Self::check_envoy_service_account(config, &mut violations);
        Self::check_gateway_name(config, &mut violations);
        Self::check_repositories(config, &mut violations);

        violations
    }

    /// Validate and fail with every violation at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when any rule is violated.
    pub fn check(config: &ClusterConfig) -> Result<()> {
        let violations = Self::validate(config);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { violations })
        }
    }

    /// Violations about which namespaces the plan may touch.
    ///
    /// Covers creating a standard namespace and operating on a namespace a
    /// Fargate-only cluster cannot schedule into. The graph builder runs the
    /// same check before emitting any namespace node.
    #[must_use]
    pub fn namespace_violations(config: &ClusterConfig) -> Vec<Violation> {
        let mut violations = Vec::new();

        let namespace = config.effective_namespace();
        if config.creates_meshed_namespace() && is_standard_namespace(namespace) {
            violations.push(Violation::validation(
                names::MESHED_NAMESPACE,
                format!(
                    "standard namespace '{namespace}' cannot be created; \
                     set {} to use it as is",
                    names::SKIP_CREATING_NAMESPACE
                ),
            ));
        }

        if config.is_fargate_only() {
            for ns in config.namespaces_operated_on() {
                if !config.runs_on_fargate(ns) {
                    violations.push(Violation::validation(
                        names::FARGATE_NAMESPACES,
                        format!("Fargate-only cluster cannot operate on namespace {ns}"),
                    ));
                }
            }
        }

        violations
    }

    fn check_cluster_name(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        if !is_valid_cluster_name(&config.cluster_name) {
            violations.push(Violation::validation(
                names::EKS_CLUSTER_NAME,
                format!(
                    "'{}' must be 1-{MAX_CLUSTER_NAME_LEN} characters, start with a letter or digit, \
                     and contain only letters, digits, '-' and '_'",
                    config.cluster_name
                ),
            ));
        }
    }

    fn check_kubernetes_version(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        if !is_valid_kubernetes_version(&config.kubernetes_version) {
            violations.push(Violation::validation(
                names::K8S_VERSION,
                format!(
                    "'{}' is not of the form <major>.<minor>",
                    config.kubernetes_version
                ),
            ));
        }
    }

    fn check_required_references(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        if config.lb_controller.enabled && config.vpc_id.is_none() {
            violations.push(Violation::validation(
                names::VPC_ID,
                "required when installing the load balancer controller",
            ));
        }

        if config.installs_any_controller() && config.region.is_none() {
            violations.push(Violation::validation(
                names::REGION,
                "required when installing a controller",
            ));
        }

        if config.plans_cluster_side_resources() && config.kubectl_role_name.is_none() {
            violations.push(Violation::validation(
                names::KUBECTL_ROLE_NAME,
                "required when planning resources inside the cluster",
            ));
        }
    }

    fn check_compute(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        if !config.requests_nothing() && config.compute_pools().is_empty() {
            violations.push(Violation::validation(
                "compute",
                format!(
                    "at least one compute pool is required; set {}, {}, {} or {}",
                    names::ON_DEMAND_INSTANCE_COUNT,
                    names::SPOT_INSTANCE_COUNT,
                    names::GRAVITON_INSTANCE_COUNT,
                    names::FARGATE_NAMESPACES
                ),
            ));
        }

        if config.spot.count > 0 && config.spot.instance_types.is_empty() {
            violations.push(Violation::validation(
                names::SPOT_INSTANCE_TYPES,
                format!("required when {} is positive", names::SPOT_INSTANCE_COUNT),
            ));
        }

        let single_type = [
            (&config.on_demand, names::ON_DEMAND_INSTANCE_TYPE, names::ON_DEMAND_INSTANCE_COUNT),
            (&config.graviton, names::GRAVITON_INSTANCE_TYPE, names::GRAVITON_INSTANCE_COUNT),
        ];
        for (settings, type_option, count_option) in single_type {
            let missing = settings.instance_types.iter().all(|t| t.trim().is_empty());
            if settings.count > 0 && missing {
                violations.push(Violation::validation(
                    type_option,
                    format!("required when {count_option} is positive"),
                ));
            }
        }

        if config.fargate_namespaces.len() > MAX_FARGATE_NAMESPACES {
            violations.push(Violation::validation(
                names::FARGATE_NAMESPACES,
                format!(
                    "at most {MAX_FARGATE_NAMESPACES} namespaces are supported, got {}",
                    config.fargate_namespaces.len()
                ),
            ));
        }
    }

    fn check_namespace_names(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        let mut candidates: Vec<(&str, &str)> = Vec::new();
        if config.meshing_requested() {
            candidates.push((names::MESHED_NAMESPACE, config.effective_namespace()));
        }
        if config.lb_controller.enabled {
            candidates.push((names::LB_CONTROLLER_NAMESPACE, &config.lb_controller.namespace));
        }
        if config.mesh_controller.enabled {
            candidates.push((
                names::APP_MESH_CONTROLLER_NAMESPACE,
                &config.mesh_controller.namespace,
            ));
        }
        for ns in &config.fargate_namespaces {
            candidates.push((names::FARGATE_NAMESPACES, ns));
        }

        for (option, ns) in candidates {
            if !is_dns_label(ns) {
                violations.push(Violation::validation(
                    option,
                    format!("namespace '{ns}' is not a valid DNS-1123 label"),
                ));
            }
        }
    }

    // The mesh name is both a resource name and the value of the namespace's mesh label.
    fn check_mesh_name(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        let used = config.create_mesh || config.creates_meshed_namespace();
        if used && !is_label_value(&config.mesh_name) {
            violations.push(Violation::validation(
                names::APP_MESH_NAME,
                format!(
                    "'{}' must be 1-{MAX_LABEL_VALUE_LEN} letters, digits, '-', '_' or '.', \
                     starting and ending with a letter or digit",
                    config.mesh_name
                ),
            ));
        }
    }

    fn check_envoy_service_account(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        if !config.meshing_requested() {
            return;
        }

        let name = config.envoy_service_account_name.as_str();
        if !is_dns_subdomain(name) {
            violations.push(Violation::validation(
                names::ENVOY_SERVICE_ACCOUNT_NAME,
                format!("'{name}' is not a valid DNS-1123 subdomain"),
            ));
            return;
        }

        let namespace = config.effective_namespace();
        let controllers = [
            (ControllerKind::LoadBalancerController, &config.lb_controller),
            (ControllerKind::MeshController, &config.mesh_controller),
        ];
        for (kind, settings) in controllers {
            if settings.enabled
                && settings.namespace == namespace
                && kind.service_account_name() == name
            {
                violations.push(Violation::validation(
                    names::ENVOY_SERVICE_ACCOUNT_NAME,
                    format!(
                        "service account {namespace}/{name} is already used by {}",
                        kind.name()
                    ),
                ));
            }
        }
    }

    fn check_gateway_name(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        if let Some(name) = &config.ingress_gateway_name {
            if !is_dns_label(name) {
                violations.push(Violation::validation(
                    names::INGRESS_GATEWAY_NAME,
                    format!("'{name}' is not a valid DNS-1123 label"),
                ));
            }
            return;
        }

        let derived = config.gateway_name();
        if config.add_ingress_gateway && !is_dns_label(&derived) {
            violations.push(Violation::validation(
                names::INGRESS_GATEWAY_NAME,
                format!(
                    "derived name '{derived}' is not a valid DNS-1123 label; \
                     set {} explicitly",
                    names::INGRESS_GATEWAY_NAME
                ),
            ));
        }
    }

    fn check_repositories(config: &ClusterConfig, violations: &mut Vec<Violation>) {
        let mut seen = BTreeSet::new();
        for name in &config.ecr_repo_names {
            if !seen.insert(name.as_str()) {
                violations.push(Violation::validation(
                    names::ECR_REPO_NAMES,
                    format!("repository '{name}' is listed more than once"),
                ));
            } else if !is_valid_repository_name(name) {
                violations.push(Violation::validation(
                    names::ECR_REPO_NAMES,
                    format!("'{name}' is not a valid repository name"),
                ));
            }
        }
    }
}

/// Whether a name is a DNS-1123 label: 1-63 lowercase alphanumerics or `-`,
/// starting and ending with an alphanumeric.
///
/// # Examples
///
/// ```
/// use eksplan::config::is_dns_label;
///
/// assert!(is_dns_label("appmesh-system"));
/// assert!(!is_dns_label("App"));
/// assert!(!is_dns_label("-edge"));
/// ```
#[must_use]
pub fn is_dns_label(name: &str) -> bool {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    bytes.len() <= MAX_DNS_LABEL_LEN
        && alnum(first)
        && alnum(last)
        && bytes.iter().all(|b| alnum(b) || *b == b'-')
}

/// Whether a name is a DNS-1123 subdomain: dot-separated DNS-1123 labels,
/// at most 253 characters in total.
#[must_use]
pub fn is_dns_subdomain(name: &str) -> bool {
    name.len() <= MAX_DNS_SUBDOMAIN_LEN && name.split('.').all(is_dns_label)
}

/// Whether a non-empty value may be used as a Kubernetes label value.
#[must_use]
pub fn is_label_value(value: &str) -> bool {
    let bytes = value.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    bytes.len() <= MAX_LABEL_VALUE_LEN
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Whether a cluster name is acceptable to EKS.
#[must_use]
pub fn is_valid_cluster_name(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    name.len() <= MAX_CLUSTER_NAME_LEN
        && first.is_ascii_alphanumeric()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Whether a version string has the form `<major>.<minor>`.
#[must_use]
pub fn is_valid_kubernetes_version(version: &str) -> bool {
    let Some((major, minor)) = version.split_once('.') else {
        return false;
    };
    let numeric = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    numeric(major) && numeric(minor)
}

/// Whether a name matches the container registry repository pattern.
///
/// Repository names are slash-separated components; each component is
/// lowercase alphanumeric runs joined by single `.`, `_` or `-`.
#[must_use]
pub fn is_valid_repository_name(name: &str) -> bool {
    REPOSITORY_NAME_LEN.contains(&name.len()) && name.split('/').all(is_valid_repository_component)
}

fn is_valid_repository_component(component: &str) -> bool {
    let mut previous_was_separator = true;
    for c in component.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            previous_was_separator = false;
        } else if matches!(c, '.' | '_' | '-') {
            if previous_was_separator {
                return false;
            }
            previous_was_separator = true;
        } else {
            return false;
        }
    }
    !previous_was_separator
}
