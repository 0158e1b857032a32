//! Planning: raw options in, a validated resource graph out.
//!
//! The [`Planner`] runs the whole pipeline: resolve, validate, fetch the
//! load balancer controller's policy statements when needed, build the
//! graph, and collect the outputs. Nothing outside the policy fetch has a
//! side effect.

use crate::config::{ClusterConfig, ConfigResolver, OptionMap, ValidationEngine};
use crate::error::{Error, Result, Violation};
use crate::external::{collect_outputs, fetch_statements, DeploymentOutput, PolicyDocumentSource, POLICY_SOURCE};
use crate::graph::{
    DependencyScheduler, NodePayload, ResourceGraph, ResourceGraphBuilder, ResourceId,
    ResourceKind, ResourceNode,
};
use crate::config::schema::is_standard_namespace;
use serde::Serialize;

/// Describes what applying a node does.
///
/// # Examples
///
/// ```
/// use eksplan::graph::{MeshSpec, NodePayload, ResourceNode};
/// use eksplan::operations::describe_node;
///
/// let node = ResourceNode::new(NodePayload::Mesh(MeshSpec { name: "prod-mesh".to_string() }));
/// assert_eq!(describe_node(&node), "Create mesh prod-mesh");
/// ```
#[must_use]
pub fn describe_node(node: &ResourceNode) -> String {
    match &node.payload {
        NodePayload::Namespace(ns) => format!("Create namespace {}", ns.name),
        NodePayload::ServiceAccount(sa) => {
            format!("Create service account {} in {}", sa.name, sa.namespace)
        }
        NodePayload::Controller(c) => format!(
            "Install chart {} (release {}) into {}",
            c.chart.chart, c.chart.release, c.namespace
        ),
        NodePayload::Mesh(m) => format!("Create mesh {}", m.name),
        NodePayload::IngressGateway(g) => {
            format!("Create ingress gateway {} in {}", g.name, g.namespace)
        }
        NodePayload::NodePool(p) if p.instance_types.is_empty() => format!(
            "Create {} profile for {}",
            p.variant,
            p.namespaces.join(", ")
        ),
        NodePayload::NodePool(p) => format!(
            "Create {} node pool of {} x {}",
            p.variant,
            p.min_size,
            p.instance_types.join("/")
        ),
        NodePayload::Repository(r) => format!("Create repository {}", r.name),
    }
}

/// One node of a plan, in apply order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    /// The node's id.
    pub id: ResourceId,
    /// The node's kind.
    pub kind: ResourceKind,
    /// What applying the node does.
    pub description: String,
    /// Direct prerequisites.
    pub depends_on: Vec<ResourceId>,
}

/// A validated plan.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Name of the plan (the stack name).
    pub name: String,
    /// The configuration the plan was built from.
    pub config: ClusterConfig,
    /// What to create and in which order.
    pub graph: ResourceGraph,
    /// Values reported once the plan is applied.
    pub outputs: Vec<DeploymentOutput>,
    /// Warnings to communicate to the user.
    pub warnings: Vec<String>,
}

impl Plan {
    /// Every node in topological order with its description.
    #[must_use]
    pub fn steps(&self) -> Vec<PlanStep> {
        DependencyScheduler::new(&self.graph)
            .topological_order()
            .into_iter()
            .filter_map(|id| self.graph.node(id))
            .map(|node| PlanStep {
                id: node.id.clone(),
                kind: node.kind(),
                description: describe_node(node),
                depends_on: self.graph.dependencies_of(&node.id).cloned().collect(),
            })
            .collect()
    }

    /// Number of resources in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the plan creates nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

/// The three ways a planning run ends without a collaborator failure.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum PlanOutcome {
    /// The configuration requests nothing.
    Empty {
        /// Configuration warnings.
        warnings: Vec<String>,
    },
    /// A plan ready to apply.
    Valid(Plan),
    /// The configuration is invalid; nothing was built.
    Invalid {
        /// Every problem found.
        violations: Vec<Violation>,
    },
}

impl PlanOutcome {
    /// The plan, if the outcome is valid.
    #[must_use]
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            Self::Valid(plan) => Some(plan),
            _ => None,
        }
    }

    /// The violations, if the outcome is invalid.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid { violations } => violations,
            _ => &[],
        }
    }

    /// Whether the configuration requests nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Converts an invalid outcome into an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when any violation came from option
    /// resolution, [`Error::Validation`] otherwise.
    pub fn into_result(self) -> Result<Option<Plan>> {
        match self {
            Self::Empty { .. } => Ok(None),
            Self::Valid(plan) => Ok(Some(plan)),
            Self::Invalid { violations } => {
                let configuration = violations
                    .iter()
                    .any(|v| v.kind == crate::error::ViolationKind::Configuration);
                if configuration {
                    Err(Error::Configuration { violations })
                } else {
                    Err(Error::Validation { violations })
                }
            }
        }
    }
}

/// Plans cluster add-ons.
///
/// # Examples
///
/// ```
/// use eksplan::config::OptionMap;
/// use eksplan::operations::{PlanOutcome, Planner};
///
/// let options: OptionMap = [
///     ("EksClusterName", "prod"),
///     ("KubectlRoleName", "eks-admin"),
///     ("Region", "eu-west-1"),
///     ("MeshedNamespace", "appns"),
///     ("OnDemandInstanceCount", "2"),
/// ]
/// .into_iter()
/// .collect();
///
/// let outcome = Planner::new().plan(&options).unwrap();
/// let plan = outcome.plan().unwrap();
/// assert_eq!(plan.name, "EksPlan--prod--appns");
/// assert_eq!(plan.steps().len(), plan.len());
///
/// let missing_name = Planner::new().plan(&OptionMap::new()).unwrap();
/// assert_eq!(missing_name.violations().len(), 1);
/// ```
#[derive(Default)]
pub struct Planner<'a> {
    policy_source: Option<&'a dyn PolicyDocumentSource>,
}

impl<'a> Planner<'a> {
    /// Creates a planner without a policy document source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets where the load balancer controller's policy document comes from.
    #[must_use]
    pub fn with_policy_source(mut self, source: &'a dyn PolicyDocumentSource) -> Self {
        self.policy_source = Some(source);
        self
    }

    /// Plans from raw options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Collaborator`] when the policy document cannot be
    /// fetched, and [`Error::InvalidGraph`] if graph construction breaks an
    /// invariant. Invalid configurations are reported as
    /// [`PlanOutcome::Invalid`], not as errors.
    pub fn plan(&self, options: &OptionMap) -> Result<PlanOutcome> {
        let config = match ConfigResolver::resolve(options) {
            Ok(config) => config,
            Err(Error::Configuration { violations }) => {
                return Ok(PlanOutcome::Invalid { violations });
            }
            Err(e) => return Err(e),
        };

        let mut warnings: Vec<String> = ConfigResolver::unknown_options(options)
            .into_iter()
            .map(|name| format!("ignoring unrecognized option '{name}'"))
            .collect();
        warnings.extend(Self::assumed_namespace_warnings(&config));

        self.plan_config(config, warnings)
    }

    /// Plans from an already resolved configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Planner::plan`].
    pub fn plan_config(&self, config: ClusterConfig, warnings: Vec<String>) -> Result<PlanOutcome> {
        let violations = ValidationEngine::validate(&config);
        if !violations.is_empty() {
            log::debug!("configuration has {} violation(s)", violations.len());
            return Ok(PlanOutcome::Invalid { violations });
        }

        if config.requests_nothing() {
            log::info!("nothing to plan for cluster '{}'", config.cluster_name);
            return Ok(PlanOutcome::Empty { warnings });
        }

        let statements = if config.lb_controller.enabled {
            let source = self.policy_source.ok_or_else(|| {
                Error::collaborator(
                    POLICY_SOURCE,
                    format!(
                        "no source configured for {}",
                        config.lb_controller_policy_url
                    ),
                )
            })?;
            fetch_statements(source, &config.lb_controller_policy_url)?
        } else {
            Vec::new()
        };

        let graph = match ResourceGraphBuilder::new(&config)
            .with_lb_policy_statements(statements)
            .build()
        {
            Ok(graph) => graph,
            Err(Error::Validation { violations }) => {
                return Ok(PlanOutcome::Invalid { violations });
            }
            Err(e) => return Err(e),
        };

        let outputs = collect_outputs(&config, &graph);
        Ok(PlanOutcome::Valid(Plan {
            name: config.plan_name(),
            config,
            graph,
            outputs,
            warnings,
        }))
    }

    fn assumed_namespace_warnings(config: &ClusterConfig) -> Vec<String> {
        [&config.lb_controller, &config.mesh_controller]
            .into_iter()
            .filter(|settings| settings.enabled && is_standard_namespace(&settings.namespace))
            .map(|settings| format!("namespace '{}' is assumed to exist", settings.namespace))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::StaticPolicySource;

    fn options(pairs: &[(&str, &str)]) -> OptionMap {
        let mut options: OptionMap = [
            ("EksClusterName", "prod"),
            ("KubectlRoleName", "eks-admin"),
            ("Region", "eu-west-1"),
            ("VpcId", "vpc-123"),
            ("OnDemandInstanceCount", "1"),
        ]
        .into_iter()
        .collect();
        for (k, v) in pairs {
            options.insert(*k, *v);
        }
        options
    }

    #[test]
    fn test_nothing_requested_is_empty_outcome() {
        let outcome = Planner::new()
            .plan(&options(&[
                ("OnDemandInstanceCount", "0"),
                ("AddIngressGatewayToNs", "false"),
                ("SkipAppMeshControllerInstallation", "true"),
                ("SkipCreatingAppMesh", "true"),
            ]))
            .unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.into_result().unwrap().is_none());
    }

    #[test]
    fn test_invalid_configuration_builds_nothing() {
        let outcome = Planner::new()
            .plan(&options(&[("SpotInstanceCount", "many")]))
            .unwrap();
        assert!(outcome.plan().is_none());
        assert_eq!(outcome.violations()[0].subject, "SpotInstanceCount");
        assert!(matches!(
            outcome.into_result(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_validation_failure_is_invalid_outcome() {
        let outcome = Planner::new().plan(&options(&[])).unwrap();
        assert_eq!(outcome.violations().len(), 1);
        assert!(outcome.violations()[0].message.contains("'default'"));
        assert!(matches!(outcome.into_result(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_lb_controller_without_policy_source_fails() {
        let err = Planner::new()
            .plan(&options(&[
                ("MeshedNamespace", "appns"),
                ("SkipLbControllerInstallation", "false"),
            ]))
            .unwrap_err();
        assert!(err.is_collaborator());
    }

    #[test]
    fn test_lb_controller_with_policy_source() {
        let source = StaticPolicySource::new(r#"{"Statement": [{"Effect": "Allow"}]}"#);
        let outcome = Planner::new()
            .with_policy_source(&source)
            .plan(&options(&[
                ("MeshedNamespace", "appns"),
                ("SkipLbControllerInstallation", "false"),
            ]))
            .unwrap();
        let plan = outcome.plan().unwrap();
        assert!(plan
            .graph
            .contains(&ResourceId::controller("aws-load-balancer-controller")));
        assert_eq!(plan.warnings, vec!["namespace 'kube-system' is assumed to exist"]);
    }

    #[test]
    fn test_broken_policy_document_is_collaborator_error() {
        let source = StaticPolicySource::new("not json");
        let err = Planner::new()
            .with_policy_source(&source)
            .plan(&options(&[
                ("MeshedNamespace", "appns"),
                ("SkipLbControllerInstallation", "false"),
            ]))
            .unwrap_err();
        assert!(err.is_collaborator());
    }

    #[test]
    fn test_unknown_options_become_warnings() {
        let outcome = Planner::new()
            .plan(&options(&[("MeshedNamespace", "appns"), ("MeshName", "x")]))
            .unwrap();
        let plan = outcome.plan().unwrap();
        assert_eq!(plan.warnings, vec!["ignoring unrecognized option 'MeshName'"]);
    }

    #[test]
    fn test_steps_follow_dependencies() {
        let outcome = Planner::new()
            .plan(&options(&[("MeshedNamespace", "appns")]))
            .unwrap();
        let steps = outcome.plan().unwrap().steps();
        let position = |id: &str| steps.iter().position(|s| s.id.as_str() == id).unwrap();
        assert!(position("namespace/appns") < position("service-account/appns/envoy-proxy"));
        assert!(position("mesh/prod-mesh") < position("ingress-gateway/ingressgw-prod-appns"));

        let gateway = &steps[position("ingress-gateway/ingressgw-prod-appns")];
        assert_eq!(gateway.depends_on.len(), 3);
        assert_eq!(
            gateway.description,
            "Create ingress gateway ingressgw-prod-appns in appns"
        );
    }

    #[test]
    fn test_describe_node_pools() {
        let outcome = Planner::new()
            .plan(&options(&[
                ("MeshedNamespace", "appns"),
                ("FargateNamespaces", "appns,appmesh-system"),
            ]))
            .unwrap();
        let descriptions: Vec<_> = outcome
            .plan()
            .unwrap()
            .steps()
            .into_iter()
            .filter(|s| s.kind == ResourceKind::NodePool)
            .map(|s| s.description)
            .collect();
        assert_eq!(
            descriptions,
            vec![
                "Create fargate profile for appns, appmesh-system",
                "Create on-demand node pool of 1 x t3a.small",
            ]
        );
    }
}
