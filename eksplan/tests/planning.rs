//! Integration tests for plan generation, execution and dry-run mode.
//!
//! This test suite verifies that:
//! - Invalid configurations yield every violation and never a partial graph
//! - Built graphs are acyclic, closed over their edges and deterministic
//! - The mesh scenarios produce exactly the expected nodes and edges
//! - Execution respects dependencies and dry-run mode makes no calls
//! - Collaborator failures surface unchanged

mod common;

use common::{has_edge, node_ids, options, valid_plan, RecordingApplier};
use eksplan::external::{StaticPolicySource, DeploymentOutput};
use eksplan::{
    DependencyScheduler, Error, OptionMap, PlanExecutor, PlanOutcome, Planner, ViolationKind,
};
use std::collections::BTreeMap;

const POLICY_DOCUMENT: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {"Effect": "Allow", "Action": ["elasticloadbalancing:*"], "Resource": "*"}
    ]
}"#;

// =============================================================================
// Missing Or Malformed Options
// =============================================================================

#[test]
fn test_missing_cluster_name_yields_violation_and_no_graph() {
    let mut options = options(&[("MeshedNamespace", "appns")]);
    options.remove("EksClusterName");

    let outcome = Planner::new().plan(&options).unwrap();
    assert!(outcome.plan().is_none());
    let violations = outcome.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::Configuration);
    assert_eq!(violations[0].subject, "EksClusterName");
}

#[test]
fn test_every_malformed_option_is_reported() {
    let outcome = Planner::new()
        .plan(&options(&[
            ("EksClusterName", " "),
            ("OnDemandInstanceCount", "-1"),
            ("GravitonInstanceCount", "1.5"),
        ]))
        .unwrap();

    let subjects: Vec<_> = outcome.violations().iter().map(|v| v.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec!["EksClusterName", "OnDemandInstanceCount", "GravitonInstanceCount"]
    );
}

#[test]
fn test_missing_required_references_are_collected() {
    let mut options = options(&[
        ("MeshedNamespace", "appns"),
        ("SkipLbControllerInstallation", "false"),
    ]);
    options.remove("VpcId");
    options.remove("Region");
    options.remove("KubectlRoleName");

    let outcome = Planner::new().plan(&options).unwrap();
    let subjects: Vec<_> = outcome.violations().iter().map(|v| v.subject.as_str()).collect();
    assert_eq!(subjects, vec!["VpcId", "Region", "KubectlRoleName"]);
    assert!(matches!(outcome.into_result(), Err(Error::Validation { .. })));
}

#[test]
fn test_envoy_account_clashing_with_controller_is_a_violation() {
    let outcome = Planner::new()
        .plan(&options(&[
            ("MeshedNamespace", "appmesh-system"),
            ("EnvoyServiceAccountName", "appmesh-controller"),
        ]))
        .unwrap();

    assert!(outcome.plan().is_none());
    let subjects: Vec<_> = outcome.violations().iter().map(|v| v.subject.as_str()).collect();
    assert_eq!(subjects, vec!["EnvoyServiceAccountName"]);
}

#[test]
fn test_names_that_become_resource_ids_are_validated() {
    let outcome = Planner::new()
        .plan(&options(&[
            ("EksClusterName", "Prod_Cluster"),
            ("MeshedNamespace", "appns"),
            ("EnvoyServiceAccountName", "Envoy Proxy/x"),
            ("AppMeshName", "My Mesh!"),
        ]))
        .unwrap();

    assert!(outcome.plan().is_none());
    let subjects: Vec<_> = outcome.violations().iter().map(|v| v.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec!["AppMeshName", "EnvoyServiceAccountName", "IngressGatewayName"]
    );
}

// =============================================================================
// Namespace Rules
// =============================================================================

#[test]
fn test_creating_standard_namespace_names_it() {
    for namespace in ["default", "kube-system", "kube-public"] {
        let outcome = Planner::new()
            .plan(&options(&[("MeshedNamespace", namespace)]))
            .unwrap();
        let violations = outcome.violations();
        assert_eq!(violations.len(), 1, "{namespace}");
        assert!(violations[0].message.contains(&format!("'{namespace}'")));
    }
}

#[test]
fn test_standard_namespace_allowed_when_not_created() {
    let plan = valid_plan(&[
        ("MeshedNamespace", "default"),
        ("SkipCreatingNamespace", "true"),
    ]);
    let ids = node_ids(&plan);
    assert!(!ids.contains(&"namespace/default".to_string()));
    assert!(ids.contains(&"service-account/default/envoy-proxy".to_string()));
}

#[test]
fn test_fargate_only_cluster_rejects_unscheduled_namespace() {
    let outcome = Planner::new()
        .plan(&options(&[
            ("OnDemandInstanceCount", "0"),
            ("MeshedNamespace", "appns"),
            ("FargateNamespaces", "appns"),
        ]))
        .unwrap();
    let messages: Vec<_> = outcome.violations().iter().map(|v| v.message.clone()).collect();
    assert_eq!(
        messages,
        vec!["Fargate-only cluster cannot operate on namespace appmesh-system"]
    );
}

#[test]
fn test_fargate_only_cluster_with_every_namespace_scheduled() {
    let plan = valid_plan(&[
        ("OnDemandInstanceCount", "0"),
        ("MeshedNamespace", "appns"),
        ("FargateNamespaces", "appns;appmesh-system"),
    ]);
    assert!(node_ids(&plan).contains(&"node-pool/fargate".to_string()));
    assert!(!node_ids(&plan).contains(&"node-pool/on-demand".to_string()));
}

#[test]
fn test_no_compute_is_fatal_when_something_is_requested() {
    let outcome = Planner::new()
        .plan(&options(&[
            ("OnDemandInstanceCount", "0"),
            ("MeshedNamespace", "appns"),
        ]))
        .unwrap();
    assert_eq!(outcome.violations()[0].subject, "compute");
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_do_nothing_yields_empty_outcome() {
    let mut options = options(&[
        ("AddIngressGatewayToNs", "false"),
        ("SkipAppMeshControllerInstallation", "true"),
        ("SkipCreatingAppMesh", "true"),
        ("OnDemandInstanceCount", "0"),
    ]);
    options.remove("MeshedNamespace");

    let outcome = Planner::new().plan(&options).unwrap();
    assert!(outcome.is_empty());
    assert!(outcome.violations().is_empty());
}

#[test]
fn test_full_mesh_scenario() {
    let plan = valid_plan(&[("MeshedNamespace", "appns")]);

    assert_eq!(
        node_ids(&plan),
        vec![
            "controller/appmesh-controller",
            "ingress-gateway/ingressgw-prod-appns",
            "mesh/prod-mesh",
            "namespace/appmesh-system",
            "namespace/appns",
            "node-pool/on-demand",
            "service-account/appmesh-system/appmesh-controller",
            "service-account/appns/envoy-proxy",
        ]
    );

    let gateway = "ingress-gateway/ingressgw-prod-appns";
    assert!(has_edge(&plan, "namespace/appns", "service-account/appns/envoy-proxy"));
    assert!(has_edge(&plan, "controller/appmesh-controller", "mesh/prod-mesh"));
    assert!(has_edge(&plan, "service-account/appns/envoy-proxy", gateway));
    assert!(has_edge(&plan, "mesh/prod-mesh", gateway));
    assert!(has_edge(&plan, "controller/appmesh-controller", gateway));
    assert_eq!(plan.graph.edge_count(), 7);
}

#[test]
fn test_mesh_skipped_scenario() {
    let plan = valid_plan(&[("MeshedNamespace", "appns"), ("SkipCreatingAppMesh", "true")]);
    let gateway = "ingress-gateway/ingressgw-prod-appns";

    assert!(!node_ids(&plan).iter().any(|id| id.starts_with("mesh/")));
    let prerequisites: Vec<_> = plan
        .graph
        .edges()
        .filter(|e| e.to.as_str() == gateway)
        .map(|e| e.from.to_string())
        .collect();
    assert_eq!(
        prerequisites,
        vec!["controller/appmesh-controller", "service-account/appns/envoy-proxy"]
    );
}

#[test]
fn test_lb_controller_scenario() {
    let source = StaticPolicySource::new(POLICY_DOCUMENT);
    let outcome = Planner::new()
        .with_policy_source(&source)
        .plan(&options(&[
            ("MeshedNamespace", "appns"),
            ("SkipLbControllerInstallation", "false"),
        ]))
        .unwrap();
    let plan = outcome.plan().unwrap();

    let lb = "controller/aws-load-balancer-controller";
    assert!(has_edge(plan, "service-account/kube-system/aws-lb-controller", lb));
    assert!(has_edge(plan, lb, "ingress-gateway/ingressgw-prod-appns"));
    assert!(!node_ids(plan).contains(&"namespace/kube-system".to_string()));
    assert_eq!(plan.warnings, vec!["namespace 'kube-system' is assumed to exist"]);
}

#[test]
fn test_replanning_is_deterministic() {
    let options = options(&[
        ("MeshedNamespace", "appns"),
        ("SpotInstanceCount", "2"),
        ("SpotInstanceTypes", "m5.large,m5a.large"),
        ("EcrRepoNames", "web,api"),
    ]);
    let first = Planner::new().plan(&options).unwrap();
    let second = Planner::new().plan(&options).unwrap();
    assert_eq!(first.plan().unwrap().graph, second.plan().unwrap().graph);
    assert_eq!(first.plan().unwrap().steps(), second.plan().unwrap().steps());
}

#[test]
fn test_built_graph_is_acyclic_and_closed() {
    let plan = valid_plan(&[
        ("MeshedNamespace", "appns"),
        ("GravitonInstanceCount", "1"),
        ("EcrRepoNames", "web"),
    ]);
    for edge in plan.graph.edges() {
        assert!(plan.graph.contains(&edge.from));
        assert!(plan.graph.contains(&edge.to));
    }
    let order = DependencyScheduler::new(&plan.graph).topological_order();
    assert_eq!(order.len(), plan.len());
}

// =============================================================================
// Execution
// =============================================================================

#[test]
fn test_execution_follows_dependencies() {
    let plan = valid_plan(&[("MeshedNamespace", "appns"), ("EcrRepoNames", "web")]);
    let mut applier = RecordingApplier::default();
    let result = PlanExecutor::new(&mut applier).execute(&plan).unwrap();

    assert_eq!(result.handles.len(), plan.len());
    let position: BTreeMap<_, _> = applier
        .applied()
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id.to_string(), i))
        .collect();
    for edge in plan.graph.edges() {
        assert!(position[edge.from.as_str()] < position[edge.to.as_str()]);
    }
}

#[test]
fn test_dependency_handles_are_threaded() {
    let plan = valid_plan(&[("MeshedNamespace", "appns")]);
    let mut applier = RecordingApplier::default();
    PlanExecutor::new(&mut applier).execute(&plan).unwrap();

    let (_, dependencies) = applier
        .calls
        .iter()
        .find(|(id, _)| id == "mesh/prod-mesh")
        .unwrap();
    assert_eq!(dependencies, &vec!["handle:controller/appmesh-controller".to_string()]);
}

#[test]
fn test_dry_run_creates_nothing() {
    let plan = valid_plan(&[("MeshedNamespace", "appns")]);
    let mut applier = RecordingApplier::default();
    let result = PlanExecutor::new(&mut applier).dry_run().execute(&plan).unwrap();

    assert!(result.dry_run);
    assert!(applier.calls.is_empty());
    assert_eq!(result.actions_taken[0], "Create namespace appmesh-system");
}

#[test]
fn test_applier_failure_propagates_unchanged() {
    let plan = valid_plan(&[("MeshedNamespace", "appns")]);
    let mut applier = RecordingApplier::failing_on("mesh/prod-mesh");
    let mut sink: Vec<DeploymentOutput> = Vec::new();

    let err = PlanExecutor::new(&mut applier)
        .execute_and_publish(&plan, &mut sink)
        .unwrap_err();
    match err {
        Error::Collaborator { collaborator, message, .. } => {
            assert_eq!(collaborator, "test applier");
            assert_eq!(message, "refusing mesh/prod-mesh");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.is_empty());
    assert!(!applier.applied().contains(&"ingress-gateway/ingressgw-prod-appns"));
}

#[test]
fn test_policy_source_failure_builds_nothing() {
    let source = StaticPolicySource::new("{}");
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
fn test_outputs_follow_plan() {
    let plan = valid_plan(&[
        ("MeshedNamespace", "appns"),
        ("Account", "123456789012"),
        ("EcrRepoNames", "web"),
    ]);
    let outputs: BTreeMap<_, _> = plan
        .outputs
        .iter()
        .map(|o| (o.key.as_str(), o.value.as_str()))
        .collect();
    assert_eq!(outputs["EnvoyServiceAccount"], "envoy-proxy");
    assert_eq!(outputs["IngressGatewayName"], "ingressgw-prod-appns");
    assert_eq!(outputs["AppMeshName"], "prod-mesh");
    assert!(outputs["Docker-Login-For-ECR"].contains("--region eu-west-1"));
}

#[test]
fn test_empty_option_map_is_invalid() {
    let outcome = Planner::new().plan(&OptionMap::new()).unwrap();
    assert!(matches!(outcome, PlanOutcome::Invalid { .. }));
}
