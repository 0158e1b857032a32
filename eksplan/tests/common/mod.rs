//! Common test utilities for integration tests.
//!
//! This module provides option fixtures and a recording applier for testing
//! the eksplan library.

use eksplan::config::{ComputePoolSpec, OptionMap};
use eksplan::external::{Applier, Handle};
use eksplan::graph::{
    ControllerSpec, IngressGatewaySpec, MeshSpec, NamespaceSpec, RepositorySpec,
    ServiceAccountSpec,
};
use eksplan::{Error, Plan, PlanOutcome, Planner, ResourceId, Result};

/// Options every valid plan needs.
pub const BASE_OPTIONS: [(&str, &str); 5] = [
    ("EksClusterName", "prod"),
    ("KubectlRoleName", "eks-admin"),
    ("Region", "eu-west-1"),
    ("VpcId", "vpc-0abc"),
    ("OnDemandInstanceCount", "1"),
];

/// Base options overlaid with `pairs`.
#[allow(dead_code)]
pub fn options(pairs: &[(&str, &str)]) -> OptionMap {
    let mut options: OptionMap = BASE_OPTIONS.into_iter().collect();
    for (key, value) in pairs {
        options.insert(*key, *value);
    }
    options
}

/// Plans `pairs` over the base options and expects a valid plan.
#[allow(dead_code)]
pub fn valid_plan(pairs: &[(&str, &str)]) -> Plan {
    match Planner::new().plan(&options(pairs)).unwrap() {
        PlanOutcome::Valid(plan) => plan,
        other => panic!("expected a valid plan, got {other:?}"),
    }
}

/// Ids of a plan's nodes, sorted.
#[allow(dead_code)]
pub fn node_ids(plan: &Plan) -> Vec<String> {
    plan.graph.nodes().map(|n| n.id.to_string()).collect()
}

/// Whether the plan has an edge `from` (prerequisite) → `to` (dependent).
#[allow(dead_code)]
pub fn has_edge(plan: &Plan, from: &str, to: &str) -> bool {
    plan.graph
        .edges()
        .any(|e| e.from.as_str() == from && e.to.as_str() == to)
}

/// Applier that records every call and can fail on one resource.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingApplier {
    /// `(id, dependency handles)` in call order.
    pub calls: Vec<(String, Vec<String>)>,
    /// Id of the resource to fail on.
    pub fail_on: Option<String>,
}

#[allow(dead_code)]
impl RecordingApplier {
    /// An applier failing when asked to create `id`.
    pub fn failing_on(id: &str) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(id.to_string()),
        }
    }

    /// Ids in call order.
    pub fn applied(&self) -> Vec<&str> {
        self.calls.iter().map(|(id, _)| id.as_str()).collect()
    }

    fn record(&mut self, id: ResourceId, dependencies: &[Handle]) -> Result<Handle> {
        let id = id.to_string();
        if self.fail_on.as_deref() == Some(id.as_str()) {
            return Err(Error::collaborator("test applier", format!("refusing {id}")));
        }
        let dependencies = dependencies.iter().map(ToString::to_string).collect();
        self.calls.push((id.clone(), dependencies));
        Ok(Handle::new(format!("handle:{id}")))
    }
}

impl Applier for RecordingApplier {
    fn create_namespace(&mut self, spec: &NamespaceSpec, deps: &[Handle]) -> Result<Handle> {
        self.record(ResourceId::namespace(&spec.name), deps)
    }

    fn create_service_account(
        &mut self,
        spec: &ServiceAccountSpec,
        deps: &[Handle],
    ) -> Result<Handle> {
        self.record(ResourceId::service_account(&spec.namespace, &spec.name), deps)
    }

    fn install_chart(&mut self, spec: &ControllerSpec, deps: &[Handle]) -> Result<Handle> {
        self.record(ResourceId::controller(spec.kind.name()), deps)
    }

    fn create_mesh(&mut self, spec: &MeshSpec, deps: &[Handle]) -> Result<Handle> {
        self.record(ResourceId::mesh(&spec.name), deps)
    }

    fn create_ingress_gateway(
        &mut self,
        spec: &IngressGatewaySpec,
        deps: &[Handle],
    ) -> Result<Handle> {
        self.record(ResourceId::ingress_gateway(&spec.name), deps)
    }

    fn create_node_pool(&mut self, spec: &ComputePoolSpec, deps: &[Handle]) -> Result<Handle> {
        self.record(ResourceId::node_pool(spec.variant), deps)
    }

    fn create_repository(&mut self, spec: &RepositorySpec, deps: &[Handle]) -> Result<Handle> {
        self.record(ResourceId::repository(&spec.name), deps)
    }
}
