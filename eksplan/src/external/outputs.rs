//! Values a deployment reports back once applied.

use crate::config::ClusterConfig;
use crate::error::Result;
use crate::graph::{ResourceGraph, ResourceId, ResourceKind};
use serde::Serialize;

/// One reported value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentOutput {
    /// Output name.
    pub key: String,
    /// What the value is.
    pub description: String,
    /// The value.
    pub value: String,
}

impl DeploymentOutput {
    fn new(key: &str, description: &str, value: String) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            value,
        }
    }
}

/// Receives deployment outputs.
pub trait OutputSink {
    /// Accepts one output.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot record the output.
    fn emit(&mut self, output: &DeploymentOutput) -> Result<()>;
}

impl OutputSink for Vec<DeploymentOutput> {
    fn emit(&mut self, output: &DeploymentOutput) -> Result<()> {
        self.push(output.clone());
        Ok(())
    }
}

/// The outputs of a planned graph.
///
/// # Examples
///
/// ```
/// use eksplan::config::{ConfigResolver, OptionMap};
/// use eksplan::external::collect_outputs;
/// use eksplan::graph::ResourceGraphBuilder;
///
/// let options: OptionMap = [
///     ("EksClusterName", "prod"),
///     ("MeshedNamespace", "appns"),
///     ("OnDemandInstanceCount", "1"),
/// ]
/// .into_iter()
/// .collect();
/// let config = ConfigResolver::resolve(&options).unwrap();
/// let graph = ResourceGraphBuilder::new(&config).build().unwrap();
///
/// let keys: Vec<_> = collect_outputs(&config, &graph).into_iter().map(|o| o.key).collect();
/// assert_eq!(keys, vec!["EnvoyServiceAccount", "IngressGatewayName", "AppMeshName"]);
/// ```
#[must_use]
pub fn collect_outputs(config: &ClusterConfig, graph: &ResourceGraph) -> Vec<DeploymentOutput> {
    let mut outputs = Vec::new();
    let namespace = config.effective_namespace();

    let envoy = ResourceId::service_account(namespace, &config.envoy_service_account_name);
    if graph.contains(&envoy) {
        outputs.push(DeploymentOutput::new(
            "EnvoyServiceAccount",
            "Service account of the Envoy proxies",
            config.envoy_service_account_name.clone(),
        ));
    }

    let gateway_name = config.gateway_name();
    if graph.contains(&ResourceId::ingress_gateway(&gateway_name)) {
        outputs.push(DeploymentOutput::new(
            "IngressGatewayName",
            "Name of the ingress gateway",
            gateway_name,
        ));
    }

    if graph.contains(&ResourceId::mesh(&config.mesh_name)) {
        outputs.push(DeploymentOutput::new(
            "AppMeshName",
            "Name of the service mesh",
            config.mesh_name.clone(),
        ));
    }

    let has_repositories = graph.nodes().any(|n| n.kind() == ResourceKind::Repository);
    if let (true, Some(account), Some(region)) =
        (has_repositories, &config.account, &config.region)
    {
        outputs.push(DeploymentOutput::new(
            "Docker-Login-For-ECR",
            "Command that logs Docker into the container registry",
            docker_login_command(account, region),
        ));
    }

    outputs
}

/// The command that logs Docker into an account's registry.
///
/// # Examples
///
/// ```
/// use eksplan::external::docker_login_command;
///
/// assert_eq!(
///     docker_login_command("123456789012", "eu-west-1"),
///     "aws ecr get-login-password --region eu-west-1 | docker login --username AWS \
///      --password-stdin 123456789012.dkr.ecr.eu-west-1.amazonaws.com"
/// );
/// ```
#[must_use]
pub fn docker_login_command(account: &str, region: &str) -> String {
    format!(
        "aws ecr get-login-password --region {region} | docker login --username AWS \
         --password-stdin {account}.dkr.ecr.{region}.amazonaws.com"
    )
}

/// Sends every output to a sink, stopping at the first failure.
///
/// # Errors
///
/// Returns the sink's error.
pub fn publish<S: OutputSink + ?Sized>(outputs: &[DeploymentOutput], sink: &mut S) -> Result<()> {
    for output in outputs {
        sink.emit(output)?;
    }
    Ok(())
}
