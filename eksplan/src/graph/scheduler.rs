//! Partial-order views of a resource graph for appliers.
//!
//! Sequential appliers walk [`DependencyScheduler::topological_order`];
//! concurrent ones either poll [`DependencyScheduler::ready_set`] as work
//! completes or process [`DependencyScheduler::levels`] batch by batch.

use crate::graph::dag::ResourceGraph;
use crate::graph::resource::ResourceId;
use std::collections::{BTreeMap, BTreeSet};

/// Schedules the nodes of a graph.
///
/// # Examples
///
/// ```
/// use eksplan::config::{ConfigResolver, OptionMap};
/// use eksplan::graph::{DependencyScheduler, ResourceGraphBuilder};
///
/// let options: OptionMap = [
///     ("EksClusterName", "prod"),
///     ("KubectlRoleName", "eks-admin"),
///     ("Region", "eu-west-1"),
///     ("MeshedNamespace", "appns"),
///     ("OnDemandInstanceCount", "1"),
/// ]
/// .into_iter()
/// .collect();
/// let config = ConfigResolver::resolve(&options).unwrap();
/// let graph = ResourceGraphBuilder::new(&config).build().unwrap();
///
/// let scheduler = DependencyScheduler::new(&graph);
/// let order = scheduler.topological_order();
/// assert_eq!(order.len(), graph.len());
/// assert_eq!(order.last().unwrap().as_str(), "ingress-gateway/ingressgw-prod-appns");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DependencyScheduler<'g> {
    graph: &'g ResourceGraph,
}

impl<'g> DependencyScheduler<'g> {
    /// Creates a scheduler over a graph.
    #[must_use]
    pub const fn new(graph: &'g ResourceGraph) -> Self {
        Self { graph }
    }

    /// Every node, prerequisites first; among ready nodes the smallest id goes first.
    #[must_use]
    pub fn topological_order(&self) -> Vec<&'g ResourceId> {
        self.graph.kahn_order()
    }

    /// Nodes not in `completed` whose prerequisites are all in `completed`.
    ///
    /// Ids in `completed` that the graph does not hold are ignored.
    #[must_use]
    pub fn ready_set(&self, completed: &BTreeSet<ResourceId>) -> Vec<&'g ResourceId> {
        self.graph
            .nodes()
            .map(|node| &node.id)
            .filter(|id| !completed.contains(*id))
            .filter(|id| {
                self.graph
                    .dependencies_of(id)
                    .all(|dependency| completed.contains(dependency))
            })
            .collect()
    }

    /// Batches of mutually independent nodes.
    ///
    /// A node's level is one more than the highest level of its
    /// prerequisites; nodes without prerequisites are level zero. Each batch
    /// is sorted by id.
    #[must_use]
    pub fn levels(&self) -> Vec<Vec<&'g ResourceId>> {
        let mut level_of: BTreeMap<&ResourceId, usize> = BTreeMap::new();
        let mut levels: Vec<Vec<&'g ResourceId>> = Vec::new();

        for id in self.topological_order() {
            let level = self
                .graph
                .dependencies_of(id)
                .filter_map(|dependency| level_of.get(dependency))
                .map(|level| level + 1)
                .max()
                .unwrap_or(0);
            level_of.insert(id, level);
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(id);
        }

        for batch in &mut levels {
            batch.sort();
        }
        levels
    }
}
