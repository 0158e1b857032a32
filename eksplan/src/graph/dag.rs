//! The checked resource graph.
//!
//! A [`ResourceGraph`] can only be obtained through [`ResourceGraph::new`],
//! which rejects duplicate nodes, dangling edges, self-edges and cycles.
//! Every graph value is therefore a DAG whose edges only reference nodes it
//! holds.

use crate::error::{Error, Result};
use crate::graph::resource::{ResourceId, ResourceNode};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A "must happen before" edge: `from` is a prerequisite of `to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    /// The prerequisite.
    pub from: ResourceId,
    /// The dependent.
    pub to: ResourceId,
}

impl Edge {
    /// Creates an edge from a prerequisite to its dependent.
    #[must_use]
    pub fn new(from: ResourceId, to: ResourceId) -> Self {
        Self { from, to }
    }
}

/// A directed acyclic graph of resource nodes.
///
/// # Examples
///
/// ```
/// use eksplan::graph::{
///     CreationPolicy, Edge, NamespaceSpec, NodePayload, ResourceGraph, ResourceNode,
///     ServiceAccountSpec,
/// };
///
/// let ns = ResourceNode::new(NodePayload::Namespace(NamespaceSpec {
///     name: "appns".to_string(),
///     policy: CreationPolicy::Create,
///     labels: Default::default(),
/// }));
/// let sa = ResourceNode::new(NodePayload::ServiceAccount(ServiceAccountSpec {
///     name: "envoy-proxy".to_string(),
///     namespace: "appns".to_string(),
///     managed_policies: vec![],
///     inline_statements: vec![],
/// }));
/// let edge = Edge::new(ns.id.clone(), sa.id.clone());
///
/// let graph = ResourceGraph::new(vec![ns, sa], vec![edge.clone()]).unwrap();
/// assert_eq!(graph.len(), 2);
///
/// // The reverse edge closes a cycle and is rejected.
/// let nodes: Vec<_> = graph.nodes().cloned().collect();
/// let reverse = Edge::new(edge.to.clone(), edge.from.clone());
/// assert!(ResourceGraph::new(nodes, vec![edge, reverse]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceGraph {
    nodes: BTreeMap<ResourceId, ResourceNode>,
    edges: BTreeSet<Edge>,
}

impl ResourceGraph {
    /// The empty graph.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a graph, checking every structural invariant.
    ///
    /// Nodes with the same id must be identical and collapse into one;
    /// duplicate edges collapse as well.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGraph`] when two different nodes share an id,
    /// an edge references a missing node or points at its own source, or the
    /// edges form a cycle.
    pub fn new(nodes: Vec<ResourceNode>, edges: Vec<Edge>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for node in nodes {
            if let Some(existing) = by_id.get(&node.id) {
                if *existing != node {
                    return Err(Error::InvalidGraph {
                        details: format!("conflicting definitions for node {}", node.id),
                    });
                }
                continue;
            }
            by_id.insert(node.id.clone(), node);
        }

        let mut edge_set = BTreeSet::new();
        for edge in edges {
            for end in [&edge.from, &edge.to] {
                if !by_id.contains_key(end) {
                    return Err(Error::InvalidGraph {
                        details: format!("edge {} -> {} references missing node {end}", edge.from, edge.to),
                    });
                }
            }
            if edge.from == edge.to {
                return Err(Error::InvalidGraph {
                    details: format!("node {} depends on itself", edge.from),
                });
            }
            edge_set.insert(edge);
        }

        let graph = Self {
            nodes: by_id,
            edges: edge_set,
        };

        if let Some(stuck) = graph.nodes_off_order() {
            return Err(Error::InvalidGraph {
                details: format!("dependency cycle among: {stuck}"),
            });
        }

        Ok(graph)
    }

    /// Nodes Kahn's algorithm cannot order, joined for display.
    fn nodes_off_order(&self) -> Option<String> {
        let ordered: BTreeSet<&ResourceId> = self.kahn_order().into_iter().collect();
        if ordered.len() == self.nodes.len() {
            return None;
        }
        let stuck: Vec<String> = self
            .nodes
            .keys()
            .filter(|id| !ordered.contains(id))
            .map(ToString::to_string)
            .collect();
        Some(stuck.join(", "))
    }

    /// Kahn's algorithm with ties broken by id. Nodes on a cycle never
    /// reach in-degree zero and are left out.
    pub(crate) fn kahn_order(&self) -> Vec<&ResourceId> {
        let mut in_degree: BTreeMap<&ResourceId, usize> =
            self.nodes.keys().map(|id| (id, 0)).collect();
        for edge in &self.edges {
            if let Some(degree) = in_degree.get_mut(&edge.to) {
                *degree += 1;
            }
        }

        let mut ready: BTreeSet<&ResourceId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.pop_first() {
            order.push(id);
            for dependent in self.dependents_of(id) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        order
    }

    /// Iterates over nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values()
    }

    /// Iterates over edges in (prerequisite, dependent) order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: &ResourceId) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    /// Whether the graph holds a node.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether the graph holds the edge `from -> to`.
    #[must_use]
    pub fn has_edge(&self, from: &ResourceId, to: &ResourceId) -> bool {
        self.edges.contains(&Edge::new(from.clone(), to.clone()))
    }

    /// Direct prerequisites of a node, in id order.
    pub fn dependencies_of<'a>(&'a self, id: &'a ResourceId) -> impl Iterator<Item = &'a ResourceId> {
        self.edges
            .iter()
            .filter(move |edge| &edge.to == id)
            .map(|edge| &edge.from)
    }

    /// Direct dependents of a node, in id order.
    pub fn dependents_of<'a>(&'a self, id: &'a ResourceId) -> impl Iterator<Item = &'a ResourceId> {
        self.edges
            .iter()
            .filter(move |edge| &edge.from == id)
            .map(|edge| &edge.to)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
