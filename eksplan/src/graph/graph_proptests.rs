//! Property-based tests for graph construction and scheduling.

use super::builder::ResourceGraphBuilder;
use super::scheduler::DependencyScheduler;
use crate::config::{ConfigResolver, OptionMap};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Strategy for option maps that always resolve and pass namespace checks
fn options_strategy() -> impl Strategy<Value = OptionMap> {
    (
        prop::option::of("ns[a-z0-9]{1,6}"),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        0u32..3,
        prop::collection::btree_set("[a-z]{2,6}", 0..3),
    )
        .prop_map(
            |(namespace, gateway, skip_ns, skip_lb, skip_mesh_ctrl, skip_mesh, count, repos)| {
                let mut options: OptionMap = [
                    ("EksClusterName", "prod".to_string()),
                    ("AddIngressGatewayToNs", gateway.to_string()),
                    ("SkipLbControllerInstallation", skip_lb.to_string()),
                    ("SkipAppMeshControllerInstallation", skip_mesh_ctrl.to_string()),
                    ("SkipCreatingAppMesh", skip_mesh.to_string()),
                    ("OnDemandInstanceCount", count.to_string()),
                    ("EcrRepoNames", repos.into_iter().collect::<Vec<_>>().join(",")),
                ]
                .into_iter()
                .collect();
                match namespace {
                    Some(ns) => options.insert("MeshedNamespace", ns),
                    // The default namespace can only be meshed when it is not created
                    None => options.insert("SkipCreatingNamespace", "true"),
                }
                if skip_ns {
                    options.insert("SkipCreatingNamespace", "true");
                }
                options
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        .. ProptestConfig::default()
    })]

    // Building twice yields the same nodes and edges
    #[test]
    fn planning_is_deterministic(options in options_strategy()) {
        let config = ConfigResolver::resolve(&options).unwrap();
        let first = ResourceGraphBuilder::new(&config).build().unwrap();
        let second = ResourceGraphBuilder::new(&config).build().unwrap();
        prop_assert_eq!(first, second);
    }

    // Every edge points from an earlier node to a later one in the topological order
    #[test]
    fn topological_order_respects_edges(options in options_strategy()) {
        let config = ConfigResolver::resolve(&options).unwrap();
        let graph = ResourceGraphBuilder::new(&config).build().unwrap();
        let order = DependencyScheduler::new(&graph).topological_order();
        prop_assert_eq!(order.len(), graph.len());

        let position: BTreeMap<_, _> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for edge in graph.edges() {
            prop_assert!(position[&edge.from] < position[&edge.to]);
        }
    }

    // Completing ready sets one after another covers the whole graph
    #[test]
    fn ready_sets_drain_the_graph(options in options_strategy()) {
        let config = ConfigResolver::resolve(&options).unwrap();
        let graph = ResourceGraphBuilder::new(&config).build().unwrap();
        let scheduler = DependencyScheduler::new(&graph);

        let mut completed = BTreeSet::new();
        let mut rounds = 0;
        loop {
            let ready = scheduler.ready_set(&completed);
            if ready.is_empty() {
                break;
            }
            completed.extend(ready.into_iter().cloned());
            rounds += 1;
        }
        prop_assert_eq!(completed.len(), graph.len());
        prop_assert_eq!(rounds, scheduler.levels().len());
    }

    // Levels partition the nodes and never hold an edge inside one batch
    #[test]
    fn levels_are_independent(options in options_strategy()) {
        let config = ConfigResolver::resolve(&options).unwrap();
        let graph = ResourceGraphBuilder::new(&config).build().unwrap();
        let levels = DependencyScheduler::new(&graph).levels();

        let total: usize = levels.iter().map(Vec::len).sum();
        prop_assert_eq!(total, graph.len());
        for batch in &levels {
            for from in batch {
                for to in batch {
                    prop_assert!(!graph.has_edge(from, to));
                }
            }
        }
    }
}
