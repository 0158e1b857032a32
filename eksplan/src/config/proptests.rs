//! Property-based tests for the configuration system.

use super::merger::ConfigMerger;
use super::options::OptionMap;
use super::resolver::{split_list, ConfigResolver};
use super::validator::{is_dns_label, ValidationEngine};
use proptest::prelude::*;

// Strategy for option values that resolve cleanly
fn namespace_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}[a-z0-9]"
}

fn option_map_strategy() -> impl Strategy<Value = OptionMap> {
    prop::collection::btree_map(
        prop::sample::select(vec!["MeshedNamespace", "VpcId", "K8sVersion", "StackName"]),
        "[a-z0-9.-]{0,12}",
        0..4,
    )
    .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // Every option set by the higher-precedence map survives the merge
    #[test]
    fn merge_higher_precedence_wins(
        low in option_map_strategy(),
        high in option_map_strategy()
    ) {
        let mut merged = low.clone();
        ConfigMerger::merge_into(&mut merged, &high);

        for (name, value) in high.iter() {
            prop_assert_eq!(merged.get(name), Some(value));
        }
        for (name, value) in low.iter() {
            if !high.contains(name) {
                prop_assert_eq!(merged.get(name), Some(value));
            }
        }
    }

    // Merging is idempotent
    #[test]
    fn merge_is_idempotent(base in option_map_strategy(), other in option_map_strategy()) {
        let mut once = base.clone();
        ConfigMerger::merge_into(&mut once, &other);
        let mut twice = once.clone();
        ConfigMerger::merge_into(&mut twice, &other);
        prop_assert_eq!(once, twice);
    }

    // Joining items with either delimiter and padding them splits back to the items
    #[test]
    fn split_list_recovers_items(
        items in prop::collection::vec("[a-z0-9.]{1,10}", 0..6),
        use_semicolon in any::<bool>()
    ) {
        let delimiter = if use_semicolon { " ; " } else { " , " };
        let joined = items.join(delimiter);
        prop_assert_eq!(split_list(&joined), items);
    }

    // Any non-negative whole count resolves exactly, whether given as text or number
    #[test]
    fn counts_resolve_exactly(count in 0u32..10_000, as_text in any::<bool>()) {
        let mut options: OptionMap = [("EksClusterName", "prod")].into_iter().collect();
        if as_text {
            options.insert("SpotInstanceCount", count.to_string());
        } else {
            options.insert("SpotInstanceCount", u64::from(count));
        }
        let config = ConfigResolver::resolve(&options).unwrap();
        prop_assert_eq!(config.spot.count, count);
    }

    // Negative counts are always rejected
    #[test]
    fn negative_counts_rejected(count in 1i64..10_000) {
        let options: OptionMap = [
            ("EksClusterName", "prod".to_string()),
            ("OnDemandInstanceCount", format!("-{count}")),
        ]
        .into_iter()
        .collect();
        let err = ConfigResolver::resolve(&options).unwrap_err();
        prop_assert_eq!(err.violations().len(), 1);
    }

    // A meshed, non-standard namespace with EC2 compute always validates
    #[test]
    fn meshed_namespace_validates(namespace in namespace_strategy()) {
        prop_assume!(!matches!(namespace.as_str(), "default" | "kube-system" | "kube-public"));
        let options: OptionMap = [
            ("EksClusterName", "prod".to_string()),
            ("KubectlRoleName", "admin".to_string()),
            ("Region", "eu-west-1".to_string()),
            ("OnDemandInstanceCount", "1".to_string()),
            ("MeshedNamespace", namespace.clone()),
        ]
        .into_iter()
        .collect();
        let config = ConfigResolver::resolve(&options).unwrap();
        prop_assert!(is_dns_label(&namespace));
        prop_assert!(ValidationEngine::validate(&config).is_empty());
    }

    // Upper-case characters never form a DNS label
    #[test]
    fn dns_labels_reject_uppercase(name in "[a-z]{0,5}[A-Z][a-z]{0,5}") {
        prop_assert!(!is_dns_label(&name));
    }
}
