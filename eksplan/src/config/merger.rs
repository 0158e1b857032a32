//! Configuration merging and precedence handling.
//!
//! Options are flat, so merging is key by key: a higher-precedence source
//! replaces the whole value of every option it sets. A blank value set at a
//! higher precedence therefore resets the option to its default.

use crate::config::loader::ConfigSource;
use crate::config::options::OptionMap;

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use eksplan::config::{ConfigMerger, OptionMap};
///
/// let mut result: OptionMap = [("MeshedNamespace", "low")].into_iter().collect();
/// let high: OptionMap = [("MeshedNamespace", "high")].into_iter().collect();
///
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.get("MeshedNamespace").and_then(|v| v.as_str()), Some("high"));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into one option map.
    ///
    /// Sources are applied in precedence order, lowest first; sources with
    /// equal precedence keep their given order.
    #[must_use]
    pub fn merge(mut sources: Vec<ConfigSource>) -> OptionMap {
        sources.sort_by_key(|s| s.precedence);

        let mut result = OptionMap::new();
        for source in &sources {
            Self::merge_into(&mut result, &source.options);
        }
        result
    }

    /// Merge `source` into `target`; every option `source` sets wins.
    pub fn merge_into(target: &mut OptionMap, source: &OptionMap) {
        for (name, value) in source.iter() {
            target.insert(name, value.clone());
        }
    }
}
