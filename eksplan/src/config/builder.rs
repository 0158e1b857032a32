//! Assembly of all configuration sources into one option map.

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::{ConfigLoader, ConfigSource, PRECEDENCE_DEFAULTS};
use crate::config::merger::ConfigMerger;
use crate::config::options::OptionMap;
use crate::config::resolver::ConfigResolver;
use crate::config::schema::ClusterConfig;
use crate::error::Result;
use serde_yaml::Value;
use std::env;
use std::path::{Path, PathBuf};

/// Builder that loads, merges and resolves configuration.
///
/// # Examples
///
/// ```
/// use eksplan::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_override("EksClusterName", "prod")
///     .with_override("MeshedNamespace", "appns")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.effective_namespace(), "appns");
/// ```
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    working_dir: Option<PathBuf>,
    files: Vec<PathBuf>,
    skip_files: bool,
    skip_env: bool,
    overrides: OptionMap,
}

impl ConfigBuilder {
    /// Creates a builder that reads every source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory to start project file discovery from (default: current directory).
    #[must_use]
    pub fn with_working_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    /// Adds an explicit configuration file.
    #[must_use]
    pub fn with_file(mut self, path: &Path) -> Self {
        self.files.push(path.to_path_buf());
        self
    }

    /// Skips project file discovery. Explicit files are still read.
    #[must_use]
    pub fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Ignores `CDK_DEFAULT_*` and `EKSPLAN_*` environment variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Sets one option with the highest precedence.
    #[must_use]
    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(name, value);
        self
    }

    /// Sets several options with the highest precedence.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &OptionMap) -> Self {
        ConfigMerger::merge_into(&mut self.overrides, overrides);
        self
    }

    /// Loads and merges every enabled source into a raw option map.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed, or
    /// the current directory cannot be determined.
    pub fn load(&self) -> Result<OptionMap> {
        let mut sources = Vec::new();

        if !self.skip_env {
            sources.push(ConfigSource {
                path: PathBuf::from("<environment defaults>"),
                precedence: PRECEDENCE_DEFAULTS,
                options: EnvironmentConfig::cdk_defaults(),
            });
        }

        if self.skip_files {
            sources.extend(ConfigLoader::load_all_explicit(&self.files)?);
        } else {
            let working_dir = match &self.working_dir {
                Some(dir) => dir.clone(),
                None => env::current_dir()?,
            };
            sources.extend(ConfigLoader::load_all(&working_dir, &self.files)?);
        }

        let mut options = ConfigMerger::merge(sources);
        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut options);
        }
        ConfigMerger::merge_into(&mut options, &self.overrides);

        Ok(options)
    }

    /// Loads every source and resolves the result.
    ///
    /// # Errors
    ///
    /// Returns loading errors, or [`crate::Error::Configuration`] when the
    /// merged options do not resolve.
    pub fn build(&self) -> Result<ClusterConfig> {
        ConfigResolver::resolve(&self.load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_only() {
        let options = ConfigBuilder::new()
            .skip_files()
            .skip_env()
            .with_override("EksClusterName", "prod")
            .load()
            .unwrap();
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_override_beats_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("eksplan.yaml"),
            "EksClusterName: prod\nMeshedNamespace: from-file\n",
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .skip_env()
            .with_working_dir(temp_dir.path())
            .with_override("MeshedNamespace", "from-cli")
            .build()
            .unwrap();
        assert_eq!(config.cluster_name, "prod");
        assert_eq!(config.meshed_namespace.as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_skip_files_still_reads_explicit_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("eksplan.yaml"), "EksClusterName: discovered\n").unwrap();
        let explicit = temp_dir.path().join("explicit.yaml");
        fs::write(&explicit, "EksClusterName: explicit\n").unwrap();

        let config = ConfigBuilder::new()
            .skip_env()
            .skip_files()
            .with_working_dir(temp_dir.path())
            .with_file(&explicit)
            .build()
            .unwrap();
        assert_eq!(config.cluster_name, "explicit");
    }

    #[test]
    #[serial]
    fn test_env_sits_between_files_and_overrides() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("eksplan.yaml"),
            "EksClusterName: prod\nK8sVersion: '1.18'\nVpcId: vpc-file\n",
        )
        .unwrap();
        env::set_var("EKSPLAN_K8S_VERSION", "1.20");
        env::set_var("EKSPLAN_VPC_ID", "vpc-env");
        env::set_var("CDK_DEFAULT_REGION", "us-east-2");

        let result = ConfigBuilder::new()
            .with_working_dir(temp_dir.path())
            .with_override("VpcId", "vpc-cli")
            .build();

        env::remove_var("EKSPLAN_K8S_VERSION");
        env::remove_var("EKSPLAN_VPC_ID");
        env::remove_var("CDK_DEFAULT_REGION");

        let config = result.unwrap();
        assert_eq!(config.kubernetes_version, "1.20");
        assert_eq!(config.vpc_id.as_deref(), Some("vpc-cli"));
        assert_eq!(config.region.as_deref(), Some("us-east-2"));
    }

    #[test]
    #[serial]
    fn test_skip_env_ignores_cdk_defaults() {
        env::set_var("CDK_DEFAULT_ACCOUNT", "123456789012");
        let result = ConfigBuilder::new()
            .skip_files()
            .skip_env()
            .with_override("EksClusterName", "prod")
            .build();
        env::remove_var("CDK_DEFAULT_ACCOUNT");

        assert!(result.unwrap().account.is_none());
    }

    #[test]
    fn test_missing_cluster_name_fails_to_build() {
        let err = ConfigBuilder::new().skip_files().skip_env().build().unwrap_err();
        assert_eq!(err.violations().len(), 1);
    }
}
