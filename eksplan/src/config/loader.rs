//! Configuration file discovery and loading.
//!
//! This module discovers `cdk.json`, `eksplan.yaml` and `eksplan.local.yaml`
//! files and loads them into flat [`OptionMap`]s tagged with their
//! precedence.

use crate::config::options::OptionMap;
use crate::error::{Error, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// CDK application file whose `context` block holds options.
pub const CDK_JSON: &str = "cdk.json";

/// Project configuration file.
pub const PROJECT_CONFIG: &str = "eksplan.yaml";

/// Private, uncommitted project configuration file.
pub const LOCAL_CONFIG: &str = "eksplan.local.yaml";

/// Precedence of built-in defaults taken from the environment.
pub const PRECEDENCE_DEFAULTS: u8 = 0;
/// Precedence of `cdk.json` context.
pub const PRECEDENCE_CDK_JSON: u8 = 1;
/// Precedence of `eksplan.yaml`.
pub const PRECEDENCE_PROJECT: u8 = 2;
/// Precedence of `eksplan.local.yaml`.
pub const PRECEDENCE_LOCAL: u8 = 3;
/// Precedence of files passed explicitly.
pub const PRECEDENCE_EXPLICIT: u8 = 4;

/// Configuration source with its precedence level.
///
/// Lower precedence values are overridden by higher ones.
///
/// # Examples
///
/// ```
/// use eksplan::config::{ConfigSource, OptionMap};
/// use std::path::PathBuf;
///
/// let project = ConfigSource {
///     path: PathBuf::from("eksplan.yaml"),
///     precedence: 2,
///     options: OptionMap::new(),
/// };
/// assert!(project.options.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the configuration file.
    pub path: PathBuf,
    /// Precedence level (higher values take priority).
    pub precedence: u8,
    /// Options read from the file.
    pub options: OptionMap,
}

/// Loads configuration from files.
///
/// # Examples
///
/// ```no_run
/// use eksplan::config::ConfigLoader;
/// use std::path::Path;
///
/// let sources = ConfigLoader::load_all(Path::new("."), &[]).unwrap();
/// println!("Found {} configuration sources", sources.len());
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Discover project files and load explicit ones.
    ///
    /// Discovered files come first, explicit files last; the result is
    /// sorted by precedence, lowest first.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read or parsed, or if an
    /// explicit file does not exist.
    pub fn load_all(working_dir: &Path, explicit: &[PathBuf]) -> Result<Vec<ConfigSource>> {
        let mut sources = Self::discover_project_configs(working_dir)?;
        sources.extend(Self::load_all_explicit(explicit)?);

        // Stable sort keeps explicit files in command-line order
        sources.sort_by_key(|s| s.precedence);

        Ok(sources)
    }

    /// Load explicitly named files, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if any file is missing, unreadable or malformed.
    pub fn load_all_explicit(explicit: &[PathBuf]) -> Result<Vec<ConfigSource>> {
        explicit
            .iter()
            .map(|path| {
                Ok(ConfigSource {
                    options: Self::load_file(path)?,
                    path: path.clone(),
                    precedence: PRECEDENCE_EXPLICIT,
                })
            })
            .collect()
    }

    /// Discover project configurations by walking up directories.
    ///
    /// Stops at the first directory containing any of `cdk.json`,
    /// `eksplan.yaml` or `eksplan.local.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if any discovered file cannot be read or parsed.
    pub fn discover_project_configs(start_dir: &Path) -> Result<Vec<ConfigSource>> {
        let mut configs = Vec::new();
        let mut current = start_dir.to_path_buf();

        loop {
            let candidates = [
                (CDK_JSON, PRECEDENCE_CDK_JSON),
                (PROJECT_CONFIG, PRECEDENCE_PROJECT),
                (LOCAL_CONFIG, PRECEDENCE_LOCAL),
            ];
            for (file_name, precedence) in candidates {
                let path = current.join(file_name);
                if path.exists() {
                    log::debug!("loading configuration from {}", path.display());
                    configs.push(ConfigSource {
                        options: Self::load_file(&path)?,
                        path,
                        precedence,
                    });
                }
            }

            if !configs.is_empty() || !current.pop() {
                break;
            }
        }

        Ok(configs)
    }

    /// Load one configuration file into an option map.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML. When the
    /// document has a `context` mapping (the `cdk.json` layout) only that
    /// mapping is read. An empty document yields no options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or is not
    /// a mapping with string keys.
    pub fn load_file(path: &Path) -> Result<OptionMap> {
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: format!("failed to read: {e}"),
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let document: Value = if is_json {
            serde_json::from_str(&contents).map_err(|e| Error::ConfigFile {
                path: path.to_path_buf(),
                reason: format!("invalid JSON: {e}"),
            })?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| Error::ConfigFile {
                path: path.to_path_buf(),
                reason: format!("invalid YAML: {e}"),
            })?
        };

        Self::options_from_document(path, document)
    }

    fn options_from_document(path: &Path, document: Value) -> Result<OptionMap> {
        let mapping = match document {
            Value::Null => return Ok(OptionMap::new()),
            Value::Mapping(mut mapping) => match mapping.remove("context") {
                Some(Value::Mapping(context)) => context,
                Some(other) => {
                    mapping.insert(Value::from("context"), other);
                    mapping
                }
                None => mapping,
            },
            _ => {
                return Err(Error::ConfigFile {
                    path: path.to_path_buf(),
                    reason: "expected a mapping of option names to values".to_string(),
                })
            }
        };

        let mut options = OptionMap::new();
        for (key, value) in mapping {
            let Value::String(name) = key else {
                return Err(Error::ConfigFile {
                    path: path.to_path_buf(),
                    reason: "option names must be strings".to_string(),
                });
            };
            options.insert(name, value);
        }
        Ok(options)
    }
}

/// Parses a `Key=Value` override as given on the command line.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if there is no `=` or the key is blank.
///
/// # Examples
///
/// ```
/// use eksplan::config::parse_override;
///
/// let (key, value) = parse_override("MeshedNamespace=appns").unwrap();
/// assert_eq!(key, "MeshedNamespace");
/// assert_eq!(value, "appns");
/// assert!(parse_override("MeshedNamespace").is_err());
/// ```
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::Configuration {
            violations: vec![crate::error::Violation::configuration(
                "--context",
                format!("expected KEY=VALUE, got '{raw}'"),
            )],
        }),
    }
}
