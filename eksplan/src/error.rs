//! Error types for the eksplan library.
//!
//! This module provides the error hierarchy for planning runs, using
//! `thiserror` for ergonomic error handling. Configuration and validation
//! failures carry every violation found so a caller can report all problems
//! in one pass.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an eksplan error.
///
/// # Examples
///
/// ```
/// use eksplan::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Whether a violation came from option resolution or from a cross-field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A required option is absent or an option value is malformed.
    Configuration,
    /// A well-formed configuration breaks a cross-field invariant.
    Validation,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// A single problem found in a configuration.
///
/// # Examples
///
/// ```
/// use eksplan::Violation;
///
/// let v = Violation::validation("VpcId", "required when installing the load balancer controller");
/// assert_eq!(v.to_string(), "VpcId: required when installing the load balancer controller");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    /// Which stage produced the violation.
    pub kind: ViolationKind,
    /// The option (or option group) the violation is about.
    pub subject: String,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a configuration violation.
    #[must_use]
    pub fn configuration(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Configuration,
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Creates a validation violation.
    #[must_use]
    pub fn validation(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Validation,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Joins violations into one message, one per line.
fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("\n  - {v}"))
        .collect::<String>()
}

/// The main error type for the eksplan library.
#[derive(Debug, Error)]
pub enum Error {
    /// Required options are absent or option values are malformed.
    #[error("invalid configuration ({} problem(s)):{}", violations.len(), join_violations(violations))]
    Configuration {
        /// Every problem found while resolving options.
        violations: Vec<Violation>,
    },

    /// The configuration violates cross-field invariants.
    #[error("validation failed ({} violation(s)):{}", violations.len(), join_violations(violations))]
    Validation {
        /// Every violated rule.
        violations: Vec<Violation>,
    },

    /// An external collaborator (policy source, applier) failed.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        /// Name of the collaborator that failed.
        collaborator: String,
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A resource graph broke one of its structural invariants.
    #[error("invalid resource graph: {details}")]
    InvalidGraph {
        /// What is wrong with the graph.
        details: String,
    },

    /// A configuration file could not be read or parsed.
    #[error("cannot load {}: {reason}", path.display())]
    ConfigFile {
        /// The offending file.
        path: PathBuf,
        /// Why it could not be loaded.
        reason: String,
    },

    /// YAML serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a collaborator error without an underlying source.
    #[must_use]
    pub fn collaborator(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Returns the violations carried by configuration or validation errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksplan::{Error, Violation};
    ///
    /// let err = Error::Validation { violations: vec![Violation::validation("Region", "required")] };
    /// assert_eq!(err.violations().len(), 1);
    /// assert!(Error::collaborator("applier", "boom").violations().is_empty());
    /// ```
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Configuration { violations } | Self::Validation { violations } => violations,
            _ => &[],
        }
    }

    /// Check if the error came from an external collaborator.
    #[must_use]
    pub fn is_collaborator(&self) -> bool {
        matches!(self, Self::Collaborator { .. })
    }
}
