//! IAM policy documents consumed by reference.
//!
//! The load balancer controller's permissions are published upstream as a
//! policy document. Only its top-level `Statement` list is used; the
//! statements are attached verbatim to the controller's service account.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Name used in collaborator errors raised while fetching documents.
pub const POLICY_SOURCE: &str = "policy document source";

/// Fetches policy documents by URL.
pub trait PolicyDocumentSource {
    /// Returns the raw text of the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Collaborator`] if the document cannot be fetched.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Serves one in-memory document for every URL.
///
/// # Examples
///
/// ```
/// use eksplan::external::{fetch_statements, StaticPolicySource};
///
/// let source = StaticPolicySource::new(r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow"}]}"#);
/// let statements = fetch_statements(&source, "https://example.com/policy.json").unwrap();
/// assert_eq!(statements.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StaticPolicySource {
    document: String,
}

impl StaticPolicySource {
    /// Creates a source serving `document`.
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl PolicyDocumentSource for StaticPolicySource {
    fn fetch(&self, _url: &str) -> Result<String> {
        Ok(self.document.clone())
    }
}

/// Reads the document from a local file instead of the URL.
#[derive(Debug, Clone)]
pub struct FilePolicySource {
    path: PathBuf,
}

impl FilePolicySource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl PolicyDocumentSource for FilePolicySource {
    fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("reading policy for {url} from {}", self.path.display());
        fs::read_to_string(&self.path).map_err(|e| Error::Collaborator {
            collaborator: POLICY_SOURCE.to_string(),
            message: format!("cannot read {}", self.path.display()),
            source: Some(Box::new(e)),
        })
    }
}

/// Extracts the `Statement` list of a policy document.
///
/// A single statement object is accepted as a one-element list.
///
/// # Errors
///
/// Returns [`Error::Collaborator`] if the text is not JSON or has no
/// statements.
pub fn parse_statements(document: &str) -> Result<Vec<Value>> {
    let parsed: Value = serde_json::from_str(document).map_err(|e| Error::Collaborator {
        collaborator: POLICY_SOURCE.to_string(),
        message: "policy document is not valid JSON".to_string(),
        source: Some(Box::new(e)),
    })?;

    match parsed.get("Statement") {
        Some(Value::Array(statements)) => Ok(statements.clone()),
        Some(statement @ Value::Object(_)) => Ok(vec![statement.clone()]),
        _ => Err(Error::collaborator(
            POLICY_SOURCE,
            "policy document has no Statement list",
        )),
    }
}

/// Fetches a document and extracts its statements.
///
/// # Errors
///
/// Returns the source's error, or a parse error from [`parse_statements`].
pub fn fetch_statements(source: &dyn PolicyDocumentSource, url: &str) -> Result<Vec<Value>> {
    let document = source.fetch(url)?;
    let statements = parse_statements(&document)?;
    log::debug!("fetched {} policy statements from {url}", statements.len());
    Ok(statements)
}
