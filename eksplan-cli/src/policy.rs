//! Fetching policy documents over HTTP.

use eksplan::external::{PolicyDocumentSource, POLICY_SOURCE};
use eksplan::{Error, Result};

const USER_AGENT: &str = concat!("eksplan/", env!("CARGO_PKG_VERSION"));

/// Fetches policy documents from their URL.
pub struct HttpPolicySource {
    agent: ureq::Agent,
}

impl HttpPolicySource {
    /// Create a source with default agent settings.
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpPolicySource {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyDocumentSource for HttpPolicySource {
    fn fetch(&self, url: &str) -> Result<String> {
        log::info!("Fetching policy document from {url}");

        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| fetch_error(url, e))?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| fetch_error(url, e))
    }
}

fn fetch_error(url: &str, err: ureq::Error) -> Error {
    let message = match &err {
        ureq::Error::StatusCode(code) => format!("GET {url} returned HTTP {code}"),
        other => format!("GET {url} failed: {other}"),
    };
    Error::Collaborator {
        collaborator: POLICY_SOURCE.to_string(),
        message,
        source: Some(Box::new(err)),
    }
}
