//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers that isolate the binary from the caller's
//!   environment and configuration files
//! - Configuration and policy fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Project configuration for a meshed namespace on one on-demand node.
#[allow(dead_code)]
pub const MESHED_PROJECT: &str = "\
EksClusterName: prod
KubectlRoleName: eks-admin
Region: eu-west-1
MeshedNamespace: appns
OnDemandInstanceCount: 1
";

/// Project configuration that requests nothing.
#[allow(dead_code)]
pub const EMPTY_PROJECT: &str = "\
EksClusterName: prod
AddIngressGatewayToNs: false
SkipAppMeshControllerInstallation: true
SkipCreatingAppMesh: true
";

/// A minimal load balancer controller policy document.
#[allow(dead_code)]
pub const POLICY_DOCUMENT: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {"Effect": "Allow", "Action": ["elasticloadbalancing:*"], "Resource": "*"}
    ]
}"#;

/// Test environment with an isolated working directory.
///
/// This struct provides an isolated test environment with:
/// - A temporary directory used as the configuration discovery root
/// - Helper methods for writing fixtures
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    ///
    /// The environment is cleared so `EKSPLAN_*` and `CDK_DEFAULT_*`
    /// variables of the caller never leak into a test.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("eksplan").expect("Failed to find eksplan binary");
        cmd.env_clear();
        cmd
    }

    /// Get a command builder with the working directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--working-dir").arg(&self.temp_path);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file under the test environment and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write `eksplan.yaml` into the working directory.
    pub fn write_project(&self, contents: &str) -> PathBuf {
        self.write_file("eksplan.yaml", contents)
    }

    /// Write the policy fixture and return its path.
    pub fn write_policy(&self) -> PathBuf {
        self.write_file("iam_policy.json", POLICY_DOCUMENT)
    }

    /// Run a command expected to succeed and return its stdout.
    pub fn stdout_of(&self, args: &[&str]) -> String {
        let output = self
            .command()
            .args(args)
            .output()
            .expect("Failed to run eksplan");

        assert!(
            output.status.success(),
            "eksplan {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        String::from_utf8(output.stdout).expect("Invalid UTF-8 in output")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
