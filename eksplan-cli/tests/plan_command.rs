//! Integration tests for the `plan` command.

mod common;

use common::{TestEnv, EMPTY_PROJECT, MESHED_PROJECT};
use predicates::prelude::*;

#[test]
fn test_plan_human_lists_steps_in_order() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    env.command()
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Plan EksPlan--prod--appns (8 resources):",
        ))
        .stdout(predicate::str::contains("   1. Create namespace appmesh-system"))
        .stdout(predicate::str::contains("EnvoyServiceAccount = envoy-proxy"));
}

#[test]
fn test_plan_json_is_machine_readable() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    let stdout = env.stdout_of(&["plan", "--format", "json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(report["outcome"], "valid");
    assert_eq!(report["name"], "EksPlan--prod--appns");
    assert_eq!(report["steps"].as_array().unwrap().len(), 8);
    assert_eq!(report["edges"].as_array().unwrap().len(), 7);
    assert_eq!(report["steps"][0]["id"], "namespace/appmesh-system");
}

#[test]
fn test_plan_dot_output() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    env.command()
        .args(["plan", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph \"EksPlan--prod--appns\" {"))
        .stdout(predicate::str::contains(
            "\"mesh/prod-mesh\" -> \"ingress-gateway/ingressgw-prod-appns\";",
        ));
}

#[test]
fn test_plan_format_is_case_insensitive() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    env.command()
        .args(["plan", "--format", "YAML"])
        .assert()
        .success()
        .stdout(predicate::str::contains("outcome: valid"));
}

#[test]
fn test_plan_writes_output_file() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);
    let out = env.path().join("plan.json");

    env.command()
        .args(["plan", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["outcome"], "valid");
}

#[test]
fn test_plan_empty_configuration_succeeds() {
    let env = TestEnv::new();
    env.write_project(EMPTY_PROJECT);

    env.command()
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to plan."));
}

#[test]
fn test_plan_missing_cluster_name_is_configuration_error() {
    let env = TestEnv::new();
    env.write_project("MeshedNamespace: appns\n");

    env.command()
        .arg("plan")
        .assert()
        .failure()
        .code(7)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("EksClusterName: must be specified"));
}

#[test]
fn test_plan_invalid_configuration_exit_code() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    env.command()
        .args(["plan", "-c", "MeshedNamespace=kube-system"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("standard namespace 'kube-system'"));
}

#[test]
fn test_plan_invalid_json_report_goes_to_stdout() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    let output = env
        .command()
        .args(["plan", "--format", "json", "-c", "MeshedNamespace=kube-system"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "invalid");
    assert_eq!(report["violations"][0]["subject"], "MeshedNamespace");
    assert_eq!(report["violations"][0]["kind"], "validation");
}

#[test]
fn test_plan_load_balancer_controller_with_policy_file() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);
    let policy = env.write_policy();

    env.command()
        .arg("--policy-file")
        .arg(&policy)
        .args([
            "-c",
            "SkipLbControllerInstallation=false",
            "-c",
            "VpcId=vpc-0abc",
            "plan",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Install chart aws-load-balancer-controller",
        ))
        .stdout(predicate::str::contains(
            "namespace 'kube-system' is assumed to exist",
        ));
}

#[test]
fn test_plan_unreadable_policy_file_is_collaborator_failure() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    env.command()
        .arg("--policy-file")
        .arg(env.path().join("missing.json"))
        .args([
            "-c",
            "SkipLbControllerInstallation=false",
            "-c",
            "VpcId=vpc-0abc",
            "plan",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("policy document source failed"));
}

#[test]
fn test_plan_warns_about_unknown_options() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    env.command()
        .args(["-c", "MeshedNamspace=typo", "plan", "--format", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Warning: ignoring unrecognized option 'MeshedNamspace'",
        ));

    env.command()
        .args(["--quiet", "-c", "MeshedNamspace=typo", "plan", "--format", "json"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_plan_envoy_account_clash_is_validation_failure() {
    let env = TestEnv::new();
    env.write_project(MESHED_PROJECT);

    env.command()
        .args([
            "-c",
            "MeshedNamespace=appmesh-system",
            "-c",
            "EnvoyServiceAccountName=appmesh-controller",
            "plan",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("EnvoyServiceAccountName"));
}
