//! End-to-end tests of the terrastage binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn terrastage(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_terrastage"))
        .current_dir(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .env("TF_VAR_instance_type", "t3.large")
        .output()
        .expect("failed to run terrastage")
}

fn write_unit(dir: &Path) {
    fs::write(
        dir.join("main.tf"),
        r#"terraform {
  backend "s3" {}
}

variable "region" {}
variable "instance_type" {}
"#,
    )
    .unwrap();
    fs::write(
        dir.join("terragrunt_rendered.json"),
        r#"{
  "inputs": {"region": "us-east-1", "instance_type": "t3.micro", "extra": true},
  "remote_state": {
    "backend": "s3",
    "config": {"bucket": "tf-state", "key": "app/terraform.tfstate", "region": "us-east-1"}
  }
}"#,
    )
    .unwrap();
}

#[test]
fn test_stages_in_place() {
    let temp = TempDir::new().unwrap();
    write_unit(temp.path());

    let output = terrastage(temp.path(), &[]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let vars = fs::read_to_string(temp.path().join("test.auto.tfvars.json")).unwrap();
    let vars: serde_json::Value = serde_json::from_str(&vars).unwrap();
    assert_eq!(vars, serde_json::json!({"region": "us-east-1"}));

    let backend = fs::read_to_string(temp.path().join("backend.config")).unwrap();
    assert_eq!(
        backend,
        "bucket=\"tf-state\"\nkey=\"app/terraform.tfstate\"\nregion=\"us-east-1\"\n"
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("instance_type (already-overridden-by-env)"));
    assert!(stdout.contains("extra (not-declared-by-module)"));
}

#[test]
fn test_debug_profile_file_name() {
    let temp = TempDir::new().unwrap();
    write_unit(temp.path());

    let output = terrastage(temp.path(), &["--profile", "debug"]);
    assert!(output.status.success());
    assert!(temp.path().join("terragrunt-debug.tfvars.json").is_file());
    assert!(!temp.path().join("test.auto.tfvars.json").exists());
}

#[test]
fn test_stage_failure_exit_code() {
    let temp = TempDir::new().unwrap();

    let output = terrastage(temp.path(), &[]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_positional_argument_is_rejected() {
    let temp = TempDir::new().unwrap();

    let output = terrastage(temp.path(), &["plan"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}
