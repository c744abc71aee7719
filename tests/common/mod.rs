#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};

pub const AWS_PROVIDER: &str = r#"
provider "aws" {
  region = "us-east-1"

  default_tags {
    tags = {
      Owner = "platform"
    }
  }
}
"#;

/// A scratch infrastructure tree with an isolated HOME.
pub struct TestTree {
    _tmp: TempDir,
    pub home: PathBuf,
    pub root: PathBuf,
}

impl TestTree {
    pub fn new() -> Self {
        let tmp = Builder::new().prefix("tag-auditor").tempdir().expect("create temp dir");
        let home = tmp.path().join("home");
        let root = tmp.path().join("infra");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&root).expect("create infra root");

        Self { _tmp: tmp, home, root }
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().expect("file has a parent")).expect("create parent dirs");
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tag-auditor").expect("binary builds");
        cmd.env("HOME", &self.home).env_remove("RUST_LOG");
        cmd
    }

    pub fn scan(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("scan").arg("--path").arg(&self.root);
        cmd
    }

    /// Runs a JSON scan with extra args and returns the parsed findings.
    pub fn scan_json(&self, args: &[&str]) -> Vec<Value> {
        let out = self
            .scan()
            .arg("--json")
            .arg("--warn-only")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&out).expect("valid json output");
        value.as_array().expect("json array").clone()
    }
}

pub fn resource(resource_type: &str, name: &str, body: &str) -> String {
    format!("resource \"{resource_type}\" \"{name}\" {{\n{body}\n}}\n")
}

pub fn finding_names(findings: &[Value]) -> Vec<(String, String)> {
    findings
        .iter()
        .map(|f| {
            (
                f["type"].as_str().unwrap_or_default().to_string(),
                f["name"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

pub fn relative_file(root: &Path, finding: &Value) -> String {
    let file = PathBuf::from(finding["file"].as_str().unwrap_or_default());
    file.strip_prefix(root)
        .unwrap_or(&file)
        .to_string_lossy()
        .replace('\\', "/")
}
