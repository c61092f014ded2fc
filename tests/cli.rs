use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup />
</Project>
"#;

/// Run fadm with an isolated repository and configuration file.
fn fadm(home: &Path, args: &[&str]) -> Output {
  let config = home.join("config.json");
  if !config.exists() {
    std::fs::write(&config, "{}").unwrap();
  }

  Command::new(env!("CARGO_BIN_EXE_fadm"))
    .arg("--config")
    .arg(&config)
    .arg("--repository")
    .arg(home.join("repo"))
    .args(args)
    .env_remove("FADM_SOURCE")
    .env_remove("RUST_LOG")
    .output()
    .unwrap()
}

#[test]
fn test_error_root_exits_with_failure() {
  let temp = TempDir::new().unwrap();
  let missing = temp.path().join("Missing.dll");

  let output = fadm(temp.path(), &["install", missing.to_str().unwrap()]);

  assert_eq!(output.status.code(), Some(1));
  assert_eq!(
    String::from_utf8(output.stdout).unwrap(),
    format!("[Error] The file '{}' doesn't exist\n", missing.display())
  );
}

#[test]
fn test_add_renders_trace() {
  let temp = TempDir::new().unwrap();
  let project = temp.path().join("App.csproj");
  std::fs::write(&project, PROJECT).unwrap();

  let output = fadm(temp.path(), &["add", project.to_str().unwrap()]);
  assert!(output.status.success());

  let stdout = String::from_utf8(output.stdout).unwrap();
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(lines.len(), 6);
  assert_eq!(
    lines[0],
    format!("[Success] File processed: '{}'", project.display())
  );
  assert!(lines[1..].iter().all(|line| line.starts_with("\t[Success] ")));

  // A warning does not change the exit status.
  let output = fadm(temp.path(), &["add", project.to_str().unwrap()]);
  assert!(output.status.success());
  assert!(String::from_utf8(output.stdout).unwrap().starts_with("[Warning] Nothing to do"));
}

#[test]
fn test_json_output() {
  let temp = TempDir::new().unwrap();
  let project = temp.path().join("app");
  std::fs::create_dir_all(&project).unwrap();
  std::fs::write(
    project.join("fadm.xml"),
    r#"<Project xmlns="urn:project-schema"><Dependencies><Dependency><Name>Missing</Name><Version>1.0</Version></Dependency></Dependencies></Project>"#,
  )
  .unwrap();

  let output = fadm(temp.path(), &["--json", "copy", project.to_str().unwrap()]);
  assert!(output.status.success());

  let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(tree["status"], "Success");
  assert_eq!(tree["children"][0]["status"], "Error");
  assert_eq!(tree["children"][0]["message"], "Dependency 'Missing' 1.0 unknown");
  assert!(tree["children"][0].get("children").is_none());
}

#[test]
fn test_missing_explicit_config_fails() {
  let temp = TempDir::new().unwrap();
  let output = Command::new(env!("CARGO_BIN_EXE_fadm"))
    .arg("--config")
    .arg(temp.path().join("nope.json"))
    .args(["copy", "."])
    .output()
    .unwrap();

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load configuration"));
}
