use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn vulnrelay() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("vulnrelay")
}

const VALID_CONFIG: &str = r#"
[jira]
url = "https://jira.example.com"
token = "tok"
project = "SEC"
"#;

#[test]
fn sample_config_prints_a_toml_skeleton() {
    vulnrelay()
        .arg("sample-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[jira]"))
        .stdout(predicate::str::contains("custom_mapping"));
}

#[test]
fn check_config_accepts_a_valid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(VALID_CONFIG.as_bytes()).unwrap();

    vulnrelay()
        .args(["check-config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid."));
}

#[test]
fn check_config_rejects_missing_required_options() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[jira]\nurl = \"https://jira.example.com\"\n")
        .unwrap();

    vulnrelay()
        .args(["check-config", "--config"])
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required configuration options"));
}

#[test]
fn report_nonexistent_findings_exits_2() {
    vulnrelay()
        .args(["report", "does-not-exist.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn report_without_reporters_summarizes_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let findings = dir.path().join("findings.json");
    std::fs::write(&findings, "[]").unwrap();
    let config = dir.path().join("vulnrelay.toml");
    std::fs::write(&config, "# empty\n").unwrap();

    vulnrelay()
        .arg("report")
        .arg(&findings)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reporting Summary"));
}

#[test]
fn report_emits_json_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let findings = dir.path().join("findings.json");
    std::fs::write(&findings, "[]").unwrap();
    let config = dir.path().join("vulnrelay.toml");
    std::fs::write(&config, "").unwrap();

    vulnrelay()
        .arg("report")
        .arg(&findings)
        .args(["--config"])
        .arg(&config)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"findings\": 0"));
}

#[test]
fn report_rejects_malformed_findings() {
    let dir = tempfile::tempdir().unwrap();
    let findings = dir.path().join("findings.json");
    std::fs::write(&findings, "{not json").unwrap();

    vulnrelay()
        .arg("report")
        .arg(&findings)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error reading findings"));
}
