use std::io::Write;

use vulnrelay::config::{AdditionalLabels, Config, SAMPLE_CONFIG};

const FULL_CONFIG: &str = r#"
testing_type = "DAST"
false_positive_file = "fp.config"

[jira]
url = "https://jira.example.com"
username = "user"
password = "pass"
project = "SEC"
separate_epic_linkage = true
max_description_size = 3000
additional_labels = ["alpha", "beta"]

[jira.fields]
"Issue Type" = "Bug"
"Epic Link" = "SEC-1"

[jira.custom_mapping]
"Blocker" = "Very High"

[[jira.dynamic_labels]]
pattern = "^https://admin\\."
label = "admin-surface"

[[jira.dynamic_fields]]
pattern = "^https://admin\\."
[jira.dynamic_fields.fields]
"customfield_1" = "x"

[[jira.dynamic_jira]]
pattern = "^https://partner\\."
url = "https://jira.partner.example.com"
token = "tok"
project = "PARTNER"

[engagement]
url = "https://centry.example.com"
engagement_id = "42"
"#;

#[test]
fn full_config_parses() {
    let config: Config = toml::from_str(FULL_CONFIG).unwrap();
    assert_eq!(config.testing_type.as_deref(), Some("DAST"));

    let jira = config.jira.as_ref().unwrap();
    assert_eq!(jira.target.url, "https://jira.example.com");
    assert_eq!(jira.target.project, "SEC");
    assert!(jira.target.separate_epic_linkage);
    assert_eq!(jira.target.max_description_size, Some(3000));
    assert_eq!(jira.target.fields["Issue Type"], "Bug");
    assert_eq!(
        jira.target.custom_mapping.get("Blocker").unwrap(),
        "Very High"
    );
    assert_eq!(jira.dynamic_labels.len(), 1);
    assert_eq!(jira.dynamic_labels[0].label, "admin-surface");
    assert_eq!(jira.dynamic_fields[0].fields["customfield_1"], "x");
    assert_eq!(jira.dynamic_jira.len(), 1);
    assert_eq!(jira.dynamic_jira[0].target.project, "PARTNER");
    assert_eq!(jira.dynamic_jira[0].target.token.as_deref(), Some("tok"));

    let engagement = config.engagement.as_ref().unwrap();
    assert_eq!(engagement.engagement_id, "42");

    config.validate().unwrap();
}

#[test]
fn additional_labels_accept_list_or_csv() {
    let list = AdditionalLabels::List(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(list.resolve(), vec!["a", "b"]);

    let csv = AdditionalLabels::Csv(" a, b ,, c".to_string());
    assert_eq!(csv.resolve(), vec!["a", "b", "c"]);
}

#[test]
fn missing_required_target_fields_are_fatal() {
    let config: Config = toml::from_str(
        r#"
        [jira]
        url = "https://jira.example.com"
        username = "user"
        password = "pass"
        "#,
    )
    .unwrap();
    let error = config.validate().unwrap_err().to_string();
    assert!(error.contains("project"), "unexpected message: {error}");
}

#[test]
fn credentials_require_password_or_token() {
    let config: Config = toml::from_str(
        r#"
        [jira]
        url = "https://jira.example.com"
        username = "user"
        project = "SEC"
        "#,
    )
    .unwrap();
    let error = config.validate().unwrap_err().to_string();
    assert!(
        error.contains("username/password or token"),
        "unexpected message: {error}"
    );
}

#[test]
fn dynamic_targets_are_validated_too() {
    let config: Config = toml::from_str(
        r#"
        [jira]
        url = "https://jira.example.com"
        token = "tok"
        project = "SEC"

        [[jira.dynamic_jira]]
        pattern = "^https://partner\\."
        url = "https://jira.partner.example.com"
        "#,
    )
    .unwrap();
    let error = config.validate().unwrap_err().to_string();
    assert!(
        error.contains("dynamic_jira[0]"),
        "unexpected message: {error}"
    );
}

#[test]
fn engagement_requires_url_and_engagement_id() {
    let config: Config = toml::from_str(
        r#"
        [engagement]
        url = "https://centry.example.com"
        "#,
    )
    .unwrap();
    let error = config.validate().unwrap_err().to_string();
    assert!(
        error.contains("engagement_id"),
        "unexpected message: {error}"
    );
}

#[test]
fn empty_config_is_valid_and_reports_nothing() {
    let config: Config = toml::from_str("").unwrap();
    assert!(config.jira.is_none());
    assert!(config.engagement.is_none());
    config.validate().unwrap();
}

#[test]
fn sample_config_parses_and_validates() {
    let config: Config = toml::from_str(SAMPLE_CONFIG).unwrap();
    config.validate().unwrap();
    assert!(config.jira.is_some());
    assert!(config.engagement.is_some());
}

#[test]
fn explicit_missing_path_is_an_error() {
    let error = Config::load(Some(std::path::Path::new("/does/not/exist.toml"))).unwrap_err();
    assert!(error.to_string().contains("not found"));
}

#[test]
fn load_reads_an_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"testing_type = \"SAST\"\n").unwrap();
    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.testing_type.as_deref(), Some("SAST"));
}
