//! Configuration loading and validation.
//!
//! Provides types for the TOML-based configuration file that wires
//! findings to the configured reporters.
//!
//! # Configuration file
//!
//! The default configuration file is `vulnrelay.toml` in the current
//! working directory. Use [`Config::load`] to read it:
//!
//! ```rust,no_run
//! use vulnrelay::config::Config;
//!
//! let config = Config::load(None).expect("failed to load config");
//! config.validate().expect("invalid config");
//! ```
//!
//! # Validation
//!
//! [`Config::validate`] implements the fatal/config error class: missing
//! required target fields abort the run before any submission attempt.
//! Per-finding and per-rule problems are handled later, by the
//! reporters, and never abort a run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration for a reporting run.
///
/// All sections are optional; a reporter whose section is absent is
/// simply skipped by the fan-out with a diagnostic message.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Testing-type label applied to tickets alongside tool and
    /// severity. Defaults to the finding kind (`DAST` / `SAST`).
    pub testing_type: Option<String>,
    /// Newline-delimited list of accepted false-positive hashes.
    /// Defaults to [`crate::util::FALSE_POSITIVE_CONFIG`].
    pub false_positive_file: Option<PathBuf>,
    /// Jira reporter configuration.
    pub jira: Option<JiraConfig>,
    /// Engagement/issues endpoint reporter configuration.
    pub engagement: Option<EngagementConfig>,
}

/// Jira reporter configuration: the default target plus the dynamic
/// (pattern-keyed) routing rules.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct JiraConfig {
    /// The default target. Exactly one default always exists; dynamic
    /// rules may override it per finding.
    #[serde(flatten)]
    pub target: JiraTargetConfig,
    /// Endpoint-pattern → additional ticket label.
    pub dynamic_labels: Vec<LabelRule>,
    /// Endpoint-pattern → additional field overrides.
    pub dynamic_fields: Vec<FieldRule>,
    /// Endpoint-pattern → alternate target. Declared as an ordered
    /// array; when several rules match a finding the **last** matching
    /// rule wins.
    pub dynamic_jira: Vec<TargetRule>,
}

/// One configured connection to a Jira instance.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct JiraTargetConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// API token, as an alternative to username/password.
    pub token: Option<String>,
    pub project: String,
    /// Field template applied to every created ticket. May include an
    /// `Epic Link` entry; see `separate_epic_linkage`.
    pub fields: serde_json::Map<String, serde_json::Value>,
    /// Remaps the default severity→priority table's *output* (priority
    /// name → priority name). When empty, a remap is derived from the
    /// tracker's available priorities instead.
    pub custom_mapping: BTreeMap<String, String>,
    /// When set, the `Epic Link` field is removed from the template and
    /// tickets are linked to the epic in a separate call after creation.
    pub separate_epic_linkage: bool,
    /// Cut descriptions longer than this many characters; the remainder
    /// is carried in follow-up comments.
    pub max_description_size: Option<usize>,
    /// Extra labels for every ticket: a list, or a comma-separated
    /// string.
    pub additional_labels: Option<AdditionalLabels>,
}

/// Extra ticket labels, accepted as either a TOML array or a
/// comma-separated string.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum AdditionalLabels {
    List(Vec<String>),
    Csv(String),
}

impl AdditionalLabels {
    /// Normalizes to a trimmed label list.
    pub fn resolve(&self) -> Vec<String> {
        match self {
            AdditionalLabels::List(items) => items.clone(),
            AdditionalLabels::Csv(csv) => csv
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

/// Endpoint-pattern → additional label rule.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct LabelRule {
    pub pattern: String,
    pub label: String,
}

/// Endpoint-pattern → field-override rule.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct FieldRule {
    pub pattern: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Endpoint-pattern → alternate Jira target rule.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct TargetRule {
    pub pattern: String,
    #[serde(flatten)]
    pub target: JiraTargetConfig,
}

/// Engagement/issues endpoint configuration.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Base URL of the issues REST API.
    pub url: String,
    /// Token for authentication.
    pub token: Option<String>,
    /// Engagement id under which the tests were executed.
    pub engagement_id: String,
    /// Optional project id to report to.
    pub project_id: Option<String>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. If `path` is `None`, try `vulnrelay.toml` in the current directory.
    /// 3. If that file does not exist either, return [`Config::default()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the explicit path does not exist,
    /// the file cannot be read, or the TOML fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config_path = if let Some(p) = path {
            if p.exists() {
                Some(p.to_path_buf())
            } else {
                return Err(Error::config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
        } else {
            let default_path = Path::new("vulnrelay.toml");
            if default_path.exists() {
                Some(default_path.to_path_buf())
            } else {
                None
            }
        };

        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::config(format!("Failed to read config {}: {}", path.display(), e))
                })?;
                let config: Config = toml::from_str(&content).map_err(|e| {
                    Error::config(format!("Failed to parse config {}: {}", path.display(), e))
                })?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    /// Validates required options for every configured reporter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the missing options. This is a
    /// fatal error: nothing is submitted from a run with an invalid
    /// configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(jira) = &self.jira {
            validate_target(&jira.target, "jira")?;
            for (index, rule) in jira.dynamic_jira.iter().enumerate() {
                if rule.pattern.is_empty() {
                    return Err(Error::config(format!(
                        "jira.dynamic_jira[{index}]: pattern must not be empty"
                    )));
                }
                validate_target(&rule.target, &format!("jira.dynamic_jira[{index}]"))?;
            }
        }
        if let Some(engagement) = &self.engagement {
            let mut not_set = Vec::new();
            if engagement.url.is_empty() {
                not_set.push("url");
            }
            if engagement.engagement_id.is_empty() {
                not_set.push("engagement_id");
            }
            if !not_set.is_empty() {
                return Err(Error::config(format!(
                    "engagement: required configuration options not set: {}",
                    not_set.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn validate_target(target: &JiraTargetConfig, section: &str) -> Result<()> {
    let mut not_set = Vec::new();
    if target.url.is_empty() {
        not_set.push("url");
    }
    if target.project.is_empty() {
        not_set.push("project");
    }
    let has_basic = target.username.is_some() && target.password.is_some();
    if !has_basic && target.token.is_none() {
        not_set.push("username/password or token");
    }
    if not_set.is_empty() {
        Ok(())
    } else {
        Err(Error::config(format!(
            "{section}: required configuration options not set: {}",
            not_set.join(", ")
        )))
    }
}

/// Commented sample configuration, printed by `vulnrelay sample-config`.
pub const SAMPLE_CONFIG: &str = r#"# vulnrelay sample configuration

# Label applied to tickets alongside tool and severity.
# Defaults to the finding kind (DAST / SAST) when unset.
# testing_type = "DAST"

# Accepted false positives, one content hash per line.
# false_positive_file = "false_positive.config"

[jira]
url = "https://jira.example.com"   # Jira URL
username = "some_username"         # Jira login
password = "SomeSecurePassword"    # Jira password
# token = "..."                    # or: API token instead of username/password
project = "SOME-PROJECT"           # Jira project key
separate_epic_linkage = false      # (optional) link to epic after ticket creation
# max_description_size = 3000      # (optional) cut descriptions longer than this
# additional_labels = "one, two"   # (optional) list or comma-separated string

# Field template for created tickets
[jira.fields]
"Issue Type" = "Bug"
"Assignee" = "Ticket_Assignee"
"Epic Link" = "SOMEPROJECT-1234"
"Security Level" = "SOME_LEVEL"

# (optional) custom priority mapping, remaps the default table's output
[jira.custom_mapping]
"Blocker" = "Very High"
"Critical" = "High"
"Major" = "Medium"
"Minor" = "Low"
"Trivial" = "Low"

# (optional) endpoint-pattern keyed additions
# [[jira.dynamic_labels]]
# pattern = "^https://admin\\."
# label = "admin-surface"

# [[jira.dynamic_fields]]
# pattern = "^https://admin\\."
# [jira.dynamic_fields.fields]
# "Components/s" = [{ name = "Admin" }]

# (optional, multi-target mode) route matching findings to another instance;
# the last matching rule wins
# [[jira.dynamic_jira]]
# pattern = "^https://partner\\."
# url = "https://jira.partner.example.com"
# username = "partner_username"
# password = "PartnerPassword"
# project = "PARTNER"

[engagement]
url = "https://centry.example.com" # REST API for reporting
token = ""                         # token for authentication
engagement_id = "1"                # engagement id under which tests run
"#;
