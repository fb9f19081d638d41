//! Engagement/issues endpoint reporter.
//!
//! The simple sibling of the Jira path: every finding becomes one flat
//! issue payload (title, HTML-rendered description, severity) and the
//! whole batch goes out in a single `create_issues` call. No chunking,
//! no routing, and no per-item error isolation — a bulk-submit failure
//! affects the whole batch and cannot be attributed to one finding.

use pulldown_cmark::{html, Parser};
use reqwest::blocking::Client;
use serde_json::json;

use crate::config::EngagementConfig;
use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::report::ReportContext;

/// One issue payload for the engagement endpoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IssuePayload {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub project: Option<String>,
    pub asset: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub engagement: String,
    pub source_type: String,
}

/// Narrow issues-endpoint interface the reporter depends on.
pub trait IssuesApi {
    /// Submits the whole batch in one call.
    fn create_issues(&self, issues: &[IssuePayload]) -> Result<()>;
}

/// Blocking REST implementation of [`IssuesApi`].
pub struct IssuesConnector {
    client: Client,
    url: String,
    token: Option<String>,
}

impl IssuesConnector {
    pub fn new(config: &EngagementConfig) -> Self {
        IssuesConnector {
            client: Client::new(),
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }
}

impl IssuesApi for IssuesConnector {
    fn create_issues(&self, issues: &[IssuePayload]) -> Result<()> {
        let mut request = self
            .client
            .post(format!("{}/api/v1/issues", self.url))
            .json(&json!({ "issues": issues }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Renders a finding description from markdown to HTML.
///
/// Pure text transform; consumed as a boundary capability.
pub fn markdown_to_html(text: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(text));
    out
}

/// Builds the flat payload for one finding.
pub fn issue_payload(finding: &Finding, config: &EngagementConfig) -> IssuePayload {
    let description = match finding {
        Finding::Dast(f) => markdown_to_html(&f.description),
        Finding::Sast(f) => markdown_to_html(&f.description.join("\n\n")),
    };
    IssuePayload {
        title: finding.title().to_string(),
        description,
        severity: finding.severity().to_string(),
        project: config.project_id.clone(),
        asset: None,
        issue_type: "Vulnerability".to_string(),
        engagement: config.engagement_id.clone(),
        source_type: "security".to_string(),
    }
}

/// Reports the whole findings batch to the issues endpoint.
///
/// # Errors
///
/// A failed bulk submit fails the whole batch; there is no per-item
/// attribution on this path.
pub fn report(ctx: &ReportContext, config: &EngagementConfig, api: &dyn IssuesApi) -> Result<usize> {
    let issues: Vec<IssuePayload> = ctx
        .findings
        .iter()
        .map(|finding| issue_payload(finding, config))
        .collect();
    api.create_issues(&issues)?;
    tracing::info!(count = issues.len(), "reported findings to issues endpoint");
    Ok(issues.len())
}
