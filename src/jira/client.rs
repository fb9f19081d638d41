//! Jira client boundary.
//!
//! The reporter consumes the tracker through the narrow [`JiraApi`]
//! trait: connect, list priorities, create-or-attach an issue by
//! content hash, attach comments, link to an epic. [`HttpJiraClient`]
//! is the blocking REST implementation; tests substitute their own.
//!
//! Create-or-attach dedup is a tracker-side capability: the content
//! hash travels as a ticket label and an existing open ticket carrying
//! it is attached instead of creating a duplicate.

use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

use crate::config::JiraTargetConfig;
use crate::error::{Error, Result};

/// Read view of a tracker issue, as much of it as the reporter needs.
#[derive(Debug, Clone)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    /// ISO-8601 creation timestamp with microseconds and offset, as the
    /// tracker reports it.
    pub created: String,
}

/// One create-or-attach request.
#[derive(Debug)]
pub struct IssueRequest<'a> {
    pub title: &'a str,
    pub priority: &'a str,
    pub description: &'a str,
    pub issue_hash: &'a str,
    pub additional_labels: &'a [String],
    pub field_overrides: &'a serde_json::Map<String, Value>,
}

/// Narrow tracker interface the reporter depends on.
pub trait JiraApi {
    /// Connects and validates credentials. Idempotent; invoked once per
    /// target before the finding loop.
    fn connect(&mut self) -> Result<()>;

    /// Priority names the instance offers, most severe first.
    fn priorities(&self) -> Result<Vec<String>>;

    /// Creates an issue, or attaches to an existing one carrying the
    /// same content hash. Returns the issue and whether it was newly
    /// created.
    fn create_issue(&self, request: &IssueRequest<'_>) -> Result<(Issue, bool)>;

    /// Adds one comment to an issue.
    fn add_comment(&self, issue: &Issue, body: &str) -> Result<()>;

    /// Links issues to a parent epic.
    fn add_issues_to_epic(&self, epic_key: &str, issue_keys: &[String]) -> Result<()>;
}

enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

/// Blocking REST implementation of [`JiraApi`].
pub struct HttpJiraClient {
    client: Client,
    base_url: String,
    auth: Auth,
    project: String,
    fields_template: serde_json::Map<String, Value>,
    /// Display name → field id, resolved at connect time.
    field_ids: std::collections::BTreeMap<String, String>,
    priority_names: Vec<String>,
}

impl HttpJiraClient {
    /// Builds a client from target configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTarget`] when the target is missing its
    /// URL, project, or credentials — a fatal configuration error.
    pub fn new(target: &JiraTargetConfig, fields_template: serde_json::Map<String, Value>) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidTarget {
            target: target.url.clone(),
            reason: reason.to_string(),
        };

        if target.url.is_empty() {
            return Err(invalid("url is not set"));
        }
        if target.project.is_empty() {
            return Err(invalid("project is not set"));
        }
        let auth = match (&target.username, &target.password, &target.token) {
            (Some(username), Some(password), _) => Auth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            (_, _, Some(token)) => Auth::Bearer(token.clone()),
            _ => return Err(invalid("no credentials: set username/password or token")),
        };

        Ok(HttpJiraClient {
            client: Client::new(),
            base_url: target.url.trim_end_matches('/').to_string(),
            auth,
            project: target.project.clone(),
            fields_template,
            field_ids: std::collections::BTreeMap::new(),
            priority_names: Vec::new(),
        })
    }

    fn get(&self, endpoint: &str) -> Result<Value> {
        let request = self.client.get(format!("{}{}", self.base_url, endpoint));
        parse_json_response(self.authorize(request).send()?)
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let request = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .json(body);
        parse_json_response(self.authorize(request).send()?)
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.auth {
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Bearer(token) => request.bearer_auth(token),
        }
    }

    /// Maps a field template entry onto the create payload.
    ///
    /// Standard name-keyed fields get their `{"name": ...}` wrapper;
    /// anything else is resolved through the instance's field registry
    /// and passed through untouched.
    fn apply_template_field(&self, fields: &mut serde_json::Map<String, Value>, name: &str, value: &Value) {
        match name.to_lowercase().as_str() {
            "issue type" | "issuetype" => {
                fields.insert("issuetype".to_string(), json!({ "name": value }));
            }
            "assignee" => {
                fields.insert("assignee".to_string(), json!({ "name": value }));
            }
            "security level" => {
                fields.insert("security".to_string(), json!({ "name": value }));
            }
            _ => {
                let id = self
                    .field_ids
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| name.to_string());
                fields.insert(id, value.clone());
            }
        }
    }

    fn find_by_hash(&self, issue_hash: &str) -> Result<Option<Issue>> {
        let jql = format!(
            "project = \"{}\" AND labels = \"{}\" ORDER BY created ASC",
            self.project, issue_hash
        );
        let response = self.post(
            "/rest/api/2/search",
            &json!({
                "jql": jql,
                "maxResults": 1,
                "fields": ["summary", "status", "priority", "assignee", "created"],
            }),
        )?;
        Ok(response["issues"]
            .as_array()
            .and_then(|issues| issues.first())
            .map(parse_issue))
    }
}

impl JiraApi for HttpJiraClient {
    fn connect(&mut self) -> Result<()> {
        // Credential check; a 401/403 here is a fatal target error.
        self.get("/rest/api/2/myself")?;

        let field_registry = self.get("/rest/api/2/field")?;
        if let Some(fields) = field_registry.as_array() {
            for field in fields {
                if let (Some(id), Some(name)) = (field["id"].as_str(), field["name"].as_str()) {
                    self.field_ids.insert(name.to_string(), id.to_string());
                }
            }
        }

        let priorities = self.get("/rest/api/2/priority")?;
        if let Some(priorities) = priorities.as_array() {
            self.priority_names = priorities
                .iter()
                .filter_map(|p| p["name"].as_str().map(str::to_string))
                .collect();
        }
        Ok(())
    }

    fn priorities(&self) -> Result<Vec<String>> {
        Ok(self.priority_names.clone())
    }

    fn create_issue(&self, request: &IssueRequest<'_>) -> Result<(Issue, bool)> {
        if let Some(existing) = self.find_by_hash(request.issue_hash)? {
            return Ok((existing, false));
        }

        let mut fields = serde_json::Map::new();
        fields.insert("project".to_string(), json!({ "key": self.project }));
        fields.insert("summary".to_string(), json!(request.title));
        fields.insert("description".to_string(), json!(request.description));
        fields.insert("priority".to_string(), json!({ "name": request.priority }));

        let mut labels: Vec<&str> = vec![request.issue_hash];
        labels.extend(request.additional_labels.iter().map(String::as_str));
        fields.insert("labels".to_string(), json!(labels));

        for (name, value) in &self.fields_template {
            self.apply_template_field(&mut fields, name, value);
        }
        for (name, value) in request.field_overrides {
            self.apply_template_field(&mut fields, name, value);
        }

        let created = self.post("/rest/api/2/issue", &json!({ "fields": fields }))?;
        let key = created["key"].as_str().ok_or_else(|| Error::Api {
            status: 200,
            body: "create response carried no issue key".to_string(),
        })?;

        let issue = parse_issue(&self.get(&format!(
            "/rest/api/2/issue/{key}?fields=summary,status,priority,assignee,created"
        ))?);
        Ok((issue, true))
    }

    fn add_comment(&self, issue: &Issue, body: &str) -> Result<()> {
        self.post(
            &format!("/rest/api/2/issue/{}/comment", issue.key),
            &json!({ "body": body }),
        )?;
        Ok(())
    }

    fn add_issues_to_epic(&self, epic_key: &str, issue_keys: &[String]) -> Result<()> {
        self.post(
            &format!("/rest/agile/1.0/epic/{epic_key}/issue"),
            &json!({ "issues": issue_keys }),
        )?;
        Ok(())
    }
}

fn parse_issue(value: &Value) -> Issue {
    let fields = &value["fields"];
    Issue {
        key: value["key"].as_str().unwrap_or_default().to_string(),
        summary: fields["summary"].as_str().unwrap_or_default().to_string(),
        status: fields["status"]["name"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        priority: fields["priority"]["name"].as_str().map(str::to_string),
        assignee: fields["assignee"]["displayName"]
            .as_str()
            .or_else(|| fields["assignee"]["name"].as_str())
            .map(str::to_string),
        created: fields["created"].as_str().unwrap_or_default().to_string(),
    }
}

fn parse_json_response(response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }
    if body.trim().is_empty() {
        // Some endpoints (epic linkage) answer 204 with no body.
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(Error::from)
}
