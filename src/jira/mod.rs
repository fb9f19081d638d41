//! Jira reporter.
//!
//! The heaviest reporting path: maps severities to ticket priorities,
//! chunks oversized descriptions into a body plus follow-up comments,
//! routes findings to alternate targets by endpoint pattern, submits
//! create-or-attach requests, and aggregates the outcome as new vs
//! pre-existing ticket sets.
//!
//! Per-finding failures are converted into
//! [`ErrorRecord`](crate::finding::ErrorRecord)s and never abort the
//! remaining findings. Configuration problems (an unusable target) are
//! fatal and abort the run before any submission.

pub mod chunk;
pub mod client;
pub mod mapping;
pub mod routing;

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::config::{JiraConfig, JiraTargetConfig};
use crate::error::Result;
use crate::finding::{ErrorRecord, Finding, Severity};
use crate::report::ReportContext;

use client::{HttpJiraClient, Issue, IssueRequest, JiraApi};
use routing::RoutingRules;

/// Tracker statuses under which a pre-existing ticket still counts as
/// open and lands in the existing-tickets set.
pub const JIRA_OPENED_STATUSES: [&str; 2] = ["Open", "In Progress"];

/// The outcome of one submitted (or attached) ticket.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TicketRecord {
    pub jira_id: String,
    pub jira_url: String,
    pub priority: String,
    pub status: String,
    pub created: String,
    /// Human-formatted creation time (`%d %b %Y %H:%M`).
    pub open_date: String,
    pub summary: String,
    pub assignee: String,
    pub raw_severity: String,
    pub raw_jira_url: String,
    pub raw_jira_project: String,
    pub raw_jira_epic: Option<String>,
    pub raw_jira_fields: serde_json::Map<String, Value>,
    pub raw_addon_fields: serde_json::Map<String, Value>,
    pub raw_addon_labels: Vec<String>,
}

/// Aggregated outcome of the Jira reporting pass.
#[derive(Debug, Default, serde::Serialize)]
pub struct JiraReportOutcome {
    /// Tickets created by this run. No id appears twice.
    pub new_tickets: Vec<TicketRecord>,
    /// Pre-existing tickets that are still open. No id appears twice.
    pub existing_tickets: Vec<TicketRecord>,
    /// Per-finding failures; the batch continued past each of them.
    pub errors: Vec<ErrorRecord>,
    /// Realized severity → priority mapping for the default target,
    /// including values substituted during processing.
    pub mapping: BTreeMap<String, String>,
}

/// One resolved tracker target for the duration of a run.
struct Target {
    config: JiraTargetConfig,
    client: Box<dyn JiraApi>,
    /// Field template actually applied (minus `Epic Link` when epic
    /// linkage runs as a separate step).
    fields: serde_json::Map<String, Value>,
    /// Epic to link new tickets to, when linkage is a separate step.
    epic_link: Option<String>,
    /// Epic reference for outcome metadata, regardless of linkage mode.
    raw_epic_link: Option<String>,
    /// Priority remap: configured custom mapping, or derived from the
    /// tracker's available priorities.
    remap: Option<BTreeMap<String, String>>,
    /// Realized severity → priority values, updated per finding.
    mapping_meta: BTreeMap<String, String>,
}

/// A finding after filtering, routing, mapping and chunking — ready to
/// submit.
struct Prepared {
    title: String,
    priority: String,
    description: String,
    comments: Vec<String>,
    issue_hash: String,
    labels: Vec<String>,
    field_sets: Vec<serde_json::Map<String, Value>>,
    target: usize,
    severity: Severity,
    tool: String,
}

/// Factory building a tracker client for a target; the seam tests use
/// to substitute the HTTP implementation.
pub type ClientFactory<'a> =
    &'a dyn Fn(&JiraTargetConfig, &serde_json::Map<String, Value>) -> Result<Box<dyn JiraApi>>;

/// Runs the Jira reporting pass with the blocking HTTP client.
pub fn report(ctx: &ReportContext, config: &JiraConfig) -> Result<JiraReportOutcome> {
    report_with(ctx, config, &|target: &JiraTargetConfig,
                               fields: &serde_json::Map<String, Value>| {
        HttpJiraClient::new(target, fields.clone()).map(|c| Box::new(c) as Box<dyn JiraApi>)
    })
}

/// Runs the Jira reporting pass with a caller-supplied client factory.
pub fn report_with(
    ctx: &ReportContext,
    config: &JiraConfig,
    make_client: ClientFactory<'_>,
) -> Result<JiraReportOutcome> {
    if config.dynamic_jira.is_empty() {
        tracing::info!("using normal Jira reporting");
    } else {
        tracing::info!(
            targets = config.dynamic_jira.len() + 1,
            "using multi-target Jira reporting"
        );
    }

    let mut targets = Vec::with_capacity(config.dynamic_jira.len() + 1);
    targets.push(build_target(&config.target, make_client)?);
    let mut target_patterns = Vec::with_capacity(config.dynamic_jira.len());
    for rule in &config.dynamic_jira {
        target_patterns.push(rule.pattern.clone());
        targets.push(build_target(&rule.target, make_client)?);
    }

    // One connect per target, before the finding loop.
    for target in &mut targets {
        target.client.connect()?;
        if target.remap.is_none() {
            let priorities = target.client.priorities().unwrap_or_default();
            target.remap = mapping::derive_tracker_mapping(&priorities);
        }
        if let Some(remap) = &target.remap {
            target.mapping_meta = remap.clone();
        }
    }

    let rules = RoutingRules::compile(
        &config.dynamic_labels,
        &config.dynamic_fields,
        &target_patterns,
    );

    let mut prepared = prepare_findings(ctx, &rules, &mut targets);

    // Second, independent cut against the configured body maximum.
    for finding in &mut prepared {
        if let Some(max_size) = targets[finding.target].config.max_description_size {
            chunk::apply_configured_cut(&mut finding.description, &mut finding.comments, max_size);
        }
    }

    // Severity rank first, then tool, then title.
    prepared.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| a.tool.cmp(&b.tool))
            .then_with(|| a.title.cmp(&b.title))
    });

    let mut outcome = JiraReportOutcome::default();
    for finding in &prepared {
        let target = &targets[finding.target];
        match submit_finding(finding, target) {
            Ok((record, created)) => {
                if created {
                    push_unique(&mut outcome.new_tickets, record);
                } else if JIRA_OPENED_STATUSES.contains(&record.status.as_str())
                    && !contains_id(&outcome.new_tickets, &record.jira_id)
                {
                    // The sets are disjoint: a ticket created earlier in
                    // this run stays in the new set only.
                    push_unique(&mut outcome.existing_tickets, record);
                }
            }
            Err(e) => {
                tracing::error!(title = %finding.title, error = %e, "failed to create ticket");
                outcome.errors.push(ErrorRecord::new(
                    "Jira",
                    format!("Failed to create ticket for {}", finding.title),
                    e.to_string(),
                ));
            }
        }
    }

    outcome.mapping = targets[0].mapping_meta.clone();
    Ok(outcome)
}

fn build_target(config: &JiraTargetConfig, make_client: ClientFactory<'_>) -> Result<Target> {
    let mut fields = config.fields.clone();

    let epic_link = if config.separate_epic_linkage {
        fields.remove("Epic Link").map(|v| value_to_label(&v))
    } else {
        None
    };
    let raw_epic_link = if config.separate_epic_linkage {
        epic_link.clone()
    } else {
        fields.get("Epic Link").map(value_to_label)
    };

    let client = make_client(config, &fields)?;
    let remap = if config.custom_mapping.is_empty() {
        None
    } else {
        Some(config.custom_mapping.clone())
    };
    let mapping_meta = remap.clone().unwrap_or_default();

    Ok(Target {
        config: config.clone(),
        client,
        fields,
        epic_link,
        raw_epic_link,
        remap,
        mapping_meta,
    })
}

fn prepare_findings(
    ctx: &ReportContext,
    rules: &RoutingRules,
    targets: &mut [Target],
) -> Vec<Prepared> {
    let mut prepared = Vec::new();
    for finding in &ctx.findings {
        if finding.is_filtered() {
            continue;
        }

        let route = rules.route(&finding.meta().endpoints);
        // Pattern index p selects targets[p + 1]; 0 is the default.
        let target_index = route.target.map_or(0, |p| p + 1);

        let severity = finding.severity();
        let priority = mapping::resolve_priority(severity, targets[target_index].remap.as_ref());
        targets[target_index]
            .mapping_meta
            .insert(severity.to_string(), priority.clone());

        let (description, comments) = match finding {
            Finding::Dast(f) => (chunk::unescape_periods(&f.description), Vec::new()),
            Finding::Sast(f) => {
                let fragments: Vec<String> = f
                    .description
                    .iter()
                    .map(|fragment| chunk::normalize_fragment(fragment))
                    .collect();
                chunk::chunk_fragments(&fragments)
            }
        };

        let testing_type = ctx
            .testing_type
            .clone()
            .unwrap_or_else(|| finding.kind_label().to_string());
        let mut labels: Vec<String> = [finding.tool(), testing_type.as_str(), severity.as_str()]
            .iter()
            .map(|label| label.replace(' ', "_"))
            .collect();
        labels.extend(route.labels);

        prepared.push(Prepared {
            title: finding.title().to_string(),
            priority,
            description,
            comments,
            issue_hash: finding.hash_code(),
            labels,
            field_sets: route.fields,
            target: target_index,
            severity,
            tool: finding.tool().to_string(),
        });
    }
    prepared
}

fn submit_finding(finding: &Prepared, target: &Target) -> Result<(TicketRecord, bool)> {
    let config_labels = target
        .config
        .additional_labels
        .as_ref()
        .map(|labels| labels.resolve())
        .unwrap_or_default();

    // Later dynamic-field sets overwrite earlier keys on conflict.
    let mut field_overrides = serde_json::Map::new();
    for set in &finding.field_sets {
        for (key, value) in set {
            field_overrides.insert(key.clone(), value.clone());
        }
    }

    // Union of computed and configured labels, first occurrence wins.
    let mut labels = finding.labels.clone();
    labels.extend(config_labels);
    let mut seen = HashSet::new();
    labels.retain(|label| seen.insert(label.clone()));

    let (issue, created) = target.client.create_issue(&IssueRequest {
        title: &finding.title,
        priority: &finding.priority,
        description: &finding.description,
        issue_hash: &finding.issue_hash,
        additional_labels: &labels,
        field_overrides: &field_overrides,
    })?;

    if created {
        for comment in &finding.comments {
            target.client.add_comment(&issue, comment)?;
        }
        if target.config.separate_epic_linkage {
            if let Some(epic) = &target.epic_link {
                if let Err(e) = target.client.add_issues_to_epic(epic, &[issue.key.clone()]) {
                    tracing::warn!(
                        issue = %issue.key,
                        epic = %epic,
                        error = %e,
                        "failed to add ticket to epic"
                    );
                }
            }
        }
    }

    Ok((ticket_record(&issue, finding, target, field_overrides, labels), created))
}

fn ticket_record(
    issue: &Issue,
    finding: &Prepared,
    target: &Target,
    field_overrides: serde_json::Map<String, Value>,
    labels: Vec<String>,
) -> TicketRecord {
    let base_url = target.config.url.trim_end_matches('/');
    TicketRecord {
        jira_id: issue.key.clone(),
        jira_url: format!("{base_url}/browse/{}", issue.key),
        priority: issue
            .priority
            .clone()
            .unwrap_or_else(|| "Default".to_string()),
        status: issue.status.clone(),
        created: issue.created.clone(),
        open_date: format_open_date(&issue.created),
        summary: issue.summary.clone(),
        assignee: issue.assignee.clone().unwrap_or_default(),
        raw_severity: finding.severity.to_string(),
        raw_jira_url: target.config.url.clone(),
        raw_jira_project: target.config.project.clone(),
        raw_jira_epic: target.raw_epic_link.clone(),
        raw_jira_fields: target.fields.clone(),
        raw_addon_fields: field_overrides,
        raw_addon_labels: labels,
    }
}

/// Formats a tracker creation timestamp for humans, falling back to the
/// raw string when it does not parse.
fn format_open_date(created: &str) -> String {
    chrono::DateTime::parse_from_str(created, "%Y-%m-%dT%H:%M:%S%.f%z")
        .map(|stamp| stamp.format("%d %b %Y %H:%M").to_string())
        .unwrap_or_else(|_| created.to_string())
}

fn contains_id(records: &[TicketRecord], jira_id: &str) -> bool {
    records.iter().any(|r| r.jira_id == jira_id)
}

/// Appends a record unless its ticket id is already present.
fn push_unique(records: &mut Vec<TicketRecord>, record: TicketRecord) {
    if !contains_id(records, &record.jira_id) {
        records.push(record);
    }
}

fn value_to_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_date_formats_tracker_timestamps() {
        assert_eq!(
            format_open_date("2026-03-01T12:30:00.000000+0300"),
            "01 Mar 2026 12:30"
        );
        // Unparseable stamps pass through untouched.
        assert_eq!(format_open_date("not-a-date"), "not-a-date");
    }
}
