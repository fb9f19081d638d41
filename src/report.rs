//! Run orchestration: false-positive filtering, reporter fan-out, and
//! outcome rendering.
//!
//! A run owns its accumulators (ticket sets, error list, realized
//! mapping) through [`RunOutcome`]; nothing is shared across
//! invocations. Reporters run strictly in sequence. Each dispatcher is
//! guarded by the presence of its configuration section and skips with
//! a diagnostic when unconfigured; fatal configuration errors abort
//! before any submission.

use std::path::PathBuf;

use colored::Colorize;

use crate::config::Config;
use crate::email::EmailService;
use crate::engagement::{self, IssuesConnector};
use crate::error::Result;
use crate::finding::{ErrorRecord, Finding};
use crate::jira::{self, JiraReportOutcome};
use crate::util;

/// Per-run context handed to each reporter.
///
/// Replaces shared mutable configuration state: owned by the reporting
/// invocation, dropped with it.
#[derive(Debug, Default)]
pub struct ReportContext {
    pub findings: Vec<Finding>,
    /// Testing-type ticket label; defaults per finding kind when unset.
    pub testing_type: Option<String>,
}

/// Aggregated outcome of one reporting run.
#[derive(Debug, Default, serde::Serialize)]
pub struct RunOutcome {
    /// Findings that survived false-positive filtering.
    pub findings: usize,
    pub jira: Option<JiraReportOutcome>,
    /// Number of findings submitted to the engagement endpoint.
    pub engagement_submitted: Option<usize>,
    /// Run-level failures (unattributed engagement batch, email).
    pub errors: Vec<ErrorRecord>,
}

impl RunOutcome {
    /// Total error count across the run and all reporters.
    pub fn error_count(&self) -> usize {
        self.errors.len()
            + self
                .jira
                .as_ref()
                .map(|outcome| outcome.errors.len())
                .unwrap_or(0)
    }
}

/// Runs the full reporting pipeline over a findings batch.
///
/// Control flow: false-positive filter → Jira → engagement → email.
/// Reporters whose configuration section is absent are skipped with a
/// diagnostic. Jira configuration/connection failures are fatal; an
/// engagement bulk failure and email failures are recorded on the
/// outcome and do not stop the run.
pub fn run_report(
    findings: Vec<Finding>,
    config: &Config,
    email: Option<&dyn EmailService>,
    attachments: &[PathBuf],
) -> Result<RunOutcome> {
    config.validate()?;

    let fp_path = config
        .false_positive_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(util::FALSE_POSITIVE_CONFIG));
    let findings = util::process_false_positives(findings, &fp_path);

    let ctx = ReportContext {
        findings,
        testing_type: config.testing_type.clone(),
    };
    let mut outcome = RunOutcome {
        findings: ctx.findings.len(),
        ..RunOutcome::default()
    };

    match &config.jira {
        Some(jira_config) => {
            outcome.jira = Some(jira::report(&ctx, jira_config)?);
        }
        None => tracing::info!("no Jira configuration, skipping Jira reporting"),
    }

    match &config.engagement {
        Some(engagement_config) => {
            let connector = IssuesConnector::new(engagement_config);
            match engagement::report(&ctx, engagement_config, &connector) {
                Ok(submitted) => outcome.engagement_submitted = Some(submitted),
                Err(e) => {
                    // One bulk call: the failure covers the whole batch
                    // and cannot be pinned to a single finding.
                    tracing::error!(error = %e, "engagement bulk submit failed");
                    outcome.errors.push(ErrorRecord::new(
                        "Engagement",
                        format!("Bulk submit failed for {} findings", ctx.findings.len()),
                        e.to_string(),
                    ));
                }
            }
        }
        None => tracing::info!("no engagement configuration, skipping engagement reporting"),
    }

    if let Some(service) = email {
        let tickets = outcome
            .jira
            .as_ref()
            .map(|o| o.new_tickets.as_slice())
            .unwrap_or_default();
        if let Err(e) = crate::email::send_emails(service, config.jira.is_some(), tickets, attachments)
        {
            tracing::error!(error = %e, "failed to send notification email");
            outcome.errors.push(ErrorRecord::new(
                "Email",
                "Failed to send notification email",
                e.to_string(),
            ));
        }
    }

    Ok(outcome)
}

/// Supported output formats for the run outcome.
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

/// Renders a [`RunOutcome`] in the requested [`OutputFormat`].
pub fn format_outcome(outcome: &RunOutcome, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format_pretty(outcome),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(outcome).unwrap_or_default();
            out.push('\n');
            out
        }
    }
}

fn format_pretty(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    let separator = "─".repeat(54);

    out.push_str(&format!(
        "{}\n",
        format!("  Reporting Summary  ({} findings)", outcome.findings)
            .bold()
            .underline()
    ));
    out.push_str(&format!("{}\n", separator.dimmed()));

    if let Some(jira) = &outcome.jira {
        for ticket in &jira.new_tickets {
            out.push_str(&format!(
                "  {}  {:<12} {:<10} {}\n",
                "+".green().bold(),
                ticket.jira_id,
                ticket.priority,
                ticket.summary,
            ));
        }
        for ticket in &jira.existing_tickets {
            out.push_str(&format!(
                "  {}  {:<12} {:<10} {}\n",
                "=".yellow(),
                ticket.jira_id,
                ticket.priority,
                ticket.summary,
            ));
        }
        if !jira.mapping.is_empty() {
            let mapping: Vec<String> = jira
                .mapping
                .iter()
                .map(|(severity, priority)| format!("{severity} → {priority}"))
                .collect();
            out.push_str(&format!("  mapping: {}\n", mapping.join(", ").dimmed()));
        }
        out.push_str(&format!("{}\n", separator.dimmed()));
        out.push_str(&format!(
            "  Jira: {}  {}  {}\n",
            format!("{} new", jira.new_tickets.len()).green().bold(),
            format!("{} existing", jira.existing_tickets.len()).yellow(),
            format!("{} errors", jira.errors.len()).red().bold(),
        ));
    }

    if let Some(submitted) = outcome.engagement_submitted {
        out.push_str(&format!(
            "  Engagement: {}\n",
            format!("{submitted} submitted").green()
        ));
    }

    for error in outcome
        .errors
        .iter()
        .chain(outcome.jira.iter().flat_map(|j| j.errors.iter()))
    {
        out.push_str(&format!(
            "  {}  [{}] {}\n",
            "!".red().bold(),
            error.tool,
            error.error
        ));
    }

    out
}
