//! # vulnrelay
//!
//! Reporting adapters for a security-scan pipeline.
//!
//! `vulnrelay` takes a batch of findings produced by upstream scanners
//! and submits them to external issue trackers: Jira (with severity →
//! priority mapping, description chunking, dedup against open tickets
//! and pattern-based multi-target routing) and a generic
//! engagement/issues endpoint. It also filters accepted false
//! positives and composes email notifications.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vulnrelay::{config::Config, finding, report};
//!
//! let config = Config::load(None).expect("failed to load config");
//! let findings = finding::load_findings(Path::new("findings.json")).expect("bad findings");
//!
//! let outcome = report::run_report(findings, &config, None, &[]).expect("run failed");
//! print!("{}", report::format_outcome(&outcome, &report::OutputFormat::Pretty));
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around a batch pipeline:
//!
//! 1. **[`finding`]** — core data types ([`finding::Finding`],
//!    [`finding::Severity`], [`finding::ErrorRecord`]).
//! 2. **[`config`]** — load and validate TOML configuration.
//! 3. **[`util`]** — accepted false-positive filtering.
//! 4. **[`jira`]** — the heavy reporting path: mapping, chunking,
//!    routing, submission.
//! 5. **[`engagement`]** — flat bulk submission to an issues endpoint.
//! 6. **[`email`]** — notification summary composition.
//! 7. **[`report`]** — fan-out orchestration and outcome rendering.
//!
//! Findings are processed strictly in sequence; a per-finding failure
//! becomes an [`finding::ErrorRecord`] on the outcome and never aborts
//! the rest of the batch.

pub mod config;
pub mod email;
pub mod engagement;
pub mod error;
pub mod finding;
pub mod jira;
pub mod report;
pub mod util;
