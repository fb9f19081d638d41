//! Email notification glue.
//!
//! The mail transport itself is an external collaborator consumed
//! through the narrow [`EmailService`] trait; this module only composes
//! the HTML summary and decides whether to send at all.

use std::path::PathBuf;

use crate::error::Result;
use crate::jira::TicketRecord;

/// Narrow email-sending interface.
pub trait EmailService {
    /// `false` signals a misconfigured service; sending is skipped with
    /// a diagnostic instead of failing the run.
    fn valid(&self) -> bool;

    fn send(&self, html_body: &str, html_style: &str, attachments: &[PathBuf]) -> Result<()>;
}

const TABLE_STYLE: &str = "\
table, th, td {
  border: 1px solid black;
  border-collapse: collapse;
  padding: 0px 5px;
}
";

/// Composes the ticket summary table for the notification body.
fn tickets_table(tickets: &[TicketRecord]) -> String {
    let rows: Vec<String> = tickets
        .iter()
        .map(|ticket| {
            format!(
                "<tr><td>{}</td><td><a href=\"{}\">{}</a></td><td>{}</td></tr>",
                ticket.priority, ticket.jira_url, ticket.jira_id, ticket.summary
            )
        })
        .collect();
    format!(
        "<p>Here's the list of security issues found:</p>\n\
         <table>\n<tr><th>PRIORITY</th><th>KEY</th><th>SUMMARY</th></tr>\n{}\n</table>",
        rows.join("\n")
    )
}

/// Sends the run summary email.
///
/// When Jira reporting ran, the body is a table of the run's tickets
/// (or a "nothing new" paragraph); otherwise the reader is pointed at
/// the attachments. An invalid service is skipped with a diagnostic.
pub fn send_emails(
    service: &dyn EmailService,
    jira_used: bool,
    tickets: &[TicketRecord],
    attachments: &[PathBuf],
) -> Result<()> {
    if !service.valid() {
        tracing::warn!("email configuration is invalid, skipping notification");
        return Ok(());
    }

    let html_body = if jira_used {
        if tickets.is_empty() {
            "<p>No new security issues found.</p>".to_string()
        } else {
            tickets_table(tickets)
        }
    } else {
        "<p>Please see the results attached.</p>".to_string()
    };

    service.send(&html_body, TABLE_STYLE, attachments)
}
