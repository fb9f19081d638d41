//! Post-processing helpers: accepted false-positive filtering and a
//! small subprocess runner.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use crate::finding::Finding;

/// Well-known default location of the accepted false-positive list:
/// one content hash per line, blank lines ignored.
pub const FALSE_POSITIVE_CONFIG: &str = "false_positive.config";

/// Removes findings whose content hash is on the accepted
/// false-positive list.
///
/// A missing list file leaves the collection unchanged. Order of the
/// surviving findings is preserved.
pub fn process_false_positives(findings: Vec<Finding>, path: &Path) -> Vec<Finding> {
    if !path.exists() {
        return findings;
    }
    let accepted: Vec<String> = match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read false-positive list");
            return findings;
        }
    };
    if accepted.is_empty() {
        return findings;
    }

    let before = findings.len();
    let filtered: Vec<Finding> = findings
        .into_iter()
        .filter(|finding| !accepted.contains(&finding.hash_code()))
        .collect();
    let dropped = before - filtered.len();
    if dropped > 0 {
        tracing::info!(dropped, "removed accepted false positives");
    }
    filtered
}

/// Runs a command line and captures its output.
///
/// The command is split on whitespace; the first word is the program.
pub fn execute(exec_cmd: &str, cwd: &Path) -> Result<(String, String)> {
    tracing::debug!(command = %exec_cmd, "running");
    let mut parts = exec_cmd.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::config("empty command line"))?;
    let output = Command::new(program)
        .args(parts)
        .current_dir(cwd)
        .output()?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    tracing::debug!(status = %output.status, "done");
    Ok((stdout, stderr))
}
