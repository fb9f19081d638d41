//! Severity → ticket priority mapping.
//!
//! The default table is fixed. A target-level custom mapping, when
//! present, remaps the default's *output*; otherwise a remap can be
//! derived from the priorities the tracker instance actually offers.
//! The effective mapping used for each finding is recorded back into
//! the run outcome so downstream consumers see realized values, not
//! just configured ones.

use std::collections::BTreeMap;

use crate::finding::Severity;

/// Default severity → Jira priority table.
pub fn default_priority(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Blocker",
        Severity::High => "Critical",
        Severity::Medium => "Major",
        Severity::Low => "Minor",
        Severity::Info => "Trivial",
    }
}

/// Resolves the priority for a severity: default table first, then the
/// target's remap (custom or tracker-derived) applied to its output.
pub fn resolve_priority(severity: Severity, remap: Option<&BTreeMap<String, String>>) -> String {
    let priority = default_priority(severity);
    match remap.and_then(|m| m.get(priority)) {
        Some(mapped) => mapped.clone(),
        None => priority.to_string(),
    }
}

/// Derives a priority remap from the priority names a tracker instance
/// offers.
///
/// Default priorities the instance does not know are remapped to the
/// instance's least-severe priority (trackers list priorities highest
/// first). Returns `None` when the instance reported no priorities, in
/// which case the default table is used as-is.
pub fn derive_tracker_mapping(available: &[String]) -> Option<BTreeMap<String, String>> {
    let least = available.last()?;
    let mut mapping = BTreeMap::new();
    for severity in crate::finding::SEVERITIES {
        let priority = default_priority(severity);
        if !available.iter().any(|name| name == priority) {
            mapping.insert(priority.to_string(), least.clone());
        }
    }
    Some(mapping)
}
