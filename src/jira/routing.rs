//! Dynamic routing of findings by endpoint pattern.
//!
//! Configuration supplies regex-keyed rules for additional labels,
//! additional field overrides, and (multi-target mode) alternate target
//! selection. Every endpoint of a finding is tested against every
//! pattern with matches-from-start semantics. Label and field rules all
//! accumulate; target selection is last-match-wins in rule declaration
//! order. A pattern that fails to compile is logged and skipped — it
//! never aborts the batch.

use regex::Regex;

use crate::config::{FieldRule, LabelRule};
use crate::finding::Endpoint;

/// Compiled routing rules for one run.
pub struct RoutingRules {
    labels: Vec<(Regex, String)>,
    fields: Vec<(Regex, serde_json::Map<String, serde_json::Value>)>,
    targets: Vec<(Regex, usize)>,
}

/// What routing decided for one finding.
#[derive(Debug, Default)]
pub struct RouteMatch {
    /// Labels contributed by matching rules, in match order. A finding
    /// may accumulate several labels from several endpoints.
    pub labels: Vec<String>,
    /// Field-override sets contributed by matching rules, in match
    /// order. Later sets overwrite earlier keys on conflict when the
    /// submitter merges them.
    pub fields: Vec<serde_json::Map<String, serde_json::Value>>,
    /// Index of the selected alternate target, when any target rule
    /// matched. `None` keeps the default target.
    pub target: Option<usize>,
}

impl RoutingRules {
    /// Compiles the configured rules.
    ///
    /// `target_patterns` carries the dynamic-target patterns in
    /// declaration order; the compiled rule stores the pattern's index
    /// so the caller can map a match back to its target.
    pub fn compile(
        label_rules: &[LabelRule],
        field_rules: &[FieldRule],
        target_patterns: &[String],
    ) -> Self {
        let mut labels = Vec::new();
        for rule in label_rules {
            match Regex::new(&rule.pattern) {
                Ok(regex) => labels.push((regex, rule.label.clone())),
                Err(e) => {
                    tracing::warn!(pattern = %rule.pattern, error = %e, "skipping dynamic label rule");
                }
            }
        }

        let mut fields = Vec::new();
        for rule in field_rules {
            match Regex::new(&rule.pattern) {
                Ok(regex) => fields.push((regex, rule.fields.clone())),
                Err(e) => {
                    tracing::warn!(pattern = %rule.pattern, error = %e, "skipping dynamic field rule");
                }
            }
        }

        let mut targets = Vec::new();
        for (index, pattern) in target_patterns.iter().enumerate() {
            match Regex::new(pattern) {
                Ok(regex) => targets.push((regex, index)),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "skipping dynamic target rule");
                }
            }
        }

        RoutingRules {
            labels,
            fields,
            targets,
        }
    }

    /// Routes one finding by its endpoint list.
    ///
    /// A finding with zero endpoints matches nothing: no dynamic
    /// labels, no dynamic fields, default target.
    pub fn route(&self, endpoints: &[Endpoint]) -> RouteMatch {
        let mut matched = RouteMatch::default();
        for endpoint in endpoints {
            for (regex, label) in &self.labels {
                if matches_from_start(regex, &endpoint.raw) {
                    matched.labels.push(label.clone());
                }
            }
            for (regex, fields) in &self.fields {
                if matches_from_start(regex, &endpoint.raw) {
                    matched.fields.push(fields.clone());
                }
            }
            for (regex, index) in &self.targets {
                if matches_from_start(regex, &endpoint.raw) {
                    // Last match wins, in rule declaration order.
                    matched.target = Some(*index);
                }
            }
        }
        matched
    }
}

/// Anchored match: the pattern must match starting at the first
/// character of the text.
///
/// Leftmost-match semantics guarantee that if any match starting at
/// offset 0 exists, `find` returns it, so checking the match start is
/// equivalent to an anchored search.
fn matches_from_start(regex: &Regex, text: &str) -> bool {
    regex.find(text).is_some_and(|m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_must_start_at_offset_zero() {
        let regex = Regex::new("example").unwrap();
        assert!(!matches_from_start(&regex, "https://example.com"));
        assert!(matches_from_start(&regex, "example.com"));
    }
}
