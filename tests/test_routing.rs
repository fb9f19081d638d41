use vulnrelay::config::{FieldRule, LabelRule};
use vulnrelay::finding::Endpoint;
use vulnrelay::jira::routing::RoutingRules;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn label_rule(pattern: &str, label: &str) -> LabelRule {
    LabelRule {
        pattern: pattern.to_string(),
        label: label.to_string(),
    }
}

fn field_rule(pattern: &str, key: &str, value: &str) -> FieldRule {
    let mut fields = serde_json::Map::new();
    fields.insert(key.to_string(), serde_json::json!(value));
    FieldRule {
        pattern: pattern.to_string(),
        fields,
    }
}

fn endpoints(raws: &[&str]) -> Vec<Endpoint> {
    raws.iter().map(|raw| Endpoint::new(*raw)).collect()
}

// --- Matching ---

#[test]
fn zero_endpoints_resolve_to_defaults() {
    let rules = RoutingRules::compile(
        &[label_rule(".*", "everything")],
        &[field_rule(".*", "k", "v")],
        &[".*".to_string()],
    );
    let matched = rules.route(&[]);
    assert!(matched.labels.is_empty());
    assert!(matched.fields.is_empty());
    assert_eq!(matched.target, None);
}

#[test]
fn label_and_field_rules_all_accumulate() {
    let rules = RoutingRules::compile(
        &[
            label_rule(r"^https://admin\.", "admin-surface"),
            label_rule(r"^https://", "web"),
        ],
        &[field_rule(r"^https://admin\.", "customfield_1", "x")],
        &[],
    );
    let matched = rules.route(&endpoints(&[
        "https://admin.example.com/users",
        "https://example.com/",
    ]));
    // Both rules match the first endpoint, one matches the second.
    assert_eq!(
        matched.labels,
        vec![
            "admin-surface".to_string(),
            "web".to_string(),
            "web".to_string()
        ]
    );
    assert_eq!(matched.fields.len(), 1);
    assert_eq!(matched.fields[0]["customfield_1"], "x");
}

#[test]
fn pattern_must_match_from_the_start_of_the_endpoint() {
    let rules = RoutingRules::compile(&[label_rule("example", "hit")], &[], &[]);
    assert!(rules
        .route(&endpoints(&["https://example.com"]))
        .labels
        .is_empty());
    assert_eq!(
        rules.route(&endpoints(&["example.com/path"])).labels,
        vec!["hit".to_string()]
    );
}

#[test]
fn last_matching_target_rule_wins() {
    let rules = RoutingRules::compile(
        &[],
        &[],
        &[
            r"^https://app\.".to_string(),
            r"^https://app\.admin\.".to_string(),
        ],
    );
    // Both rules match; declaration order decides.
    assert_eq!(
        rules.route(&endpoints(&["https://app.admin.example.com"])).target,
        Some(1)
    );
    // Only the first rule matches.
    assert_eq!(
        rules.route(&endpoints(&["https://app.example.com"])).target,
        Some(0)
    );
}

#[test]
fn later_endpoint_overrides_earlier_target_selection() {
    let rules = RoutingRules::compile(
        &[],
        &[],
        &[r"^https://a\.".to_string(), r"^https://b\.".to_string()],
    );
    let matched = rules.route(&endpoints(&["https://b.example.com", "https://a.example.com"]));
    assert_eq!(matched.target, Some(0));
}

// --- Per-rule isolation ---

#[test]
fn malformed_pattern_is_skipped_not_fatal() {
    let rules = RoutingRules::compile(
        &[label_rule("[", "broken"), label_rule("^ok", "ok")],
        &[field_rule("(", "k", "v")],
        &["[".to_string()],
    );
    let matched = rules.route(&endpoints(&["ok.example.com"]));
    assert_eq!(matched.labels, vec!["ok".to_string()]);
    assert!(matched.fields.is_empty());
    assert_eq!(matched.target, None);
}
