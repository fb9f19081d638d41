use std::io::Write;

use vulnrelay::finding::{
    load_findings, DastFinding, Endpoint, Finding, FindingMeta, SastFinding, Severity,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dast(title: &str) -> Finding {
    Finding::Dast(DastFinding {
        title: title.to_string(),
        description: "desc".to_string(),
        meta: FindingMeta::default(),
    })
}

// --- Severity ---

#[test]
fn severity_labels_parse_case_insensitively() {
    assert_eq!(Severity::from_label("HIGH"), Severity::High);
    assert_eq!(Severity::from_label("critical"), Severity::Critical);
    assert_eq!(Severity::from_label(" Medium "), Severity::Medium);
}

#[test]
fn unknown_severity_falls_back_to_least_severe() {
    assert_eq!(Severity::from_label("weird"), Severity::Info);
    assert_eq!(Severity::least(), Severity::Info);
}

#[test]
fn severity_rank_follows_declaration_order() {
    assert!(Severity::Critical.rank() < Severity::High.rank());
    assert!(Severity::Low.rank() < Severity::Info.rank());
    assert_eq!(Severity::Critical.rank(), 0);
}

#[test]
fn missing_severity_defaults_to_least_severe() {
    assert_eq!(dast("a").severity(), Severity::Info);
}

// --- Content hash ---

#[test]
fn hash_prefers_scanner_provided_issue_hash() {
    let finding = Finding::Dast(DastFinding {
        title: "a".to_string(),
        description: "desc".to_string(),
        meta: FindingMeta {
            issue_hash: Some("deadbeef".to_string()),
            ..FindingMeta::default()
        },
    });
    assert_eq!(finding.hash_code(), "deadbeef");
}

#[test]
fn derived_hash_is_stable_and_content_sensitive() {
    assert_eq!(dast("a").hash_code(), dast("a").hash_code());
    assert_ne!(dast("a").hash_code(), dast("b").hash_code());
}

#[test]
fn sast_hash_covers_all_fragments() {
    let one = Finding::Sast(SastFinding {
        title: "t".to_string(),
        description: vec!["x".to_string(), "y".to_string()],
        meta: FindingMeta::default(),
    });
    let other = Finding::Sast(SastFinding {
        title: "t".to_string(),
        description: vec!["x".to_string(), "z".to_string()],
        meta: FindingMeta::default(),
    });
    assert_ne!(one.hash_code(), other.hash_code());
}

// --- Filtering flags ---

#[test]
fn filter_flags_exclude_findings_from_tracker_reporting() {
    let mut meta = FindingMeta::default();
    assert!(!Finding::Dast(DastFinding {
        title: "a".to_string(),
        description: String::new(),
        meta: meta.clone(),
    })
    .is_filtered());

    meta.false_positive_finding = true;
    assert!(Finding::Dast(DastFinding {
        title: "a".to_string(),
        description: String::new(),
        meta,
    })
    .is_filtered());
}

// --- Ingestion ---

#[test]
fn findings_load_from_tagged_json() {
    let raw = r#"[
        {"kind": "dast", "title": "XSS", "description": "reflected",
         "meta": {"severity": "critical", "tool": "zap",
                  "endpoints": ["https://example.com/search"]}},
        {"kind": "sast", "title": "SQLi", "description": ["part one", "part two"]}
    ]"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(raw.as_bytes()).unwrap();

    let findings = load_findings(file.path()).unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].title(), "XSS");
    assert_eq!(findings[0].severity(), Severity::Critical);
    assert_eq!(findings[0].tool(), "zap");
    assert_eq!(
        findings[0].meta().endpoints,
        vec![Endpoint::new("https://example.com/search")]
    );
    assert_eq!(findings[1].kind_label(), "SAST");
    // Absent meta defaults: least-severe severity, generic tool.
    assert_eq!(findings[1].severity(), Severity::Info);
    assert_eq!(findings[1].tool(), "scanner");
}

#[test]
fn unknown_severity_label_in_json_falls_back() {
    let raw = r#"[{"kind": "dast", "title": "t", "description": "d",
                   "meta": {"severity": "catastrophic"}}]"#;
    let findings: Vec<Finding> = serde_json::from_str(raw).unwrap();
    assert_eq!(findings[0].severity(), Severity::Info);
}
