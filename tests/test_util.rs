use std::io::Write;
use std::path::Path;

use vulnrelay::finding::{DastFinding, Finding, FindingMeta};
use vulnrelay::util::{execute, process_false_positives};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finding_with_hash(title: &str, hash: &str) -> Finding {
    Finding::Dast(DastFinding {
        title: title.to_string(),
        description: "d".to_string(),
        meta: FindingMeta {
            issue_hash: Some(hash.to_string()),
            ..FindingMeta::default()
        },
    })
}

// --- False-positive filtering ---

#[test]
fn listed_hashes_are_removed_and_order_is_preserved() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "accepted-one").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "  accepted-two  ").unwrap();

    let findings = vec![
        finding_with_hash("a", "accepted-one"),
        finding_with_hash("b", "kept"),
        finding_with_hash("c", "accepted-two"),
        finding_with_hash("d", "also-kept"),
    ];
    let filtered = process_false_positives(findings, file.path());
    let titles: Vec<&str> = filtered.iter().map(|f| f.title()).collect();
    assert_eq!(titles, vec!["b", "d"]);
}

#[test]
fn unlisted_findings_pass_through_unchanged() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "something-else").unwrap();

    let findings = vec![finding_with_hash("a", "not-listed")];
    let filtered = process_false_positives(findings, file.path());
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title(), "a");
}

#[test]
fn missing_list_file_leaves_the_collection_unchanged() {
    let findings = vec![finding_with_hash("a", "h1"), finding_with_hash("b", "h2")];
    let filtered = process_false_positives(findings, Path::new("/does/not/exist"));
    assert_eq!(filtered.len(), 2);
}

#[test]
fn empty_list_file_filters_nothing() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let findings = vec![finding_with_hash("a", "h1")];
    let filtered = process_false_positives(findings, file.path());
    assert_eq!(filtered.len(), 1);
}

// --- Subprocess helper ---

#[test]
fn execute_captures_stdout() {
    let (stdout, stderr) = execute("echo hello", &std::env::temp_dir()).unwrap();
    assert_eq!(stdout.trim(), "hello");
    assert!(stderr.is_empty());
}

#[test]
fn execute_rejects_an_empty_command_line() {
    assert!(execute("   ", &std::env::temp_dir()).is_err());
}
