use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Severity scale, ordered most-severe first.
///
/// The declaration order is load-bearing: [`Severity::rank`] and the
/// derived `Ord` follow it, and the batch sort key uses it directly.
/// [`Severity::least`] is the fallback for findings that carry no
/// (or an unrecognized) severity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// All severities, most-severe first.
pub const SEVERITIES: [Severity; 5] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Info,
];

impl Severity {
    /// Position in the ordered severity list (0 = most severe).
    pub fn rank(self) -> usize {
        self as usize
    }

    /// The least-severe entry of the ordered list.
    pub fn least() -> Severity {
        SEVERITIES[SEVERITIES.len() - 1]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Info => "Info",
        }
    }

    /// Parses a severity label case-insensitively.
    ///
    /// Unrecognized labels fall back to [`Severity::least`]; upstream
    /// scanners are not trusted to agree on a label set.
    pub fn from_label(label: &str) -> Severity {
        match label.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::least(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label: String = serde::Deserialize::deserialize(deserializer)?;
        Ok(Severity::from_label(&label))
    }
}

/// An endpoint associated with a finding.
///
/// Opaque to this crate: the raw string (usually a URL) is only ever
/// used as match input for dynamic routing rules.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Endpoint {
    pub raw: String,
}

impl Endpoint {
    pub fn new(raw: impl Into<String>) -> Self {
        Endpoint { raw: raw.into() }
    }
}

/// Open-ended metadata attached to a finding by upstream scanners.
///
/// Well-known keys get typed fields; everything else lands in `extra`
/// and is carried along untouched.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FindingMeta {
    pub tool: Option<String>,
    pub severity: Option<Severity>,
    pub issue_hash: Option<String>,
    pub endpoints: Vec<Endpoint>,
    pub information_finding: bool,
    pub false_positive_finding: bool,
    pub excluded_finding: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A DAST finding: single-string description.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DastFinding {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub meta: FindingMeta,
}

/// A SAST finding: description arrives as an ordered sequence of
/// fragments (one per code location, typically), which the Jira
/// reporter may spill into follow-up comments.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SastFinding {
    pub title: String,
    pub description: Vec<String>,
    #[serde(default)]
    pub meta: FindingMeta,
}

/// A reported security issue from an upstream scanner.
///
/// Closed set of finding kinds, switched once at ingestion. Findings
/// are read-only to this crate: reporters consume them, never mutate
/// them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Finding {
    Dast(DastFinding),
    Sast(SastFinding),
}

impl Finding {
    pub fn title(&self) -> &str {
        match self {
            Finding::Dast(f) => &f.title,
            Finding::Sast(f) => &f.title,
        }
    }

    pub fn meta(&self) -> &FindingMeta {
        match self {
            Finding::Dast(f) => &f.meta,
            Finding::Sast(f) => &f.meta,
        }
    }

    /// Severity, falling back to the least-severe entry when absent.
    pub fn severity(&self) -> Severity {
        self.meta().severity.unwrap_or_else(Severity::least)
    }

    /// Producing tool name, `"scanner"` when the scanner did not say.
    pub fn tool(&self) -> &str {
        self.meta().tool.as_deref().unwrap_or("scanner")
    }

    /// Default testing-type label for this finding kind.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Finding::Dast(_) => "DAST",
            Finding::Sast(_) => "SAST",
        }
    }

    /// `true` when the finding must not reach the ticket tracker:
    /// informational, accepted false positive, or explicitly excluded.
    pub fn is_filtered(&self) -> bool {
        let meta = self.meta();
        meta.information_finding || meta.false_positive_finding || meta.excluded_finding
    }

    /// Content hash used for tracker-side dedup and the accepted
    /// false-positive list.
    ///
    /// Prefers the scanner-provided `issue_hash`; otherwise derives a
    /// stable SHA-256 over title and description text.
    pub fn hash_code(&self) -> String {
        if let Some(hash) = &self.meta().issue_hash {
            return hash.clone();
        }
        let mut hasher = Sha256::new();
        hasher.update(self.title().as_bytes());
        match self {
            Finding::Dast(f) => hasher.update(f.description.as_bytes()),
            Finding::Sast(f) => {
                for fragment in &f.description {
                    hasher.update(fragment.as_bytes());
                }
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// A structured per-finding failure, accumulated on the run outcome.
///
/// Reporters convert submission exceptions into these records and keep
/// going; they never escape the reporting boundary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorRecord {
    pub tool: String,
    pub error: String,
    pub details: String,
}

impl ErrorRecord {
    pub fn new(
        tool: impl Into<String>,
        error: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        ErrorRecord {
            tool: tool.into(),
            error: error.into(),
            details: details.into(),
        }
    }
}

/// Loads a findings batch from a JSON document on disk.
///
/// The document is an array of tagged findings:
///
/// ```json
/// [
///   {"kind": "dast", "title": "...", "description": "...",
///    "meta": {"severity": "High", "tool": "zap", "endpoints": ["https://..."]}},
///   {"kind": "sast", "title": "...", "description": ["...", "..."]}
/// ]
/// ```
pub fn load_findings(path: &Path) -> crate::error::Result<Vec<Finding>> {
    let content = std::fs::read_to_string(path)?;
    let findings: Vec<Finding> = serde_json::from_str(&content)?;
    Ok(findings)
}
