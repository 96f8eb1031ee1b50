//! Findings recorded by checkers
//!
//! A finding is data, not an error: checkers append to their log and keep
//! going. An empty log after a run is the success signal.

use std::fmt;
use tracing::error;

/// Cause of a finding, used to group log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// An expected file is absent
    NotFound,
    /// A file exists but cannot be opened
    Unreadable,
    /// Line counts of related artifacts disagree
    CountMismatch,
    /// A record or field does not have the expected shape
    StructuralViolation,
    /// The database or search index disagrees with an artifact
    ExternalInconsistency,
    /// A listing manifest entry lacks a filename
    MalformedManifestEntry,
    /// A listing manifest has no entry for a published file
    MissingManifestEntry,
    /// The checker itself failed before finishing
    CheckerFailure,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::NotFound => "not_found",
            FindingKind::Unreadable => "unreadable",
            FindingKind::CountMismatch => "count_mismatch",
            FindingKind::StructuralViolation => "structural_violation",
            FindingKind::ExternalInconsistency => "external_inconsistency",
            FindingKind::MalformedManifestEntry => "malformed_manifest_entry",
            FindingKind::MissingManifestEntry => "missing_manifest_entry",
            FindingKind::CheckerFailure => "checker_failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub checker: &'static str,
    pub kind: FindingKind,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.checker, self.message)
    }
}

/// Append-only findings of one checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLog {
    checker: &'static str,
    findings: Vec<Finding>,
}

impl ErrorLog {
    pub fn new(checker: &'static str) -> Self {
        Self {
            checker,
            findings: Vec::new(),
        }
    }

    pub fn checker(&self) -> &'static str {
        self.checker
    }

    /// Append a finding and emit it to the log stream
    pub fn record(&mut self, kind: FindingKind, message: impl Into<String>) {
        let finding = Finding {
            checker: self.checker,
            kind,
            message: message.into(),
        };
        error!(checker = finding.checker, kind = kind.as_str(), "{}", finding.message);
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings rendered as `Checker: message` strings
    pub fn messages(&self) -> Vec<String> {
        self.findings.iter().map(ToString::to_string).collect()
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}
