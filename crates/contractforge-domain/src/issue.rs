//! Validation issues reported by the defect detector

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// The kind of defect found in generated contract code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// A literal placeholder token (`undefined`, `null`, ...) assigned to a
    /// typed declaration
    LiteralPlaceholder,
    /// A declaration or assignment whose right-hand side is empty
    IncompleteDeclaration,
    /// A typed function body with no reachable return statement
    MissingReturn,
    /// An optional-marked parameter without a default value
    MissingDefault,
    /// Unbalanced brackets, braces, or parentheses
    BracketMismatch,
    /// Any other structural syntax defect
    Syntax,
}

/// Severity of a validation issue
///
/// This is the canonical scale for the validation pipeline. The alerting
/// scale used by monitoring is a separate enum; the mapping between the two
/// lives next to that enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueSeverity {
    /// Blocks acceptance; must be corrected or regenerated
    Critical,
    /// Should be addressed but does not block acceptance
    Warning,
    /// Stylistic or informational
    Suggestion,
}

/// Where in the source an issue was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLocation {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// The offending source fragment
    pub snippet: String,
}

impl IssueLocation {
    /// Creates a location, trimming the snippet to a reasonable length
    pub fn new(line: usize, column: usize, snippet: impl Into<String>) -> Self {
        let mut snippet = snippet.into();
        if snippet.len() > 120 {
            snippet.truncate(120);
        }
        Self {
            line,
            column,
            snippet,
        }
    }
}

/// A single defect found by the detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Defect classification
    pub kind: IssueKind,
    /// How severe the defect is
    pub severity: IssueSeverity,
    /// Source location of the defect
    pub location: IssueLocation,
    /// Human-readable description
    pub message: String,
    /// Replacement value the corrector may apply
    pub suggested_fix: Option<String>,
    /// Whether the corrector can repair this without regeneration
    pub auto_fixable: bool,
}

impl ValidationIssue {
    /// Creates an issue, enforcing `auto_fixable => suggested_fix present`
    pub fn new(
        kind: IssueKind,
        severity: IssueSeverity,
        location: IssueLocation,
        message: impl Into<String>,
        suggested_fix: Option<String>,
        auto_fixable: bool,
    ) -> DomainResult<Self> {
        if auto_fixable && suggested_fix.is_none() {
            return Err(DomainError::InvalidIssue(
                "auto-fixable issue requires a suggested fix".to_string(),
            ));
        }
        Ok(Self {
            kind,
            severity,
            location,
            message: message.into(),
            suggested_fix,
            auto_fixable,
        })
    }

    /// Creates a critical, auto-fixable issue
    pub fn critical(
        kind: IssueKind,
        location: IssueLocation,
        message: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: IssueSeverity::Critical,
            location,
            message: message.into(),
            suggested_fix: Some(suggested_fix.into()),
            auto_fixable: true,
        }
    }

    /// Creates a warning issue with no automatic fix
    pub fn warning(kind: IssueKind, location: IssueLocation, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: IssueSeverity::Warning,
            location,
            message: message.into(),
            suggested_fix: None,
            auto_fixable: false,
        }
    }

    /// Whether this issue blocks acceptance on its own
    pub fn is_blocking(&self) -> bool {
        self.severity == IssueSeverity::Critical
    }
}

/// Aggregate result of one detector pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All issues found, in source order
    pub issues: Vec<ValidationIssue>,
    /// Total issue count
    pub total_issues: usize,
    /// Count of critical issues
    pub critical_issues: usize,
    /// Count of warning issues
    pub warning_issues: usize,
    /// Whether any issue blocks acceptance
    pub has_blocking_issues: bool,
}

impl ValidationReport {
    /// Builds a report from a list of issues
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let critical_issues = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Critical)
            .count();
        let warning_issues = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count();
        Self {
            total_issues: issues.len(),
            critical_issues,
            warning_issues,
            has_blocking_issues: critical_issues > 0,
            issues,
        }
    }

    /// A report with no issues
    pub fn clean() -> Self {
        Self::default()
    }

    /// Whether the scanned code is free of defects
    pub fn is_clean(&self) -> bool {
        self.total_issues == 0
    }
}
