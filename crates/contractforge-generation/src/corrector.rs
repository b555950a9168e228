//! Automatic repair of detected defects
//!
//! The corrector runs four independent stages over the artifact: typed
//! default substitution, bracket balancing, function completion, and
//! trivial syntax normalization. Every edit is computed against masked
//! source and applied to the original by byte offset, so string literals
//! are never rewritten. Confidence starts at 100 and drops for every
//! structural ambiguity; the controller treats low confidence or surviving
//! critical issues as a signal to regenerate instead of trusting the patch.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use contractforge_domain::{CorrectionRecord, CorrectionRisk, IssueKind, IssueLocation};

use crate::detector::{
    declared_type, default_return_for, matching_delimiter, returns_clause, DefectDetector,
};
use crate::masking::mask;
use crate::scoring::QualityScorer;

static PLACEHOLDER_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^=!<>+\-*/%&|^])(?P<eq>=)\s*(?P<token>undefined|null|NaN)\s*(?:;|$)")
        .expect("placeholder pattern")
});

static EMPTY_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^=!<>+\-*/%&|^])(?P<eq>=)\s*(?:;|$)").expect("empty-assign pattern")
});

static FUNCTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+(?P<name>[A-Za-z_]\w*)\s*\(").expect("function pattern"));

static RETURN_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\breturn\b").expect("return pattern"));

static DANGLING_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<comma>,)\s*[)\]}]").expect("dangling-separator pattern"));

/// Confidence deduction for a placeholder whose type cannot be inferred
const UNKNOWN_TYPE_PENALTY: f64 = 15.0;
/// Confidence deduction for nesting the corrector cannot resolve
const UNRESOLVED_NESTING_PENALTY: f64 = 20.0;
/// Confidence deduction for edits that collided and were dropped
const CONFLICTING_EDIT_PENALTY: f64 = 10.0;

/// Configuration for the corrector
#[derive(Debug, Clone)]
pub struct CorrectorConfig {
    /// Confidence below which regeneration is preferred over the patch
    pub confidence_floor: f64,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 70.0,
        }
    }
}

/// Result of one corrector pass
#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    /// The repaired source
    pub corrected_code: String,
    /// Every edit that was applied
    pub corrections_applied: Vec<CorrectionRecord>,
    /// Overall confidence in the patch, 0-100
    pub confidence: f64,
    /// Issues found before correction
    pub original_issue_count: usize,
    /// Issues still present after correction
    pub remaining_issue_count: usize,
    /// Whether the controller should regenerate instead of trusting this
    pub requires_regeneration: bool,
}

/// Result of re-validating a correction pass
#[derive(Debug, Clone)]
pub struct CorrectionValidation {
    /// Overall score delta between input and output
    pub quality_improvement: f64,
    /// Risk classification for the applied patch
    pub risk: CorrectionRisk,
    /// Issue count before the pass
    pub issues_before: usize,
    /// Issue count after the pass
    pub issues_after: usize,
}

/// One pending text edit with its audit record
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
    record: CorrectionRecord,
}

/// Repairs detected defects in place
#[derive(Debug, Clone, Default)]
pub struct AutoCorrector {
    detector: DefectDetector,
    config: CorrectorConfig,
}

impl AutoCorrector {
    /// Creates a corrector with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a corrector with custom configuration
    pub fn with_config(config: CorrectorConfig) -> Self {
        Self {
            detector: DefectDetector::new(),
            config,
        }
    }

    /// Runs all correction stages and re-validates the result
    pub fn correct(&self, code: &str) -> CorrectionOutcome {
        let before = self.detector.scan(code);
        let original_issue_count = before.total_issues;
        if original_issue_count == 0 {
            return CorrectionOutcome {
                corrected_code: code.to_string(),
                corrections_applied: Vec::new(),
                confidence: 100.0,
                original_issue_count: 0,
                remaining_issue_count: 0,
                requires_regeneration: false,
            };
        }

        // Ambiguities are judged on the pre-correction scan: placeholders
        // with no inferable type and structurally unresolvable syntax both
        // cost confidence whether or not later stages touch them.
        let mut confidence: f64 = 100.0;
        for issue in &before.issues {
            if issue.auto_fixable {
                continue;
            }
            confidence -= match issue.kind {
                IssueKind::LiteralPlaceholder | IssueKind::IncompleteDeclaration => {
                    UNKNOWN_TYPE_PENALTY
                }
                IssueKind::Syntax => UNRESOLVED_NESTING_PENALTY,
                _ => 0.0,
            };
        }

        let mut records = Vec::new();
        let mut current = code.to_string();
        current = self.fix_assignments(&current, &mut records, &mut confidence);
        current = self.balance_brackets(&current, &mut records, &mut confidence);
        current = self.complete_functions(&current, &mut records, &mut confidence);
        current = self.normalize_syntax(&current, &mut records, &mut confidence);

        let after = self.detector.scan(&current);
        let confidence = confidence.clamp(0.0, 100.0);
        let requires_regeneration =
            confidence < self.config.confidence_floor || after.critical_issues > 0;

        debug!(
            applied = records.len(),
            confidence, requires_regeneration, "correction pass complete"
        );

        CorrectionOutcome {
            corrected_code: current,
            corrections_applied: records,
            confidence,
            original_issue_count,
            remaining_issue_count: after.total_issues,
            requires_regeneration,
        }
    }

    /// Re-scans a corrected artifact and classifies the patch risk
    pub fn validate_corrections(&self, before: &str, after: &str) -> CorrectionValidation {
        let report_before = self.detector.scan(before);
        let report_after = self.detector.scan(after);

        let scorer = QualityScorer::new();
        let quality_improvement =
            scorer.score_with_report(after, &report_after).overall
                - scorer.score_with_report(before, &report_before).overall;

        let kinds_before: Vec<IssueKind> = report_before
            .issues
            .iter()
            .filter(|i| i.is_blocking())
            .map(|i| i.kind)
            .collect();
        let introduced_critical = report_after
            .issues
            .iter()
            .filter(|i| i.is_blocking())
            .any(|i| !kinds_before.contains(&i.kind));

        let risk = if introduced_critical {
            CorrectionRisk::High
        } else if report_after.critical_issues > 0 {
            CorrectionRisk::Medium
        } else {
            CorrectionRisk::Low
        };

        CorrectionValidation {
            quality_improvement,
            risk,
            issues_before: report_before.total_issues,
            issues_after: report_after.total_issues,
        }
    }

    /// Stage 1: replace placeholders and empty right-hand sides with
    /// type-inferred defaults
    fn fix_assignments(
        &self,
        code: &str,
        records: &mut Vec<CorrectionRecord>,
        confidence: &mut f64,
    ) -> String {
        let masked = mask(code);
        let mut edits = Vec::new();
        let mut offset = 0usize;

        for (idx, line) in masked.text.lines().enumerate() {
            if let Some(captures) = PLACEHOLDER_ASSIGN.captures(line) {
                let eq = captures.name("eq").expect("eq group");
                let token = captures.name("token").expect("token group");
                if let Some(sol_type) = declared_type(&line[..eq.start()]) {
                    match sol_type.default_value() {
                        Some(default) => edits.push(Edit {
                            start: offset + token.start(),
                            end: offset + token.end(),
                            replacement: default.clone(),
                            record: CorrectionRecord::new(
                                IssueKind::LiteralPlaceholder,
                                IssueLocation::new(idx + 1, token.start() + 1, line.trim()),
                                token.as_str(),
                                default,
                                format!("type-correct default for {}", sol_type.source_name()),
                                95.0,
                            ),
                        }),
                        None => {
                            // Mappings take no initializer; drop `= token`.
                            let mut lhs_end = eq.start();
                            while lhs_end > 0 && line.as_bytes()[lhs_end - 1] == b' ' {
                                lhs_end -= 1;
                            }
                            edits.push(Edit {
                                start: offset + lhs_end,
                                end: offset + token.end(),
                                replacement: String::new(),
                                record: CorrectionRecord::new(
                                    IssueKind::LiteralPlaceholder,
                                    IssueLocation::new(idx + 1, token.start() + 1, line.trim()),
                                    &line[lhs_end..token.end()],
                                    "",
                                    "mappings cannot take an initializer",
                                    90.0,
                                ),
                            });
                        }
                    }
                }
                offset += line.len() + 1;
                continue;
            }

            if let Some(captures) = EMPTY_ASSIGN.captures(line) {
                let eq = captures.name("eq").expect("eq group");
                if let Some(default) =
                    declared_type(&line[..eq.start()]).and_then(|t| t.default_value())
                {
                    let rest = &line[eq.end()..];
                    let edit = match rest.find(';') {
                        Some(semi) => Edit {
                            start: offset + eq.end(),
                            end: offset + eq.end() + semi,
                            replacement: format!(" {}", default),
                            record: CorrectionRecord::new(
                                IssueKind::IncompleteDeclaration,
                                IssueLocation::new(idx + 1, eq.start() + 1, line.trim()),
                                rest[..semi].to_string(),
                                format!(" {}", default),
                                "filled empty right-hand side with type default",
                                90.0,
                            ),
                        },
                        None => Edit {
                            start: offset + line.len(),
                            end: offset + line.len(),
                            replacement: format!(" {};", default),
                            record: CorrectionRecord::new(
                                IssueKind::IncompleteDeclaration,
                                IssueLocation::new(idx + 1, eq.start() + 1, line.trim()),
                                "",
                                format!(" {};", default),
                                "completed truncated assignment with type default",
                                85.0,
                            ),
                        },
                    };
                    edits.push(edit);
                }
            }
            offset += line.len() + 1;
        }

        apply_edits(code, edits, records, confidence)
    }

    /// Stage 2: close unclosed brackets at the correct nesting depth
    fn balance_brackets(
        &self,
        code: &str,
        records: &mut Vec<CorrectionRecord>,
        confidence: &mut f64,
    ) -> String {
        let masked = mask(code);
        let mut stack: Vec<char> = Vec::new();

        for c in masked.text.chars() {
            match c {
                '(' | '[' | '{' => stack.push(c),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if stack.last() == Some(&expected) {
                        stack.pop();
                    }
                    // Stray closers were already charged against confidence
                    // from the pre-correction scan; nothing to balance here.
                }
                _ => {}
            }
        }

        if stack.is_empty() {
            return code.to_string();
        }

        let mut suffix = String::new();
        for (i, open) in stack.iter().enumerate().rev() {
            match open {
                '(' => suffix.push(')'),
                '[' => suffix.push(']'),
                _ => {
                    suffix.push('\n');
                    suffix.push_str(&"    ".repeat(i.min(8)));
                    suffix.push('}');
                }
            }
        }

        let line = code.lines().count();
        let edits = vec![Edit {
            start: code.len(),
            end: code.len(),
            replacement: suffix.clone(),
            record: CorrectionRecord::new(
                IssueKind::BracketMismatch,
                IssueLocation::new(line.max(1), 1, ""),
                "",
                suffix,
                format!("closed {} unterminated bracket(s)", stack.len()),
                85.0,
            ),
        }];
        apply_edits(code, edits, records, confidence)
    }

    /// Stage 3: complete truncated signatures and insert missing returns
    fn complete_functions(
        &self,
        code: &str,
        records: &mut Vec<CorrectionRecord>,
        confidence: &mut f64,
    ) -> String {
        let masked = mask(code);
        let mut edits = Vec::new();

        for header in FUNCTION_HEADER.captures_iter(&masked.text) {
            let name = header.name("name").expect("name group");
            let line_idx = masked.text[..name.start()].matches('\n').count();
            let open_paren = header.get(0).expect("match").end() - 1;
            let Some(close_paren) = matching_delimiter(&masked.text, open_paren, '(', ')') else {
                continue;
            };

            // The clause runs until the body opens, the declaration ends, or
            // an enclosing scope closes.
            let rest = &masked.text[close_paren + 1..];
            let clause_end = rest
                .char_indices()
                .find(|(_, c)| matches!(c, '{' | ';' | '}'))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let terminator = rest[clause_end..].chars().next();
            let clause = &rest[..clause_end];
            let return_types = returns_clause(clause);

            match terminator {
                Some('{') => {
                    let Some(types) = return_types else { continue };
                    let body_open = close_paren + 1 + clause_end;
                    let Some(body_close) = matching_delimiter(&masked.text, body_open, '{', '}')
                    else {
                        continue;
                    };
                    let body = &masked.text[body_open + 1..body_close];
                    if RETURN_STMT.is_match(body) {
                        continue;
                    }
                    let indent = line_indent(&masked.text, name.start());
                    let statement = default_return_for(&types);
                    let insertion = format!("    {}\n{}", statement, indent);
                    // Insert right before the closing brace, one level in.
                    let start = body_open + 1 + body.trim_end().len();
                    let replacement = format!("\n{}{}", indent, insertion);
                    edits.push(Edit {
                        start,
                        end: body_close,
                        replacement: replacement.clone(),
                        record: CorrectionRecord::new(
                            IssueKind::MissingReturn,
                            IssueLocation::new(line_idx + 1, 1, ""),
                            "",
                            statement,
                            format!("inserted default return into `{}`", name.as_str()),
                            90.0,
                        ),
                    });
                }
                Some(';') | Some('}') => continue,
                _ => {
                    // Header ran off the end of the artifact: append a body.
                    let body = match &return_types {
                        Some(types) => format!(" {{ {} }}", default_return_for(types)),
                        None => " { /* stub */ }".to_string(),
                    };
                    let insert_at = close_paren + 1 + clause.trim_end().len();
                    edits.push(Edit {
                        start: insert_at,
                        end: insert_at,
                        replacement: body.clone(),
                        record: CorrectionRecord::new(
                            IssueKind::IncompleteDeclaration,
                            IssueLocation::new(line_idx + 1, 1, ""),
                            "",
                            body,
                            format!("completed signature of `{}` with a stub body", name.as_str()),
                            80.0,
                        ),
                    });
                }
            }
        }

        apply_edits(code, edits, records, confidence)
    }

    /// Stage 4: drop dangling separators that sit directly before a closer
    fn normalize_syntax(
        &self,
        code: &str,
        records: &mut Vec<CorrectionRecord>,
        confidence: &mut f64,
    ) -> String {
        let masked = mask(code);
        let mut edits = Vec::new();

        for captures in DANGLING_SEPARATOR.captures_iter(&masked.text) {
            let comma = captures.name("comma").expect("comma group");
            let line_idx = masked.text[..comma.start()].matches('\n').count();
            edits.push(Edit {
                start: comma.start(),
                end: comma.end(),
                replacement: String::new(),
                record: CorrectionRecord::new(
                    IssueKind::Syntax,
                    IssueLocation::new(line_idx + 1, 1, ""),
                    ",",
                    "",
                    "removed dangling separator before closer",
                    98.0,
                ),
            });
        }

        apply_edits(code, edits, records, confidence)
    }
}

/// Applies edits right-to-left, dropping any that overlap an earlier one
fn apply_edits(
    code: &str,
    mut edits: Vec<Edit>,
    records: &mut Vec<CorrectionRecord>,
    confidence: &mut f64,
) -> String {
    if edits.is_empty() {
        return code.to_string();
    }
    edits.sort_by_key(|e| e.start);

    let mut accepted: Vec<Edit> = Vec::new();
    let mut last_end = 0usize;
    for edit in edits {
        if edit.start < last_end || edit.end > code.len() {
            *confidence -= CONFLICTING_EDIT_PENALTY;
            continue;
        }
        last_end = edit.end.max(edit.start);
        accepted.push(edit);
    }

    let mut result = code.to_string();
    for edit in accepted.iter().rev() {
        result.replace_range(edit.start..edit.end, &edit.replacement);
    }
    records.extend(accepted.into_iter().map(|e| e.record));
    result
}

/// The leading whitespace of the line containing `at`
fn line_indent(text: &str, at: usize) -> String {
    let line_start = text[..at].rfind('\n').map(|i| i + 1).unwrap_or(0);
    text[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}
