//! Defect detection for generated contract code
//!
//! Finds the defect classes a code-generation backend leaves behind:
//! literal placeholder tokens assigned to typed declarations, declarations
//! truncated before their right-hand side, typed functions with no reachable
//! return, optional-marked parameters without defaults, and unbalanced
//! brackets. All scanning runs over masked source so string literals and
//! comments are never flagged.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use contractforge_domain::{
    IssueKind, IssueLocation, IssueSeverity, SolType, ValidationIssue, ValidationReport,
};

use crate::masking::{mask, MaskedSource};

/// A placeholder token assigned where a value was expected
///
/// The `=` is guarded so compound operators and comparisons do not match.
static PLACEHOLDER_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^=!<>+\-*/%&|^])(?P<eq>=)\s*(?P<token>undefined|null|NaN)\s*(?:;|$)")
        .expect("placeholder pattern")
});

/// An assignment with an empty right-hand side (`= ;` or a trailing `=`)
static EMPTY_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^=!<>+\-*/%&|^])(?P<eq>=)\s*(?:;|$)").expect("empty-assign pattern")
});

/// A function header
static FUNCTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+(?P<name>[A-Za-z_]\w*)\s*\(").expect("function pattern"));

/// A return statement anywhere in a body
static RETURN_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\breturn\b").expect("return pattern"));

/// Declaration modifiers that may sit between a type and its name
static MODIFIERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(public|private|internal|external|constant|immutable|override|payable)\b")
        .expect("modifier pattern")
});

/// A separator left dangling directly before a closer
static DANGLING_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<comma>,)\s*[)\]}]").expect("dangling-separator pattern"));

/// Scans generated contract source for structural defects
///
/// `scan` never fails: input it cannot make sense of produces an empty
/// report rather than an error.
#[derive(Debug, Clone, Default)]
pub struct DefectDetector;

impl DefectDetector {
    /// Creates a new detector
    pub fn new() -> Self {
        Self
    }

    /// Scans `code` and reports every defect found
    pub fn scan(&self, code: &str) -> ValidationReport {
        if code.trim().is_empty() {
            return ValidationReport::clean();
        }

        let masked = mask(code);
        let original_lines: Vec<&str> = code.lines().collect();

        let mut issues = Vec::new();
        self.scan_assignments(&masked, &original_lines, &mut issues);
        self.scan_functions(&masked, &original_lines, &mut issues);
        self.scan_brackets(&masked, &original_lines, &mut issues);
        self.scan_dangling_separators(&masked, &original_lines, &mut issues);
        self.scan_unterminated_literals(&masked, &original_lines, &mut issues);

        debug!(issues = issues.len(), "defect scan complete");
        ValidationReport::from_issues(issues)
    }

    /// Finds placeholder tokens and empty right-hand sides, line by line
    fn scan_assignments(
        &self,
        masked: &MaskedSource,
        original_lines: &[&str],
        issues: &mut Vec<ValidationIssue>,
    ) {
        for (idx, line) in masked.text.lines().enumerate() {
            if let Some(captures) = PLACEHOLDER_ASSIGN.captures(line) {
                let eq = captures.name("eq").expect("eq group");
                let token = captures.name("token").expect("token group");
                let location = location_at(original_lines, idx, token.start());
                match declared_type(&line[..eq.start()]) {
                    Some(sol_type) => {
                        let fix = sol_type.default_value().unwrap_or_default();
                        issues.push(ValidationIssue::critical(
                            IssueKind::LiteralPlaceholder,
                            location,
                            format!(
                                "Placeholder `{}` assigned to `{}` declaration",
                                token.as_str(),
                                sol_type.source_name()
                            ),
                            fix,
                        ));
                    }
                    None => {
                        // Still blocks acceptance, but no safe default can
                        // be inferred without a declared type.
                        issues.push(
                            ValidationIssue::new(
                                IssueKind::LiteralPlaceholder,
                                IssueSeverity::Critical,
                                location,
                                format!(
                                    "Placeholder `{}` assigned without a declared type",
                                    token.as_str()
                                ),
                                None,
                                false,
                            )
                            .expect("non-fixable issue"),
                        );
                    }
                }
                continue;
            }

            if let Some(captures) = EMPTY_ASSIGN.captures(line) {
                let eq = captures.name("eq").expect("eq group");
                let location = location_at(original_lines, idx, eq.start());
                match declared_type(&line[..eq.start()]).and_then(|t| t.default_value()) {
                    Some(fix) => issues.push(ValidationIssue::critical(
                        IssueKind::IncompleteDeclaration,
                        location,
                        "Declaration has an empty right-hand side",
                        fix,
                    )),
                    None => issues.push(
                        ValidationIssue::new(
                            IssueKind::IncompleteDeclaration,
                            IssueSeverity::Critical,
                            location,
                            "Statement truncated before its value",
                            None,
                            false,
                        )
                        .expect("non-fixable issue"),
                    ),
                }
            }
        }
    }

    /// Checks every function header: truncated signatures, missing returns,
    /// optional parameters without defaults
    fn scan_functions(
        &self,
        masked: &MaskedSource,
        original_lines: &[&str],
        issues: &mut Vec<ValidationIssue>,
    ) {
        for header in FUNCTION_HEADER.captures_iter(&masked.text) {
            let name = header.name("name").expect("name group");
            let line_idx = masked.text[..name.start()].matches('\n').count();
            let open_paren = header.get(0).expect("match").end() - 1;
            let Some(close_paren) = matching_delimiter(&masked.text, open_paren, '(', ')') else {
                // Parameter list never closes; the bracket scan reports it.
                continue;
            };

            self.scan_parameters(
                &masked.text[open_paren + 1..close_paren],
                original_lines,
                line_idx,
                issues,
            );

            let rest = &masked.text[close_paren + 1..];
            let body_open = rest.find('{');
            let terminator = rest.find(';');
            let clause_end = match (body_open, terminator) {
                // Interface-style declaration ending in `;` is well-formed.
                (Some(body), Some(term)) if term < body => continue,
                (None, Some(_)) => continue,
                (Some(body), _) => body,
                (None, None) => {
                    // Header ran off the end of the artifact.
                    let clause = rest.trim();
                    let fix = match returns_clause(clause) {
                        Some(types) => format!("{{ {} }}", default_return_for(&types)),
                        None => "{ }".to_string(),
                    };
                    issues.push(ValidationIssue::critical(
                        IssueKind::IncompleteDeclaration,
                        location_line(original_lines, line_idx),
                        format!("Function `{}` has no body", name.as_str()),
                        fix,
                    ));
                    continue;
                }
            };

            let clause = &rest[..clause_end];
            let Some(return_types) = returns_clause(clause) else {
                continue;
            };

            let body_open_abs = close_paren + 1 + clause_end;
            let Some(body_close) = matching_delimiter(&masked.text, body_open_abs, '{', '}') else {
                // Body never closes; the bracket scan reports it. A missing
                // return cannot be judged on a truncated body.
                continue;
            };
            let body = &masked.text[body_open_abs + 1..body_close];
            if RETURN_STMT.is_match(body) {
                continue;
            }

            issues.push(ValidationIssue::critical(
                IssueKind::MissingReturn,
                location_line(original_lines, line_idx),
                format!(
                    "Function `{}` declares a return type but never returns",
                    name.as_str()
                ),
                default_return_for(&return_types),
            ));
        }
    }

    /// Flags optional-marked parameters lacking a default value
    fn scan_parameters(
        &self,
        params: &str,
        original_lines: &[&str],
        line_idx: usize,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for param in split_top_level(params) {
            if param.contains('?') && !param.contains('=') {
                let name = param
                    .replace('?', " ")
                    .split_whitespace()
                    .last()
                    .unwrap_or("parameter")
                    .to_string();
                issues.push(ValidationIssue::warning(
                    IssueKind::MissingDefault,
                    location_line(original_lines, line_idx),
                    format!("Optional parameter `{}` has no default value", name),
                ));
            }
        }
    }

    /// Checks bracket balance over the masked source
    fn scan_brackets(
        &self,
        masked: &MaskedSource,
        original_lines: &[&str],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let mut stack: Vec<(char, usize)> = Vec::new();
        let mut line_idx = 0usize;

        for c in masked.text.chars() {
            match c {
                '\n' => line_idx += 1,
                '(' | '[' | '{' => stack.push((c, line_idx)),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.last() {
                        Some((open, _)) if *open == expected => {
                            stack.pop();
                        }
                        _ => {
                            issues.push(
                                ValidationIssue::new(
                                    IssueKind::Syntax,
                                    IssueSeverity::Critical,
                                    location_line(original_lines, line_idx),
                                    format!("Unexpected closing `{}`", c),
                                    None,
                                    false,
                                )
                                .expect("non-fixable issue"),
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            let closers: String = stack
                .iter()
                .rev()
                .map(|(open, _)| match open {
                    '(' => ')',
                    '[' => ']',
                    _ => '}',
                })
                .collect();
            let (_, first_line) = stack[0];
            issues.push(ValidationIssue::critical(
                IssueKind::BracketMismatch,
                location_line(original_lines, first_line),
                format!("{} unclosed bracket(s)", stack.len()),
                closers,
            ));
        }
    }

    /// Reports separators left dangling before a closer
    fn scan_dangling_separators(
        &self,
        masked: &MaskedSource,
        original_lines: &[&str],
        issues: &mut Vec<ValidationIssue>,
    ) {
        for captures in DANGLING_SEPARATOR.captures_iter(&masked.text) {
            let comma = captures.name("comma").expect("comma group");
            let line_idx = masked.text[..comma.start()].matches('\n').count();
            issues.push(ValidationIssue::critical(
                IssueKind::Syntax,
                location_line(original_lines, line_idx),
                "Dangling separator before closer",
                "",
            ));
        }
    }

    /// Reports string literals left open at end of line
    fn scan_unterminated_literals(
        &self,
        masked: &MaskedSource,
        original_lines: &[&str],
        issues: &mut Vec<ValidationIssue>,
    ) {
        for line in &masked.unterminated_literals {
            issues.push(
                ValidationIssue::new(
                    IssueKind::Syntax,
                    IssueSeverity::Critical,
                    location_line(original_lines, line.saturating_sub(1)),
                    "Unterminated string literal",
                    None,
                    false,
                )
                .expect("non-fixable issue"),
            );
        }
    }
}

/// Extracts the declared type from the text left of an assignment
///
/// The last whitespace token is the variable name; modifiers are stripped
/// and whatever remains is handed to the type parser.
pub(crate) fn declared_type(lhs: &str) -> Option<SolType> {
    let lhs = lhs.trim();
    let name_start = lhs.rfind(char::is_whitespace)?;
    let name = lhs[name_start..].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let type_text = MODIFIERS.replace_all(&lhs[..name_start], " ");
    SolType::parse(type_text.trim())
}

/// Parses the `returns (...)` clause of a function header, if present
pub(crate) fn returns_clause(clause: &str) -> Option<Vec<SolType>> {
    let idx = clause.find("returns")?;
    let rest = clause[idx + "returns".len()..].trim_start();
    if !rest.starts_with('(') {
        return None;
    }
    let close = matching_delimiter(rest, 0, '(', ')')?;
    let list = &rest[1..close];
    let types: Vec<SolType> = split_top_level(list)
        .into_iter()
        .filter_map(|part| {
            // Each entry may carry a name after the type; try the full text
            // first, then without the trailing token.
            SolType::parse(&part).or_else(|| {
                let trimmed = part.trim();
                let split = trimmed.rfind(char::is_whitespace)?;
                SolType::parse(&trimmed[..split])
            })
        })
        .collect();
    if types.is_empty() {
        None
    } else {
        Some(types)
    }
}

/// The default return statement for a returns list
pub(crate) fn default_return_for(types: &[SolType]) -> String {
    if types.len() == 1 {
        types[0].default_return()
    } else {
        let defaults: Vec<String> = types
            .iter()
            .map(|t| t.default_value().unwrap_or_else(|| "0".to_string()))
            .collect();
        format!("return ({});", defaults.join(", "))
    }
}

/// Finds the index of the delimiter matching the opener at `open_idx`
pub(crate) fn matching_delimiter(
    text: &str,
    open_idx: usize,
    open: char,
    close: char,
) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text[open_idx..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(open_idx + offset);
            }
        }
    }
    None
}

/// Splits on commas that sit outside any nested bracket
pub(crate) fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts.retain(|p| !p.is_empty());
    parts
}

/// Location at a column within a line, with the original line as snippet
fn location_at(original_lines: &[&str], line_idx: usize, column: usize) -> IssueLocation {
    let snippet = original_lines.get(line_idx).map(|l| l.trim()).unwrap_or("");
    IssueLocation::new(line_idx + 1, column + 1, snippet)
}

/// Location pointing at a whole line
fn location_line(original_lines: &[&str], line_idx: usize) -> IssueLocation {
    location_at(original_lines, line_idx, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(code: &str) -> ValidationReport {
        DefectDetector::new().scan(code)
    }

    #[test]
    fn test_placeholder_in_string_declaration() {
        let report = scan("contract A {\n    string public name = undefined;\n}");
        assert_eq!(report.critical_issues, 1);
        let issue = &report.issues[0];
        assert_eq!(issue.kind, IssueKind::LiteralPlaceholder);
        assert_eq!(issue.suggested_fix.as_deref(), Some("\"\""));
        assert!(issue.auto_fixable);
        assert_eq!(issue.location.line, 2);
    }

    #[test]
    fn test_placeholder_type_defaults() {
        let cases = [
            ("uint256 public total = undefined;", "0"),
            ("bool internal active = null;", "false"),
            ("address public owner = undefined;", "address(0)"),
            ("bytes32 public root = undefined;", "bytes32(0)"),
            ("uint256[] public ids = undefined;", "new uint256[](0)"),
        ];
        for (line, expected) in cases {
            let code = format!("contract A {{\n    {}\n}}", line);
            let report = scan(&code);
            let issue = report
                .issues
                .iter()
                .find(|i| i.kind == IssueKind::LiteralPlaceholder)
                .unwrap_or_else(|| panic!("no placeholder issue for `{}`", line));
            assert_eq!(issue.suggested_fix.as_deref(), Some(expected), "{}", line);
        }
    }

    #[test]
    fn test_placeholder_without_space_before_equals() {
        let report = scan("contract A {\n    uint256 public total=undefined;\n}");
        let issue = &report.issues[0];
        assert_eq!(issue.kind, IssueKind::LiteralPlaceholder);
        assert_eq!(issue.suggested_fix.as_deref(), Some("0"));
    }

    #[test]
    fn test_placeholder_inside_string_not_flagged() {
        let report = scan("contract A {\n    string public note = \"undefined\";\n}");
        assert!(report.is_clean());
    }

    #[test]
    fn test_placeholder_inside_comment_not_flagged() {
        let report = scan("contract A {\n    // value = undefined;\n    uint256 public a = 1;\n}");
        assert!(report.is_clean());
    }

    #[test]
    fn test_mapping_placeholder_suggests_initializer_removal() {
        let report =
            scan("contract A {\n    mapping(address => uint256) public balances = undefined;\n}");
        let issue = &report.issues[0];
        assert_eq!(issue.kind, IssueKind::LiteralPlaceholder);
        assert_eq!(issue.suggested_fix.as_deref(), Some(""));
    }

    #[test]
    fn test_nested_generic_placeholder() {
        let report = scan(
            "contract A {\n    mapping(address => uint256[]) public holdings = undefined;\n}",
        );
        let issue = &report.issues[0];
        assert_eq!(issue.kind, IssueKind::LiteralPlaceholder);
        assert_eq!(issue.suggested_fix.as_deref(), Some(""));
    }

    #[test]
    fn test_untyped_placeholder_is_not_auto_fixable() {
        let report =
            scan("contract A {\n    function f() public {\n        x = undefined;\n    }\n}");
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::LiteralPlaceholder)
            .expect("placeholder issue");
        assert!(!issue.auto_fixable);
        assert!(issue.suggested_fix.is_none());
    }

    #[test]
    fn test_incomplete_declaration() {
        let report = scan("contract A {\n    uint256 public supply = ;\n}");
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::IncompleteDeclaration)
            .expect("incomplete issue");
        assert_eq!(issue.suggested_fix.as_deref(), Some("0"));
    }

    #[test]
    fn test_truncated_statement_at_line_end() {
        let report = scan("contract A {\n    string public name =\n}");
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::IncompleteDeclaration));
    }

    #[test]
    fn test_missing_return_uint() {
        let code = "contract A {\n    function count() public view returns (uint256) {\n    }\n}";
        let report = scan(code);
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::MissingReturn)
            .expect("missing-return issue");
        assert_eq!(issue.suggested_fix.as_deref(), Some("return 0;"));
        assert_eq!(issue.severity, IssueSeverity::Critical);
        assert_eq!(issue.location.line, 2);
    }

    #[test]
    fn test_missing_return_tuple() {
        let code =
            "contract A {\n    function pair() public view returns (uint256, bool) {\n    }\n}";
        let report = scan(code);
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::MissingReturn)
            .expect("missing-return issue");
        assert_eq!(issue.suggested_fix.as_deref(), Some("return (0, false);"));
    }

    #[test]
    fn test_missing_return_named_type() {
        let code = "contract A {\n    function who() public view returns (address owner) {\n    }\n}";
        let report = scan(code);
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::MissingReturn)
            .expect("missing-return issue");
        assert_eq!(issue.suggested_fix.as_deref(), Some("return address(0);"));
    }

    #[test]
    fn test_function_with_return_not_flagged() {
        let code = "contract A {\n    function count() public view returns (uint256) {\n        return 1;\n    }\n}";
        let report = scan(code);
        assert!(report
            .issues
            .iter()
            .all(|i| i.kind != IssueKind::MissingReturn));
    }

    #[test]
    fn test_void_function_not_flagged() {
        let code = "contract A {\n    event Touched();\n    function touch() public {\n        emit Touched();\n    }\n}";
        let report = scan(code);
        assert!(report
            .issues
            .iter()
            .all(|i| i.kind != IssueKind::MissingReturn));
    }

    #[test]
    fn test_interface_declaration_not_flagged() {
        let code = "interface IA {\n    function count() external view returns (uint256);\n}";
        let report = scan(code);
        assert!(report.is_clean());
    }

    #[test]
    fn test_truncated_signature_flagged() {
        let code = "contract A {\n    function count() public view returns (uint256)";
        let report = scan(code);
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::IncompleteDeclaration)
            .expect("incomplete signature issue");
        assert_eq!(issue.suggested_fix.as_deref(), Some("{ return 0; }"));
    }

    #[test]
    fn test_optional_parameter_warning() {
        let code = "contract A {\n    event Minted(address to, uint256 amount);\n    function mint(address to, uint256 amount?) public {\n        emit Minted(to, amount);\n    }\n}";
        let report = scan(code);
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::MissingDefault)
            .expect("missing-default issue");
        assert_eq!(issue.severity, IssueSeverity::Warning);
        assert!(!issue.auto_fixable);
        assert!(issue.message.contains("amount"));
    }

    #[test]
    fn test_unclosed_brackets() {
        let report = scan("contract A {\n    function f() public {\n        emit E();\n");
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::BracketMismatch)
            .expect("bracket issue");
        assert_eq!(issue.suggested_fix.as_deref(), Some("}}"));
    }

    #[test]
    fn test_stray_closer() {
        let report = scan("contract A {\n}\n}");
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::Syntax && !i.auto_fixable));
    }

    #[test]
    fn test_dangling_separator_flagged() {
        let report = scan("contract A {\n    event E(uint256 a,);\n}");
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::Syntax)
            .expect("syntax issue");
        assert!(issue.auto_fixable);
        assert_eq!(issue.suggested_fix.as_deref(), Some(""));
    }

    #[test]
    fn test_unterminated_literal_flagged() {
        let report = scan("contract A {\n    string public s = \"oops;\n}");
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::Syntax && i.message.contains("Unterminated")));
    }

    #[test]
    fn test_unscannable_input_yields_clean_report() {
        assert!(scan("").is_clean());
        assert!(scan("   \n\t ").is_clean());
        assert!(scan("\u{0}\u{1}\u{2}").is_clean());
    }

    #[test]
    fn test_comparison_not_flagged_as_placeholder() {
        let code = "contract A {\n    function f(uint256 x) public pure returns (bool) {\n        return x == 0;\n    }\n}";
        let report = scan(code);
        assert!(report
            .issues
            .iter()
            .all(|i| i.kind != IssueKind::LiteralPlaceholder));
    }
}
