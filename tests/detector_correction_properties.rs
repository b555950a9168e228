//! Property-based tests for the detector/corrector pair
//!
//! Covers the pipeline's core guarantees: every typed placeholder
//! declaration yields exactly one critical issue with the type-correct
//! default, correction is idempotent, and scores stay inside [0, 100].

use proptest::prelude::*;

use contractforge_domain::{IssueKind, SolType};
use contractforge_generation::{AutoCorrector, DefectDetector, QualityScorer};

/// Strategy for valid Solidity identifiers
fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,12}".prop_map(|s| s.to_string())
}

/// Strategy for elementary declared types with their expected defaults
fn typed_default_strategy() -> impl Strategy<Value = (String, String)> {
    prop_oneof![
        Just(("string".to_string(), "\"\"".to_string())),
        Just(("uint256".to_string(), "0".to_string())),
        Just(("uint8".to_string(), "0".to_string())),
        Just(("int256".to_string(), "0".to_string())),
        Just(("bool".to_string(), "false".to_string())),
        Just(("address".to_string(), "address(0)".to_string())),
        Just(("bytes32".to_string(), "bytes32(0)".to_string())),
        Just(("uint256[]".to_string(), "new uint256[](0)".to_string())),
        Just(("string[]".to_string(), "new string[](0)".to_string())),
    ]
}

/// Strategy for the placeholder tokens the backend leaks
fn placeholder_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("undefined".to_string()),
        Just("null".to_string()),
        Just("NaN".to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_typed_placeholder_yields_one_critical_with_type_default(
        name in identifier_strategy(),
        (sol_type, expected) in typed_default_strategy(),
        token in placeholder_strategy(),
    ) {
        let code = format!(
            "contract Sample {{\n    {} public {} = {};\n}}",
            sol_type, name, token
        );
        let report = DefectDetector::new().scan(&code);

        prop_assert_eq!(report.critical_issues, 1);
        let issue = &report.issues[0];
        prop_assert_eq!(issue.kind, IssueKind::LiteralPlaceholder);
        prop_assert!(issue.auto_fixable);
        prop_assert_eq!(issue.suggested_fix.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn prop_corrector_is_idempotent(
        name in identifier_strategy(),
        (sol_type, _expected) in typed_default_strategy(),
        token in placeholder_strategy(),
    ) {
        let code = format!(
            "contract Sample {{\n    {} public {} = {};\n}}",
            sol_type, name, token
        );
        let corrector = AutoCorrector::new();
        let first = corrector.correct(&code);
        prop_assert!(!first.corrections_applied.is_empty());

        let second = corrector.correct(&first.corrected_code);
        prop_assert!(second.corrections_applied.is_empty());
        prop_assert_eq!(second.corrected_code, first.corrected_code);
        prop_assert_eq!(second.confidence, 100.0);
    }

    #[test]
    fn prop_corrected_placeholder_scans_clean(
        name in identifier_strategy(),
        (sol_type, _expected) in typed_default_strategy(),
        token in placeholder_strategy(),
    ) {
        let code = format!(
            "contract Sample {{\n    {} public {} = {};\n}}",
            sol_type, name, token
        );
        let outcome = AutoCorrector::new().correct(&code);
        let report = DefectDetector::new().scan(&outcome.corrected_code);
        prop_assert_eq!(report.critical_issues, 0);
    }

    #[test]
    fn prop_scores_stay_in_bounds(code in "[ -~\\n]{0,200}") {
        let score = QualityScorer::new().score(&code);
        for value in [
            score.overall,
            score.syntax,
            score.logic,
            score.completeness,
            score.best_practices,
        ] {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn prop_detector_never_panics(code in "[ -~\\n]{0,300}") {
        let report = DefectDetector::new().scan(&code);
        prop_assert_eq!(
            report.total_issues,
            report.issues.len()
        );
        prop_assert!(report.critical_issues <= report.total_issues);
    }

    #[test]
    fn prop_nested_type_defaults_recursive(depth in 1usize..4) {
        let mut type_name = "uint256".to_string();
        for _ in 0..depth {
            type_name.push_str("[]");
        }
        let parsed = SolType::parse(&type_name).expect("parses");
        let default = parsed.default_value().expect("has default");
        prop_assert!(default.starts_with("new "));
        prop_assert!(default.ends_with("(0)"));
    }
}

#[test]
fn test_scenario_missing_return_gets_integer_default() {
    // Scenario B: an integer-returning function with an empty body yields
    // one missing-return issue suggesting `0`, and the corrector inserts
    // the return before the closing brace.
    let code = "contract Sample {\n    function count() public view returns (uint256) {\n    }\n}";
    let report = DefectDetector::new().scan(code);
    let issue = report
        .issues
        .iter()
        .find(|i| i.kind == IssueKind::MissingReturn)
        .expect("missing-return issue");
    assert_eq!(issue.suggested_fix.as_deref(), Some("return 0;"));

    let outcome = AutoCorrector::new().correct(code);
    let body_start = outcome.corrected_code.find('{').expect("body");
    let close = outcome.corrected_code.rfind('}').expect("close");
    let inserted = outcome.corrected_code.find("return 0;").expect("return");
    assert!(inserted > body_start && inserted < close);
}
