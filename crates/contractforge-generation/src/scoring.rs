//! Quality scoring for generated contract code
//!
//! Rolls four deterministic sub-scores into an overall score and the
//! production-readiness gate. Scoring never touches unmasked source, so
//! string contents cannot influence any heuristic.

use once_cell::sync::Lazy;
use regex::Regex;

use contractforge_domain::{
    ContractCategory, IssueKind, QualityScore, ScoreWeights, ValidationReport,
};

use crate::detector::DefectDetector;
use crate::error::GenerationError;
use crate::masking::mask;

static EMPTY_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\s*\}").expect("empty-body pattern"));

static FUNCTION_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function\s+[A-Za-z_]\w*\s*\([^)]*\)\s*(?P<clause>[^{;]*)")
        .expect("function-clause pattern")
});

static STATE_VARIABLE: Lazy<Regex> = Lazy::new(|| {
    // A declaration at contract scope: type, optional modifiers, name, then
    // `;` or `=`. Indentation of one level distinguishes it from locals;
    // `=[^>]` keeps the lazy match from stopping inside a mapping arrow.
    Regex::new(r"(?m)^    (?P<decl>[A-Za-z_][\w\[\]()=>, ]*?)\s*(;|=[^>])")
        .expect("state-var pattern")
});

/// Options for the quality scorer
#[derive(Debug, Clone)]
pub struct ScoringOptions {
    /// Minimum overall score for production readiness
    pub threshold: f64,
    /// Sub-score weights
    pub weights: ScoreWeights,
    /// Category whose required elements are checked, when known
    pub category: Option<ContractCategory>,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            weights: ScoreWeights::default(),
            category: None,
        }
    }
}

/// Computes multi-dimensional quality scores for contract source
///
/// Identical input always yields the identical score.
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    options: ScoringOptions,
}

impl QualityScorer {
    /// Creates a scorer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scorer with custom options, validating the weights
    pub fn with_options(options: ScoringOptions) -> Result<Self, GenerationError> {
        options.weights.validate()?;
        Ok(Self { options })
    }

    /// Scans and scores in one call
    pub fn score(&self, code: &str) -> QualityScore {
        let report = DefectDetector::new().scan(code);
        self.score_with_report(code, &report)
    }

    /// Scores code using an already-computed validation report
    pub fn score_with_report(&self, code: &str, report: &ValidationReport) -> QualityScore {
        if code.trim().is_empty() {
            return QualityScore::zero();
        }
        let masked = mask(code).text;

        let syntax = self.score_syntax(report);
        let logic = self.score_logic(report);
        let completeness = self.score_completeness(&masked);
        let best_practices = self.score_best_practices(&masked);

        QualityScore::from_components(
            syntax,
            logic,
            completeness,
            best_practices,
            &self.options.weights,
            self.options.threshold,
            report.critical_issues,
        )
    }

    /// Structural validity: balance and statement closure
    fn score_syntax(&self, report: &ValidationReport) -> f64 {
        let mut score: f64 = 100.0;
        for issue in &report.issues {
            score -= match issue.kind {
                IssueKind::BracketMismatch => 30.0,
                IssueKind::Syntax => 25.0,
                IssueKind::IncompleteDeclaration => 15.0,
                _ => 0.0,
            };
        }
        score.max(0.0)
    }

    /// Control-flow sanity: returns present, no placeholder values
    fn score_logic(&self, report: &ValidationReport) -> f64 {
        let mut score: f64 = 100.0;
        for issue in &report.issues {
            score -= match issue.kind {
                IssueKind::MissingReturn => 25.0,
                IssueKind::LiteralPlaceholder => 20.0,
                IssueKind::MissingDefault => 5.0,
                _ => 0.0,
            };
        }
        score.max(0.0)
    }

    /// Required elements present, bodies non-empty
    fn score_completeness(&self, masked: &str) -> f64 {
        let mut score = 100.0;

        if !masked.contains("constructor(") && !masked.contains("constructor (") {
            score -= 40.0;
        }
        if !masked.contains("event ") {
            score -= 25.0;
        }

        let empty_bodies = EMPTY_BODY.find_iter(masked).count() as f64;
        score -= (empty_bodies * 10.0).min(30.0);

        if let Some(category) = self.options.category {
            if !category_elements_present(masked, category) {
                score -= 20.0;
            }
        }

        score.max(0.0)
    }

    /// Convention adherence: explicit visibility and observable effects
    fn score_best_practices(&self, masked: &str) -> f64 {
        let mut score = 100.0;

        let mut functions = 0usize;
        let mut without_visibility = 0usize;
        for captures in FUNCTION_CLAUSE.captures_iter(masked) {
            functions += 1;
            let clause = captures.name("clause").map(|c| c.as_str()).unwrap_or("");
            let has_visibility = ["public", "private", "internal", "external"]
                .iter()
                .any(|v| clause.contains(v));
            if !has_visibility {
                without_visibility += 1;
            }
        }
        score -= (without_visibility as f64 * 25.0).min(60.0);

        if functions > 0 && !masked.contains("emit ") {
            score -= 20.0;
        }

        let mut unqualified_state = 0usize;
        for captures in STATE_VARIABLE.captures_iter(masked) {
            let decl = captures.name("decl").map(|c| c.as_str()).unwrap_or("");
            if decl.starts_with("function")
                || decl.starts_with("event")
                || decl.starts_with("constructor")
                || decl.starts_with("modifier")
                || decl.starts_with("return")
                || decl.starts_with("emit")
                || decl.starts_with("require")
            {
                continue;
            }
            let has_visibility = ["public", "private", "internal"]
                .iter()
                .any(|v| decl.contains(v));
            if !has_visibility {
                unqualified_state += 1;
            }
        }
        score -= (unqualified_state as f64 * 10.0).min(30.0);

        score.max(0.0)
    }
}

/// Whether the identifiers a category requires appear in the source
fn category_elements_present(masked: &str, category: ContractCategory) -> bool {
    let required: &[&str] = match category {
        ContractCategory::Collectible => &["ownerOf", "mint"],
        ContractCategory::Fungible => &["transfer", "balanceOf"],
        ContractCategory::Governance => &["propose", "vote"],
        ContractCategory::Marketplace => &["list", "buy"],
        ContractCategory::Generic => return true,
    };
    required.iter().all(|element| masked.contains(element))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE_CONTRACT: &str = r#"
contract Counter {
    uint256 public count;
    address public owner;

    event Incremented(address indexed caller, uint256 newCount);

    constructor() {
        owner = msg.sender;
    }

    function increment() public {
        count += 1;
        emit Incremented(msg.sender, count);
    }

    function current() public view returns (uint256) {
        return count;
    }
}
"#;

    #[test]
    fn test_complete_contract_scores_high() {
        let scorer = QualityScorer::new();
        let score = scorer.score(COMPLETE_CONTRACT);
        assert!(score.overall >= 80.0, "overall was {}", score.overall);
        assert!(score.production_readiness);
    }

    #[test]
    fn test_deterministic() {
        let scorer = QualityScorer::new();
        let first = scorer.score(COMPLETE_CONTRACT);
        let second = scorer.score(COMPLETE_CONTRACT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_placeholder_blocks_readiness() {
        let scorer = QualityScorer::new();
        let code = "contract A {\n    event E(uint256 v);\n    constructor() {\n        emit E(1);\n    }\n    uint256 public total = undefined;\n}";
        let score = scorer.score(code);
        assert!(!score.production_readiness);
        assert!(score.logic < 100.0);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let scorer = QualityScorer::new();
        let score = scorer.score("");
        assert_eq!(score.overall, 0.0);
        assert!(!score.production_readiness);
    }

    #[test]
    fn test_bounds_hold_for_broken_input() {
        let scorer = QualityScorer::new();
        let code = "function f( {{{ ]]] = undefined = = ;;";
        let score = scorer.score(code);
        for value in [
            score.overall,
            score.syntax,
            score.logic,
            score.completeness,
            score.best_practices,
        ] {
            assert!((0.0..=100.0).contains(&value), "value {} out of range", value);
        }
    }

    #[test]
    fn test_missing_visibility_penalized() {
        let scorer = QualityScorer::new();
        let with_visibility = "contract A {\n    event E();\n    constructor() {\n        emit E();\n    }\n    function f() public {\n        emit E();\n    }\n}";
        let without_visibility = "contract A {\n    event E();\n    constructor() {\n        emit E();\n    }\n    function f() {\n        emit E();\n    }\n}";
        let high = scorer.score(with_visibility);
        let low = scorer.score(without_visibility);
        assert!(high.best_practices > low.best_practices);
    }

    #[test]
    fn test_mapping_state_variable_visibility_recognized() {
        let scorer = QualityScorer::new();
        let qualified = "contract A {\n    mapping(address => uint256) private balances;\n    event E();\n    constructor() {\n        emit E();\n    }\n}";
        let unqualified = "contract A {\n    mapping(address => uint256) balances;\n    event E();\n    constructor() {\n        emit E();\n    }\n}";
        let high = scorer.score(qualified);
        let low = scorer.score(unqualified);
        assert!(high.best_practices > low.best_practices);
    }

    #[test]
    fn test_category_elements_checked() {
        let options = ScoringOptions {
            category: Some(ContractCategory::Fungible),
            ..Default::default()
        };
        let scorer = QualityScorer::with_options(options).expect("valid options");
        let generic = "contract A {\n    event E();\n    constructor() {\n        emit E();\n    }\n}";
        let score = scorer.score(generic);
        assert!(score.completeness < 100.0);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let options = ScoringOptions {
            weights: ScoreWeights {
                syntax: 0.9,
                logic: 0.9,
                completeness: 0.9,
                best_practices: 0.9,
            },
            ..Default::default()
        };
        assert!(QualityScorer::with_options(options).is_err());
    }
}
