//! The generation controller state machine
//!
//! Sequences request, validation, correction, scoring, retry, and fallback
//! for one generation request:
//!
//! `Requesting -> Validating -> Correcting -> Scoring ->
//!  {Accepted | Retrying | FallbackUsed | Failed}`
//!
//! Retries are strictly sequential because each retry prompt is enhanced
//! with the previous attempt's defects. Every terminal state reports into
//! the monitor, and the returned result is always fully populated; only a
//! failing fallback generator escapes as an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use contractforge_cache::{CacheClass, ValidationCache};
use contractforge_domain::{
    ContractCategory, CorrectionAttempt, CorrectionRisk, GenerationMetrics, GenerationRequest,
    IssueKind, IssueLocation, IssueSeverity, PipelineConfig, QualityAssuredResult, QualityScore,
    ValidationIssue, ValidationReport,
};
use contractforge_monitoring::PipelineMonitor;

use crate::backend::GenerationBackend;
use crate::corrector::{AutoCorrector, CorrectorConfig};
use crate::detector::DefectDetector;
use crate::error::GenerationError;
use crate::fallback::FallbackGenerator;
use crate::prompt::{ContractPrompt, PromptBuilder};
use crate::scoring::{QualityScorer, ScoringOptions};

/// States of the generation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationState {
    /// Calling the backend
    Requesting,
    /// Scanning the candidate for defects
    Validating,
    /// Repairing detected defects
    Correcting,
    /// Scoring the (possibly corrected) candidate
    Scoring,
    /// The candidate met the quality gate
    Accepted,
    /// Starting another attempt with an enhanced prompt
    Retrying,
    /// The deterministic fallback produced the artifact
    FallbackUsed,
    /// No safe artifact could be produced
    Failed,
}

/// One state transition, emitted to the progress channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The state being entered
    pub state: GenerationState,
    /// 1-based attempt number
    pub attempt: u32,
    /// Short description of the transition
    pub message: String,
}

/// Orchestrates one generation request end to end
pub struct GenerationController {
    backend: Arc<dyn GenerationBackend>,
    detector: DefectDetector,
    corrector: AutoCorrector,
    prompt_builder: PromptBuilder,
    fallback: FallbackGenerator,
    config: PipelineConfig,
    cache: Arc<ValidationCache>,
    monitor: Arc<PipelineMonitor>,
    progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
    cancel: CancellationToken,
}

impl GenerationController {
    /// Creates a controller, validating the pipeline configuration
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        cache: Arc<ValidationCache>,
        monitor: Arc<PipelineMonitor>,
        config: PipelineConfig,
    ) -> Result<Self, GenerationError> {
        config.validate()?;
        let corrector = AutoCorrector::with_config(CorrectorConfig {
            confidence_floor: config.confidence_floor,
        });
        Ok(Self {
            backend,
            detector: DefectDetector::new(),
            corrector,
            prompt_builder: PromptBuilder::new(),
            fallback: FallbackGenerator::new(),
            config,
            cache,
            monitor,
            progress: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Attaches a progress channel receiving every state transition
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// A token that cancels further retries when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the state machine for one request
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<QualityAssuredResult, GenerationError> {
        self.monitor.request_started();
        let result = self.run(&request).await;
        self.monitor.request_finished();
        result
    }

    async fn run(
        &self,
        request: &GenerationRequest,
    ) -> Result<QualityAssuredResult, GenerationError> {
        let category = ContractCategory::classify(&request.prompt);
        let scorer = QualityScorer::with_options(ScoringOptions {
            threshold: request.quality_threshold,
            weights: self.config.score_weights.clone(),
            category: Some(category),
        })?;

        let mut metrics = GenerationMetrics::start();
        let mut validation_results: Vec<ValidationReport> = Vec::new();
        let mut correction_history: Vec<CorrectionAttempt> = Vec::new();
        let mut prompt = self.prompt_builder.build(request);
        let max_retries = request.max_retries.max(1);
        let mut last_score = 0.0;

        for attempt in 1..=max_retries {
            if self.cancel.is_cancelled() {
                return self
                    .fallback_result(
                        request,
                        category,
                        &scorer,
                        "generation cancelled".to_string(),
                        metrics,
                        validation_results,
                        correction_history,
                    )
                    .await;
            }

            metrics.attempt_count = attempt;
            self.emit(
                GenerationState::Requesting,
                attempt,
                format!("requesting candidate from `{}`", self.backend.id()),
            );

            let code = match self.request_candidate(&prompt).await {
                Ok(code) => code,
                Err(reason) => {
                    metrics.issues_detected += 1;
                    validation_results.push(backend_failure_report(&reason));
                    return self
                        .fallback_result(
                            request,
                            category,
                            &scorer,
                            reason,
                            metrics,
                            validation_results,
                            correction_history,
                        )
                        .await;
                }
            };

            self.emit(GenerationState::Validating, attempt, "scanning candidate");
            let report = self.scan_cached(&code, &mut metrics).await;
            metrics.issues_detected += report.total_issues;
            validation_results.push(report.clone());

            let mut working_code = code;
            let mut current_report = report.clone();
            let mut requires_regeneration = false;

            if current_report.has_blocking_issues {
                self.emit(
                    GenerationState::Correcting,
                    attempt,
                    format!("repairing {} issue(s)", current_report.critical_issues),
                );
                let started = Instant::now();
                let outcome = self.corrector.correct(&working_code);
                let validation = self
                    .corrector
                    .validate_corrections(&working_code, &outcome.corrected_code);
                metrics.correction_time_ms += started.elapsed().as_millis() as u64;
                metrics.record_fixes(
                    outcome
                        .original_issue_count
                        .saturating_sub(outcome.remaining_issue_count),
                );
                correction_history.push(CorrectionAttempt {
                    attempt_number: attempt,
                    timestamp: Utc::now(),
                    corrections: outcome.corrections_applied.clone(),
                    success: !outcome.requires_regeneration,
                    quality_improvement: validation.quality_improvement,
                });

                requires_regeneration = outcome.requires_regeneration
                    || (request.strict_mode && validation.risk == CorrectionRisk::High);
                working_code = outcome.corrected_code;
                current_report = self.scan_cached(&working_code, &mut metrics).await;
                validation_results.push(current_report.clone());
            }

            self.emit(GenerationState::Scoring, attempt, "scoring candidate");
            let score = self
                .score_cached(&scorer, &working_code, &current_report)
                .await;
            last_score = score.overall;
            self.monitor.update_cache_stats(self.cache.stats());

            if !current_report.has_blocking_issues
                && score.overall >= request.quality_threshold
                && !requires_regeneration
            {
                self.emit(GenerationState::Accepted, attempt, "candidate accepted");
                metrics.finish(score.overall);
                info!(
                    attempt,
                    score = score.overall,
                    "generation accepted"
                );
                self.monitor.record_generation(
                    score.overall,
                    true,
                    metrics.total_generation_time_ms as f64,
                    correction_history.len() as u32,
                    false,
                );
                return Ok(QualityAssuredResult {
                    code: working_code,
                    quality_score: score,
                    validation_results,
                    correction_history,
                    fallback_used: false,
                    fallback_reason: None,
                    metrics,
                });
            }

            if attempt < max_retries && !self.cancel.is_cancelled() {
                self.emit(
                    GenerationState::Retrying,
                    attempt,
                    format!("score {:.0} rejected, enhancing prompt", score.overall),
                );
                prompt = self.prompt_builder.enhance(&prompt, &report, attempt);
            }
        }

        let reason = format!(
            "quality score {:.0} below threshold {:.0} after {} attempt(s)",
            last_score, request.quality_threshold, max_retries
        );
        self.fallback_result(
            request,
            category,
            &scorer,
            reason,
            metrics,
            validation_results,
            correction_history,
        )
        .await
    }

    /// Calls the backend under the configured timeout and cancellation
    ///
    /// Any failure is reduced to the reason string the fallback records.
    async fn request_candidate(&self, prompt: &ContractPrompt) -> Result<String, String> {
        let budget = Duration::from_millis(self.config.backend_timeout_ms);
        tokio::select! {
            _ = self.cancel.cancelled() => Err("generation cancelled".to_string()),
            outcome = tokio::time::timeout(budget, self.backend.generate_code(prompt)) => {
                match outcome {
                    Ok(Ok(code)) => Ok(code),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(GenerationError::BackendTimeout {
                        elapsed_ms: self.config.backend_timeout_ms,
                    }
                    .to_string()),
                }
            }
        }
    }

    /// Scans through the validation cache, degrading to a direct scan
    async fn scan_cached(&self, code: &str, metrics: &mut GenerationMetrics) -> ValidationReport {
        let started = Instant::now();
        let key = format!("{:016x}", fxhash::hash64(code.as_bytes()));
        let report = match self
            .cache
            .get_or_compute(CacheClass::Error, &key, || async {
                self.detector.scan(code)
            })
            .await
        {
            Ok(report) => report,
            Err(e) => {
                warn!("validation cache unavailable: {}", e);
                self.detector.scan(code)
            }
        };
        metrics.validation_time_ms += started.elapsed().as_millis() as u64;
        report
    }

    /// Scores through the validation cache, degrading to a direct score
    async fn score_cached(
        &self,
        scorer: &QualityScorer,
        code: &str,
        report: &ValidationReport,
    ) -> QualityScore {
        let key = format!("{:016x}", fxhash::hash64(code.as_bytes()));
        match self
            .cache
            .get_or_compute(CacheClass::Quality, &key, || async {
                scorer.score_with_report(code, report)
            })
            .await
        {
            Ok(score) => score,
            Err(e) => {
                warn!("quality cache unavailable: {}", e);
                scorer.score_with_report(code, report)
            }
        }
    }

    /// Terminal fallback path; only its own failure escapes as an error
    #[allow(clippy::too_many_arguments)]
    async fn fallback_result(
        &self,
        request: &GenerationRequest,
        category: ContractCategory,
        scorer: &QualityScorer,
        reason: String,
        mut metrics: GenerationMetrics,
        mut validation_results: Vec<ValidationReport>,
        correction_history: Vec<CorrectionAttempt>,
    ) -> Result<QualityAssuredResult, GenerationError> {
        self.emit(
            GenerationState::FallbackUsed,
            metrics.attempt_count.max(1),
            reason.clone(),
        );
        warn!(reason = %reason, "falling back to deterministic artifact");

        let code = match self.fallback.generate(&request.prompt, Some(category)) {
            Ok(code) => code,
            Err(e) => {
                self.emit(
                    GenerationState::Failed,
                    metrics.attempt_count.max(1),
                    "fallback generation failed",
                );
                metrics.finish(0.0);
                self.monitor.record_generation(
                    0.0,
                    false,
                    metrics.total_generation_time_ms as f64,
                    correction_history.len() as u32,
                    false,
                );
                return Err(GenerationError::FallbackFailed(e.to_string()));
            }
        };

        let report = self.detector.scan(&code);
        let score = scorer.score_with_report(&code, &report);
        validation_results.push(report);
        metrics.finish(score.overall);
        self.monitor.record_generation(
            score.overall,
            false,
            metrics.total_generation_time_ms as f64,
            correction_history.len() as u32,
            true,
        );

        Ok(QualityAssuredResult {
            code,
            quality_score: score,
            validation_results,
            correction_history,
            fallback_used: true,
            fallback_reason: Some(reason),
            metrics,
        })
    }

    fn emit(&self, state: GenerationState, attempt: u32, message: impl Into<String>) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(ProgressEvent {
                state,
                attempt,
                message: message.into(),
            });
        }
    }
}

/// A synthetic report recording a backend failure as one critical issue
///
/// Keeps the caller-facing invariant that even a total failure carries at
/// least one detected issue.
fn backend_failure_report(reason: &str) -> ValidationReport {
    let issue = ValidationIssue::new(
        IssueKind::Syntax,
        IssueSeverity::Critical,
        IssueLocation::new(1, 1, ""),
        format!("backend error: {}", reason),
        None,
        false,
    )
    .expect("non-fixable issue");
    ValidationReport::from_issues(vec![issue])
}
