//! Prompt building for contract generation
//!
//! Builds the structured prompt sent to the generation backend and, on
//! retries, enhances it with a description of the defects the previous
//! attempt produced so the backend is biased toward fixing them.

use serde::{Deserialize, Serialize};

use contractforge_domain::{ContractCategory, GenerationRequest, ValidationReport};

/// A prompt ready to send to the generation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractPrompt {
    /// System prompt with context and output constraints
    pub system_prompt: String,
    /// User prompt with the generation request
    pub user_prompt: String,
}

impl ContractPrompt {
    /// Creates a prompt from its two halves
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }
}

/// Builds and progressively enhances backend prompts
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Creates a new prompt builder
    pub fn new() -> Self {
        Self
    }

    /// Builds the initial prompt for a request
    pub fn build(&self, request: &GenerationRequest) -> ContractPrompt {
        let category = ContractCategory::classify(&request.prompt);
        let system_prompt = [
            "You are an expert smart-contract generator.",
            "Emit one complete, syntactically closed contract and nothing else.",
            "Never leave placeholder values, optional markers, or unfinished statements.",
            &format!("Contract category: {}", category.as_str()),
            &format!("Contract name: {}", request.contract_identifier()),
        ]
        .join("\n");

        ContractPrompt {
            system_prompt,
            user_prompt: request.prompt.clone(),
        }
    }

    /// Enhances a prompt with the defects found in the previous attempt
    pub fn enhance(
        &self,
        previous: &ContractPrompt,
        report: &ValidationReport,
        attempt: u32,
    ) -> ContractPrompt {
        if report.is_clean() {
            return previous.clone();
        }

        let mut feedback = vec![format!(
            "The previous attempt (#{}) had {} defect(s) that must not reappear:",
            attempt, report.total_issues
        )];
        for issue in report.issues.iter().take(10) {
            feedback.push(format!(
                "- line {}: {} ({})",
                issue.location.line,
                issue.message,
                issue.location.snippet
            ));
        }
        if report.total_issues > 10 {
            feedback.push(format!("- and {} more", report.total_issues - 10));
        }

        ContractPrompt {
            system_prompt: previous.system_prompt.clone(),
            user_prompt: format!("{}\n\n{}", previous.user_prompt, feedback.join("\n")),
        }
    }
}
