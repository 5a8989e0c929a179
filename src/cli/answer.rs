//! Answer command for glosor.
//!
//! Records the outcome of one question. The outcome is either given
//! directly or decided by comparing a typed response with the accepted
//! answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::question::{answer_text, is_correct_response, texts};
use crate::core::{DirectionId, WordId};
use crate::error::{Result, VocabError};
use crate::scheduler::Scheduler;
use crate::storage::VocabularyStore;

/// How the outcome is determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Typed response to check against the word.
    Response(String),
}

/// Options for the answer command.
#[derive(Debug, Clone)]
pub struct AnswerOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    pub word_id: WordId,
    pub direction_id: DirectionId,
    pub outcome: Outcome,
}

/// Output format for the answer command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOutput {
    /// Whether the answer was recorded.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<i64>,
    /// Whether the answer was marked correct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    /// Accepted answers, shown after a typed response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiktionary_link: Option<String>,
    /// Error message if recording failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl AnswerOutput {
    /// Create a successful output.
    pub fn success(answer_id: i64, correct: bool) -> Self {
        Self {
            success: true,
            answer_id: Some(answer_id),
            correct: Some(correct),
            expected: None,
            wiktionary_link: None,
            error: None,
            retryable: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &VocabError) -> Self {
        Self {
            success: false,
            answer_id: None,
            correct: None,
            expected: None,
            wiktionary_link: None,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Answer failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        match (self.correct, &self.expected) {
            (Some(true), _) => lines.push("Correct".to_string()),
            (_, Some(expected)) => lines.push(format!("Incorrect. Correct answer: {}", expected)),
            _ => lines.push("Incorrect".to_string()),
        }
        if let Some(link) = &self.wiktionary_link {
            lines.push(format!("  {}", link));
        }

        lines.join("\n")
    }
}

/// The answer command implementation.
pub struct AnswerCommand<S: VocabularyStore> {
    scheduler: Scheduler<S>,
}

impl<S: VocabularyStore> AnswerCommand<S> {
    /// Create a new answer command.
    pub fn new(scheduler: Scheduler<S>) -> Self {
        Self { scheduler }
    }

    /// Run the answer command.
    pub fn run(&self, options: &AnswerOptions, now: DateTime<Utc>) -> AnswerOutput {
        match self.record(options, now) {
            Ok(output) => output,
            Err(e) => AnswerOutput::failure(&e),
        }
    }

    fn record(&self, options: &AnswerOptions, now: DateTime<Utc>) -> Result<AnswerOutput> {
        let (correct, expected, link) = match &options.outcome {
            Outcome::Correct => (true, None, None),
            Outcome::Incorrect => (false, None, None),
            Outcome::Response(response) => {
                let details = self.scheduler.store().word_details(options.word_id)?;
                let (_, target) = texts(&details, options.direction_id)?;
                (
                    is_correct_response(response, target),
                    Some(answer_text(target)),
                    details.wiktionary_link.clone(),
                )
            }
        };

        let answer_id =
            self.scheduler
                .record_outcome(options.word_id, options.direction_id, correct, now)?;

        let mut output = AnswerOutput::success(answer_id.0, correct);
        output.expected = expected;
        output.wiktionary_link = link;
        Ok(output)
    }
}
