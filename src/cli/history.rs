//! History command for glosor.
//!
//! Shows every recorded attempt for one (word, direction) pair together
//! with its current priority.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::core::{unix_timestamp, Answer, DirectionId, WordId};
use crate::error::{Result, VocabError};
use crate::scheduler::priority::{error_rate, priority, Priority};
use crate::storage::VocabularyStore;

/// Options for the history command.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    pub word_id: WordId,
    pub direction_id: DirectionId,
}

/// One attempt for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptInfo {
    pub answer_id: i64,
    pub correct: bool,
    pub timestamp: f64,
    /// Timestamp in RFC 3339, UTC.
    pub answered_at: String,
}

impl From<&Answer> for AttemptInfo {
    fn from(answer: &Answer) -> Self {
        let secs = answer.timestamp.floor();
        let nanos = ((answer.timestamp - secs) * 1e9) as u32;
        let answered_at = Utc
            .timestamp_opt(secs as i64, nanos)
            .single()
            .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_default();
        Self {
            answer_id: answer.id.0,
            correct: answer.mark.is_correct(),
            timestamp: answer.timestamp,
            answered_at,
        }
    }
}

/// Output format for the history command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryOutput {
    /// Whether the history was read.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swedish: Option<String>,
    /// Attempts, oldest first.
    pub attempts: Vec<AttemptInfo>,
    /// Recency-weighted error rate, if answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Error message if reading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl HistoryOutput {
    /// Create a failed output.
    pub fn failure(error: &VocabError) -> Self {
        Self {
            success: false,
            english: None,
            swedish: None,
            attempts: Vec::new(),
            error_rate: None,
            priority: None,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "History failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!(
            "{} - {}",
            self.english.as_deref().unwrap_or("?"),
            self.swedish.as_deref().unwrap_or("?")
        )];

        if self.attempts.is_empty() {
            lines.push("Never answered.".to_string());
            return lines.join("\n");
        }

        for attempt in &self.attempts {
            lines.push(format!(
                "  {}  {}",
                attempt.answered_at,
                if attempt.correct { "correct" } else { "incorrect" }
            ));
        }
        if let Some(rate) = self.error_rate {
            lines.push(format!("Error rate: {:.0}%", rate * 100.0));
        }
        if let Some(score) = self.priority.and_then(|p| p.score()) {
            lines.push(format!("Priority: {:.3}", score));
        }

        lines.join("\n")
    }
}

/// The history command implementation.
pub struct HistoryCommand<S: VocabularyStore> {
    store: S,
    config: SchedulerConfig,
}

impl<S: VocabularyStore> HistoryCommand<S> {
    /// Create a new history command.
    pub fn new(store: S, config: SchedulerConfig) -> Self {
        Self { store, config }
    }

    /// Run the history command.
    pub fn run(&self, options: &HistoryOptions, now: DateTime<Utc>) -> HistoryOutput {
        self.read(options, now)
            .unwrap_or_else(|e| HistoryOutput::failure(&e))
    }

    fn read(&self, options: &HistoryOptions, now: DateTime<Utc>) -> Result<HistoryOutput> {
        let details = self.store.word_details(options.word_id)?;
        let history = self
            .store
            .answer_history(options.word_id, options.direction_id)?;

        Ok(HistoryOutput {
            success: true,
            english: Some(details.word.english),
            swedish: Some(details.word.swedish),
            attempts: history.iter().map(AttemptInfo::from).collect(),
            error_rate: error_rate(&history, self.config.decay_rate),
            priority: Some(priority(&history, unix_timestamp(&now), &self.config)),
            error: None,
            retryable: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ENGLISH_TO_SWEDISH;
    use crate::storage::traits::tests::seed_words;
    use crate::storage::MemoryStore;

    fn options(word_id: WordId) -> HistoryOptions {
        HistoryOptions {
            json: false,
            quiet: false,
            word_id,
            direction_id: ENGLISH_TO_SWEDISH,
        }
    }

    #[test]
    fn test_history_of_unanswered_pair() {
        let store = MemoryStore::new();
        let ids = seed_words(&store);
        let cmd = HistoryCommand::new(store, SchedulerConfig::default());

        let output = cmd.run(&options(ids[0]), Utc::now());

        assert!(output.success);
        assert!(output.attempts.is_empty());
        assert!(output.error_rate.is_none());
        assert_eq!(output.priority, Some(Priority::Unseen));
        assert!(output.format_text().contains("Never answered"));
    }

    #[test]
    fn test_history_lists_attempts_in_order() {
        let store = MemoryStore::new();
        let ids = seed_words(&store);
        store
            .record_answer(ids[0], ENGLISH_TO_SWEDISH, 0, 1_709_546_400.0)
            .unwrap();
        store
            .record_answer(ids[0], ENGLISH_TO_SWEDISH, 1, 1_709_550_000.0)
            .unwrap();
        let cmd = HistoryCommand::new(store, SchedulerConfig::default());
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();

        let output = cmd.run(&options(ids[0]), now);

        assert_eq!(output.attempts.len(), 2);
        assert!(!output.attempts[0].correct);
        assert_eq!(output.attempts[0].answered_at, "2024-03-04T10:00:00Z");
        assert!(output.attempts[1].correct);
        let rate = output.error_rate.unwrap();
        assert!((rate - 0.7 / 1.7).abs() < 1e-9);

        let text = output.format_text();
        assert!(text.starts_with("a house - ett hus"));
        assert!(text.contains("Error rate: 41%"));
    }

    #[test]
    fn test_history_of_unknown_word_fails() {
        let cmd = HistoryCommand::new(MemoryStore::new(), SchedulerConfig::default());
        let output = cmd.run(&options(WordId(7)), Utc::now());
        assert!(!output.success);
        assert!(output.format_text().contains("word 7 not found"));
    }
}
