//! Rank command for glosor.
//!
//! Lists the pairs the scheduler currently considers most in need of
//! practice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::question::{prompt_text, texts};
use crate::error::{Result, VocabError};
use crate::scheduler::{Priority, Scheduler};
use crate::storage::VocabularyStore;

/// Options for the rank command.
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of pairs.
    pub limit: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            json: false,
            quiet: false,
            limit: 10,
        }
    }
}

/// One ranked pair for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPair {
    pub word_id: i64,
    pub direction_id: i64,
    /// Text the question would show.
    pub prompt: String,
    pub priority: Priority,
    pub attempts: usize,
}

/// Output format for the rank command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankOutput {
    /// Whether ranking succeeded.
    pub success: bool,
    pub pairs: Vec<RankedPair>,
    /// Error message if ranking failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl RankOutput {
    /// Create a successful output.
    pub fn success(pairs: Vec<RankedPair>) -> Self {
        Self {
            success: true,
            pairs,
            error: None,
            retryable: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &VocabError) -> Self {
        Self {
            success: false,
            pairs: Vec::new(),
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Rank failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        if self.pairs.is_empty() {
            return "No words found.".to_string();
        }

        let mut lines = vec![format!(
            "{:>6}  {:>3}  {:>8}  {:>8}  {}",
            "WORD", "DIR", "PRIORITY", "ATTEMPTS", "PROMPT"
        )];
        lines.push("-".repeat(60));

        for pair in &self.pairs {
            let priority = match pair.priority {
                Priority::Unseen => "new".to_string(),
                Priority::Seen(score) => format!("{:.3}", score),
            };
            lines.push(format!(
                "{:>6}  {:>3}  {:>8}  {:>8}  {}",
                pair.word_id, pair.direction_id, priority, pair.attempts, pair.prompt
            ));
        }

        lines.join("\n")
    }
}

/// The rank command implementation.
pub struct RankCommand<S: VocabularyStore> {
    scheduler: Scheduler<S>,
}

impl<S: VocabularyStore> RankCommand<S> {
    /// Create a new rank command.
    pub fn new(scheduler: Scheduler<S>) -> Self {
        Self { scheduler }
    }

    /// Run the rank command.
    pub fn run(&self, options: &RankOptions, now: DateTime<Utc>) -> RankOutput {
        match self.rank(options.limit, now) {
            Ok(pairs) => RankOutput::success(pairs),
            Err(e) => RankOutput::failure(&e),
        }
    }

    fn rank(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<RankedPair>> {
        self.scheduler
            .rank(now, limit)?
            .into_iter()
            .map(|scored| {
                let details = self.scheduler.store().word_details(scored.candidate.word_id)?;
                let (source, _) = texts(&details, scored.candidate.direction_id)?;
                Ok(RankedPair {
                    word_id: scored.candidate.word_id.0,
                    direction_id: scored.candidate.direction_id.0,
                    prompt: prompt_text(source).to_string(),
                    priority: scored.priority,
                    attempts: scored.attempts,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::core::{unix_timestamp, ENGLISH_TO_SWEDISH};
    use crate::storage::traits::tests::seed_words;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    #[test]
    fn test_rank_puts_missed_pair_after_unseen() {
        let store = MemoryStore::new();
        let ids = seed_words(&store);
        let now = Utc::now();
        store
            .record_answer(
                ids[2],
                ENGLISH_TO_SWEDISH,
                0,
                unix_timestamp(&(now - Duration::hours(1))),
            )
            .unwrap();
        let cmd = RankCommand::new(Scheduler::new(store, SchedulerConfig::default()).unwrap());

        let output = cmd.run(&RankOptions::default(), now);

        assert!(output.success);
        assert_eq!(output.pairs.len(), 6);
        assert!(output.pairs[..5].iter().all(|p| p.priority.is_unseen()));
        assert_eq!(output.pairs[5].word_id, ids[2].0);
        assert_eq!(output.pairs[5].prompt, "to run");
        assert_eq!(output.pairs[5].attempts, 1);
    }

    #[test]
    fn test_rank_respects_limit() {
        let store = MemoryStore::new();
        seed_words(&store);
        let cmd = RankCommand::new(Scheduler::new(store, SchedulerConfig::default()).unwrap());

        let output = cmd.run(
            &RankOptions {
                limit: 2,
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(output.pairs.len(), 2);
        let text = output.format_text();
        assert!(text.contains("PRIORITY"));
        assert!(text.contains("new"));
    }

    #[test]
    fn test_rank_empty_store() {
        let cmd = RankCommand::new(
            Scheduler::new(MemoryStore::new(), SchedulerConfig::default()).unwrap(),
        );
        let output = cmd.run(&RankOptions::default(), Utc::now());
        assert!(output.success);
        assert_eq!(output.format_text(), "No words found.");
    }
}
