//! Next command for glosor.
//!
//! Selects the next question and prints it. Nothing is written: the answer
//! is recorded separately with `glosor answer`.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cli::question::{answer_text, prompt_text, target_language, texts};
use crate::error::{Result, VocabError};
use crate::scheduler::{Question, Scheduler};
use crate::storage::VocabularyStore;

/// Options for the next command.
#[derive(Debug, Clone, Default)]
pub struct NextOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// A rendered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub word_id: i64,
    pub direction_id: i64,
    /// Text to translate.
    pub prompt: String,
    /// Language to answer in.
    pub answer_language: String,
    /// Grammar category, shown for adjectives only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Accepted answers, `/`-separated.
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiktionary_link: Option<String>,
    /// Whether the pair has never been answered.
    pub unseen: bool,
    pub attempts: usize,
}

impl QuestionInfo {
    /// Render a selected question.
    pub fn from_question(question: &Question) -> Result<Self> {
        let direction = question.candidate.direction_id;
        let (source, target) = texts(&question.details, direction)?;
        Ok(Self {
            word_id: question.candidate.word_id.0,
            direction_id: direction.0,
            prompt: prompt_text(source).to_string(),
            answer_language: target_language(direction)?.to_string(),
            grammar_hint: question.details.grammar_hint().map(str::to_string),
            hint: question.details.hint.clone(),
            answer: answer_text(target),
            wiktionary_link: question.details.wiktionary_link.clone(),
            unseen: question.priority.is_unseen(),
            attempts: question.attempts,
        })
    }
}

/// Output format for the next command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextOutput {
    /// Whether a question was selected.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionInfo>,
    /// Error message if selection failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl NextOutput {
    /// Create a successful output.
    pub fn success(question: QuestionInfo) -> Self {
        Self {
            success: true,
            question: Some(question),
            error: None,
            retryable: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &VocabError) -> Self {
        Self {
            success: false,
            question: None,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        let Some(question) = &self.question else {
            return format!(
                "Next failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        };

        let mut lines = vec![format!(
            "Translate to {}: {}",
            question.answer_language, question.prompt
        )];
        if let Some(grammar) = &question.grammar_hint {
            lines.push(format!("  Grammar: {}", grammar));
        }
        if let Some(hint) = &question.hint {
            lines.push(format!("  Hint: {}", hint));
        }
        lines.push(format!(
            "  (word {}, direction {}{})",
            question.word_id,
            question.direction_id,
            if question.unseen { ", new" } else { "" }
        ));

        lines.join("\n")
    }
}

/// The next command implementation.
pub struct NextCommand<S: VocabularyStore> {
    scheduler: Scheduler<S>,
}

impl<S: VocabularyStore> NextCommand<S> {
    /// Create a new next command.
    pub fn new(scheduler: Scheduler<S>) -> Self {
        Self { scheduler }
    }

    /// Run the next command.
    pub fn run<R: Rng + ?Sized>(
        &self,
        _options: &NextOptions,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> NextOutput {
        match self
            .scheduler
            .next_question(now, rng)
            .and_then(|question| QuestionInfo::from_question(&question))
        {
            Ok(question) => NextOutput::success(question),
            Err(e) => NextOutput::failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::core::{
        Category, CategoryKind, DirectionId, NewWordForm, NewWordGroup, ADJECTIVE,
        SWEDISH_TO_ENGLISH,
    };
    use crate::storage::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn command(store: MemoryStore, config: SchedulerConfig) -> NextCommand<MemoryStore> {
        NextCommand::new(Scheduler::new(store, config).unwrap())
    }

    #[test]
    fn test_next_on_empty_store_fails() {
        let cmd = command(MemoryStore::new(), SchedulerConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let output = cmd.run(&NextOptions::default(), Utc::now(), &mut rng);

        assert!(!output.success);
        assert!(!output.retryable);
        assert!(output.format_text().contains("no eligible words"));
    }

    #[test]
    fn test_next_renders_adjective_with_grammar_hint() {
        let store = MemoryStore::new();
        store
            .add_word_group(
                &NewWordGroup::new(
                    ADJECTIVE,
                    1,
                    vec![NewWordForm::new("big/large", "stort", 6)],
                )
                .with_hint("size"),
            )
            .unwrap();
        let config = SchedulerConfig {
            directions: vec![SWEDISH_TO_ENGLISH],
            ..SchedulerConfig::default()
        };
        let cmd = command(store, config);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let output = cmd.run(&NextOptions::default(), Utc::now(), &mut rng);

        let question = output.question.clone().unwrap();
        assert_eq!(question.prompt, "stort");
        assert_eq!(question.answer, "big / large");
        assert_eq!(question.answer_language, "English");
        assert_eq!(question.grammar_hint.as_deref(), Some("Adjective neutrum"));
        assert!(question.unseen);

        let text = output.format_text();
        assert!(text.contains("Translate to English: stort"));
        assert!(text.contains("Grammar: Adjective neutrum"));
        assert!(text.contains("Hint: size"));
    }

    #[test]
    fn test_next_prompt_uses_first_alternative() {
        let store = MemoryStore::new();
        store
            .add_word_group(&NewWordGroup::new(
                2,
                1,
                vec![NewWordForm::new("to run/to race", "att springa", 9)],
            ))
            .unwrap();
        let config = SchedulerConfig {
            directions: vec![crate::core::ENGLISH_TO_SWEDISH],
            ..SchedulerConfig::default()
        };
        let cmd = command(store, config);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let question = cmd
            .run(&NextOptions::default(), Utc::now(), &mut rng)
            .question
            .unwrap();

        assert_eq!(question.prompt, "to run");
        assert!(question.grammar_hint.is_none());
    }

    #[test]
    fn test_next_fails_for_direction_without_languages() {
        let store = MemoryStore::new();
        store
            .add_word_group(&NewWordGroup::new(
                1,
                1,
                vec![NewWordForm::new("a house", "ett hus", 1)],
            ))
            .unwrap();
        store
            .add_category(
                CategoryKind::TranslationDirection,
                &Category::new(3, "Swedish to Swedish"),
            )
            .unwrap();
        let config = SchedulerConfig {
            directions: vec![DirectionId(3)],
            ..SchedulerConfig::default()
        };
        let cmd = command(store, config);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let output = cmd.run(&NextOptions::default(), Utc::now(), &mut rng);

        assert!(!output.success);
        assert!(output.question.is_none());
        assert!(output
            .error
            .as_deref()
            .unwrap()
            .contains("unknown translation direction 3"));
    }

    #[test]
    fn test_next_output_json() {
        let output = NextOutput::failure(&VocabError::store_unavailable("locked"));
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"retryable\":true"));
        assert!(!json.contains("question"));
    }
}
