//! Adaptive question selection.
//!
//! The scheduler keeps no state of its own between runs: every decision is
//! derived from the answer log in the store. Selection functions in
//! [`selection`] are pure over a candidate list and a history lookup;
//! [`Scheduler`] wires them to a [`VocabularyStore`].

pub mod priority;
pub mod selection;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::core::{unix_timestamp, AnswerId, Candidate, DirectionId, Mark, WordDetails, WordId};
use crate::error::Result;
use crate::storage::VocabularyStore;

pub use priority::{error_rate, staleness_boost, Priority};
pub use selection::{choose, previous_group, rank, score_candidates, select_next, ScoredCandidate};

/// A selected pair together with what is needed to ask it.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub candidate: Candidate,
    pub priority: Priority,
    pub attempts: usize,
    pub details: WordDetails,
}

/// Scheduler bound to one store and one immutable configuration.
pub struct Scheduler<S: VocabularyStore> {
    store: S,
    config: SchedulerConfig,
}

impl<S: VocabularyStore> Scheduler<S> {
    /// Create a scheduler. Fails if the configuration is out of range.
    pub fn new(store: S, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Candidates allowed by the configured directions and filters.
    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        let config = &self.config;
        let candidates: Vec<Candidate> = self
            .store
            .list_candidates()?
            .into_iter()
            .filter(|c| config.directions.contains(&c.direction_id))
            .filter(|c| {
                config.parts_of_speech.is_empty()
                    || config.parts_of_speech.contains(&c.part_of_speech_id)
            })
            .filter(|c| {
                config.word_categories.is_empty()
                    || config.word_categories.contains(&c.word_category_id)
            })
            .collect();

        tracing::debug!(count = candidates.len(), "listed candidates");
        Ok(candidates)
    }

    /// Select the next pair to ask at `now`.
    pub fn select_next<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ScoredCandidate> {
        let candidates = self.candidates()?;
        select_next(
            &candidates,
            |word, direction| self.store.answer_history(word, direction),
            unix_timestamp(&now),
            &self.config,
            rng,
        )
    }

    /// Select the next pair and load its word details.
    pub fn next_question<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Question> {
        let selected = self.select_next(now, rng)?;
        let details = self.store.word_details(selected.candidate.word_id)?;

        Ok(Question {
            candidate: selected.candidate,
            priority: selected.priority,
            attempts: selected.attempts,
            details,
        })
    }

    /// Record the outcome of an asked question at `now`.
    pub fn record_outcome(
        &self,
        word_id: WordId,
        direction_id: DirectionId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<AnswerId> {
        self.store.record_answer(
            word_id,
            direction_id,
            Mark::from(correct).value(),
            unix_timestamp(&now),
        )
    }

    /// The `limit` highest-priority pairs at `now`, deterministically ordered.
    pub fn rank(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ScoredCandidate>> {
        let candidates = self.candidates()?;
        rank(
            &candidates,
            |word, direction| self.store.answer_history(word, direction),
            unix_timestamp(&now),
            &self.config,
            limit,
        )
    }
}
