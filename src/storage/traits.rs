//! Vocabulary storage traits for glosor.
//!
//! This module defines the `VocabularyStore` trait: the read/write surface
//! the scheduler and the CLI use. Stores hold no selection policy.

use std::sync::Arc;

use crate::core::{
    AddGroupReport, Answer, AnswerId, Candidate, Category, CategoryKind, DirectionId,
    NewWordGroup, WordDetails, WordId,
};
use crate::error::Result;

/// Trait for vocabulary storage backends.
///
/// Every call observes one consistent snapshot. Writes are atomic: an
/// answer or word group is either fully committed or not at all.
pub trait VocabularyStore: Send + Sync {
    /// Every word crossed with every translation direction.
    ///
    /// Order is unspecified.
    fn list_candidates(&self) -> Result<Vec<Candidate>>;

    /// All answers for one pair, oldest first (ties broken by answer id).
    fn answer_history(&self, word_id: WordId, direction_id: DirectionId) -> Result<Vec<Answer>>;

    /// Append one answer and return its id.
    ///
    /// Fails with a validation error, writing nothing, when the word or
    /// direction does not exist, `mark` is not 0 or 1, or `timestamp` is
    /// not a positive Unix time.
    fn record_answer(
        &self,
        word_id: WordId,
        direction_id: DirectionId,
        mark: i64,
        timestamp: f64,
    ) -> Result<AnswerId>;

    /// A word with its category labels, hint and link.
    fn word_details(&self, word_id: WordId) -> Result<WordDetails>;

    /// All rows of one category table, ordered by id.
    fn categories(&self, kind: CategoryKind) -> Result<Vec<Category>>;

    /// Add a new category row. Existing rows are never changed.
    fn add_category(&self, kind: CategoryKind, category: &Category) -> Result<()>;

    /// Add every new form of one lexical item under a freshly allocated group.
    ///
    /// Forms whose (English, Swedish, grammar category) already exist are
    /// skipped, and the hint and link are only stored when none was skipped.
    fn add_word_group(&self, group: &NewWordGroup) -> Result<AddGroupReport>;

    /// Answers with a timestamp at or after `since`, oldest first.
    fn answers_since(&self, since: f64) -> Result<Vec<Answer>>;
}

/// Blanket implementation of VocabularyStore for Arc-wrapped stores.
impl<T: VocabularyStore + ?Sized> VocabularyStore for Arc<T> {
    fn list_candidates(&self) -> Result<Vec<Candidate>> {
        (**self).list_candidates()
    }

    fn answer_history(&self, word_id: WordId, direction_id: DirectionId) -> Result<Vec<Answer>> {
        (**self).answer_history(word_id, direction_id)
    }

    fn record_answer(
        &self,
        word_id: WordId,
        direction_id: DirectionId,
        mark: i64,
        timestamp: f64,
    ) -> Result<AnswerId> {
        (**self).record_answer(word_id, direction_id, mark, timestamp)
    }

    fn word_details(&self, word_id: WordId) -> Result<WordDetails> {
        (**self).word_details(word_id)
    }

    fn categories(&self, kind: CategoryKind) -> Result<Vec<Category>> {
        (**self).categories(kind)
    }

    fn add_category(&self, kind: CategoryKind, category: &Category) -> Result<()> {
        (**self).add_category(kind, category)
    }

    fn add_word_group(&self, group: &NewWordGroup) -> Result<AddGroupReport> {
        (**self).add_word_group(group)
    }

    fn answers_since(&self, since: f64) -> Result<Vec<Answer>> {
        (**self).answers_since(since)
    }
}
