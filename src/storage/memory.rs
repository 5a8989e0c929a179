//! In-memory vocabulary storage.
//!
//! This module provides a thread-safe in-memory implementation of the
//! VocabularyStore trait, used in unit tests and dry runs. Tables are flat
//! maps keyed by id; the answer log is an append-only vector.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::{
    check_not_older, validate_timestamp, AddGroupReport, Answer, AnswerId, Candidate, Category, CategoryKind,
    DirectionId, Mark, NewWordGroup, Word, WordDetails, WordGroupId, WordId,
};
use crate::error::{Result, VocabError};
use crate::storage::authoring::{check_group, is_duplicate};
use crate::storage::VocabularyStore;

#[derive(Debug, Default)]
struct Tables {
    words: BTreeMap<WordId, Word>,
    answers: Vec<Answer>,
    hints: HashMap<WordGroupId, String>,
    links: HashMap<WordGroupId, String>,
    categories: BTreeMap<CategoryKind, BTreeMap<i64, String>>,
}

impl Tables {
    fn seeded() -> Self {
        let mut tables = Self::default();
        for kind in CategoryKind::ALL {
            let rows = kind
                .seed()
                .iter()
                .map(|(id, label)| (*id, label.to_string()))
                .collect();
            tables.categories.insert(kind, rows);
        }
        tables
    }

    fn has_category(&self, kind: CategoryKind, id: i64) -> bool {
        self.categories
            .get(&kind)
            .is_some_and(|rows| rows.contains_key(&id))
    }

    fn label(&self, kind: CategoryKind, id: i64) -> Result<String> {
        self.categories
            .get(&kind)
            .and_then(|rows| rows.get(&id))
            .cloned()
            .ok_or_else(|| VocabError::not_found(kind.entity(), id))
    }

    fn next_word_group(&self) -> WordGroupId {
        let max = self.words.values().map(|w| w.word_group.0).max().unwrap_or(0);
        WordGroupId(max + 1)
    }
}

/// In-memory vocabulary store.
///
/// Thread-safe implementation using `RwLock`. Contents are lost when the
/// store is dropped. Starts with the seeded category tables.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new store with seeded category tables and no words.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::seeded()),
        }
    }

    /// Number of answers in the log.
    pub fn answer_count(&self) -> usize {
        self.read().map(|t| t.answers.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| VocabError::store_unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| VocabError::store_unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabularyStore for MemoryStore {
    fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let tables = self.read()?;
        let directions = tables
            .categories
            .get(&CategoryKind::TranslationDirection)
            .map(|rows| rows.keys().copied().collect::<Vec<_>>())
            .unwrap_or_default();

        let mut candidates = Vec::with_capacity(tables.words.len() * directions.len());
        for word in tables.words.values() {
            for direction in &directions {
                candidates.push(Candidate {
                    word_id: word.id,
                    word_group: word.word_group,
                    direction_id: DirectionId(*direction),
                    part_of_speech_id: word.part_of_speech_id,
                    word_category_id: word.word_category_id,
                });
            }
        }
        Ok(candidates)
    }

    fn answer_history(&self, word_id: WordId, direction_id: DirectionId) -> Result<Vec<Answer>> {
        let tables = self.read()?;
        let mut history: Vec<Answer> = tables
            .answers
            .iter()
            .filter(|a| a.word_id == word_id && a.direction_id == direction_id)
            .copied()
            .collect();
        history.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(history)
    }

    fn record_answer(
        &self,
        word_id: WordId,
        direction_id: DirectionId,
        mark: i64,
        timestamp: f64,
    ) -> Result<AnswerId> {
        let mark = Mark::try_from(mark)?;
        validate_timestamp(timestamp)?;

        let mut tables = self.write()?;
        if !tables.words.contains_key(&word_id) {
            return Err(VocabError::validation(format!("unknown word {}", word_id)));
        }
        if !tables.has_category(CategoryKind::TranslationDirection, direction_id.0) {
            return Err(VocabError::validation(format!(
                "unknown translation direction {}",
                direction_id
            )));
        }

        let newest = tables
            .answers
            .iter()
            .filter(|a| a.word_id == word_id && a.direction_id == direction_id)
            .map(|a| a.timestamp)
            .max_by(f64::total_cmp);
        check_not_older(timestamp, newest)?;

        let id = AnswerId(tables.answers.last().map(|a| a.id.0).unwrap_or(0) + 1);
        tables.answers.push(Answer {
            id,
            word_id,
            direction_id,
            mark,
            timestamp,
        });
        Ok(id)
    }

    fn word_details(&self, word_id: WordId) -> Result<WordDetails> {
        let tables = self.read()?;
        let word = tables
            .words
            .get(&word_id)
            .cloned()
            .ok_or_else(|| VocabError::not_found("word", word_id.0))?;

        Ok(WordDetails {
            word_category: tables.label(CategoryKind::WordCategory, word.word_category_id)?,
            part_of_speech: tables.label(CategoryKind::PartOfSpeech, word.part_of_speech_id)?,
            grammar_category: tables
                .label(CategoryKind::GrammarCategory, word.grammar_category_id)?,
            hint: tables.hints.get(&word.word_group).cloned(),
            wiktionary_link: tables.links.get(&word.word_group).cloned(),
            word,
        })
    }

    fn categories(&self, kind: CategoryKind) -> Result<Vec<Category>> {
        let tables = self.read()?;
        Ok(tables
            .categories
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .map(|(id, label)| Category::new(*id, label.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn add_category(&self, kind: CategoryKind, category: &Category) -> Result<()> {
        if category.label.trim().is_empty() {
            return Err(VocabError::validation("category label must not be empty"));
        }
        let mut tables = self.write()?;
        let rows = tables.categories.entry(kind).or_default();
        if rows.contains_key(&category.id) {
            return Err(VocabError::validation(format!(
                "{} {} already exists",
                kind.entity(),
                category.id
            )));
        }
        rows.insert(category.id, category.label.clone());
        Ok(())
    }

    fn add_word_group(&self, group: &NewWordGroup) -> Result<AddGroupReport> {
        check_group(group)?;

        let mut tables = self.write()?;
        if !tables.has_category(CategoryKind::PartOfSpeech, group.part_of_speech_id) {
            return Err(VocabError::validation(format!(
                "unknown part of speech {}",
                group.part_of_speech_id
            )));
        }
        if !tables.has_category(CategoryKind::WordCategory, group.word_category_id) {
            return Err(VocabError::validation(format!(
                "unknown word category {}",
                group.word_category_id
            )));
        }
        if let Some(form) = group
            .forms
            .iter()
            .find(|f| !tables.has_category(CategoryKind::GrammarCategory, f.grammar_category_id))
        {
            return Err(VocabError::validation(format!(
                "unknown grammar category {}",
                form.grammar_category_id
            )));
        }

        let word_group = tables.next_word_group();
        let mut report = AddGroupReport::default();

        for form in &group.forms {
            if tables.words.values().any(|w| is_duplicate(w, form)) {
                report.duplicates.push(form.clone());
                continue;
            }
            let id = WordId(tables.words.keys().next_back().map(|id| id.0).unwrap_or(0) + 1);
            tables.words.insert(
                id,
                Word {
                    id,
                    english: form.english.clone(),
                    swedish: form.swedish.clone(),
                    word_category_id: group.word_category_id,
                    part_of_speech_id: group.part_of_speech_id,
                    word_group,
                    grammar_category_id: form.grammar_category_id,
                },
            );
            report.added.push(id);
        }

        if !report.added.is_empty() {
            report.word_group = Some(word_group);
        }

        if report.duplicates.is_empty() {
            if let Some(hint) = &group.hint {
                tables.hints.insert(word_group, hint.clone());
                report.hint_added = true;
            }
            if let Some(link) = &group.wiktionary_link {
                tables.links.insert(word_group, link.clone());
                report.link_added = true;
            }
        }

        Ok(report)
    }

    fn answers_since(&self, since: f64) -> Result<Vec<Answer>> {
        let tables = self.read()?;
        let mut answers: Vec<Answer> = tables
            .answers
            .iter()
            .filter(|a| a.timestamp >= since)
            .copied()
            .collect();
        answers.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(answers)
    }
}
