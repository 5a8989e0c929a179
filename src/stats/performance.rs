//! Accuracy and target statistics over the whole answer log.
//!
//! Marks are averaged per part of speech, word category and grammar
//! category. Days and ISO weeks are taken in the time zone passed in, from
//! the first answered day to the last.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProgressConfig;
use crate::core::{Answer, CategoryKind, DirectionId, WordDetails, WordId};
use crate::error::{Result, VocabError};
use crate::storage::VocabularyStore;

/// Mean mark of the answers sharing one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub label: String,
    pub answers: usize,
    /// Mean mark, from 0.0 to 1.0.
    pub mean: f64,
}

/// Answers given in one translation direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionShare {
    pub direction_id: DirectionId,
    pub label: String,
    pub answers: usize,
    /// Fraction of all answers.
    pub share: f64,
}

/// Days or weeks that reached their target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub periods: usize,
    pub met: usize,
}

impl TargetRecord {
    /// Fraction of periods that met the target. `None` before any answer.
    pub fn rate(&self) -> Option<f64> {
        (self.periods > 0).then(|| self.met as f64 / self.periods as f64)
    }
}

/// Performance over every logged answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub answers: usize,
    pub correct: usize,
    /// Lowest mean first.
    pub by_part_of_speech: Vec<CategoryScore>,
    pub by_word_category: Vec<CategoryScore>,
    pub by_grammar_category: Vec<CategoryScore>,
    pub by_direction: Vec<DirectionShare>,
    pub days: TargetRecord,
    pub weeks: TargetRecord,
}

impl PerformanceReport {
    /// Fraction of correct answers. `None` for an empty log.
    pub fn accuracy(&self) -> Option<f64> {
        (self.answers > 0).then(|| self.correct as f64 / self.answers as f64)
    }
}

#[derive(Debug, Default)]
struct Tally {
    answers: usize,
    correct: usize,
}

impl Tally {
    fn add(&mut self, correct: bool) {
        self.answers += 1;
        self.correct += usize::from(correct);
    }
}

fn scores(tallies: HashMap<String, Tally>) -> Vec<CategoryScore> {
    let mut scores: Vec<CategoryScore> = tallies
        .into_iter()
        .map(|(label, tally)| CategoryScore {
            label,
            answers: tally.answers,
            mean: tally.correct as f64 / tally.answers as f64,
        })
        .collect();
    scores.sort_by(|a, b| a.mean.total_cmp(&b.mean).then_with(|| a.label.cmp(&b.label)));
    scores
}

/// Calendar date of a Unix timestamp in `tz`.
fn local_date<Tz: TimeZone>(tz: &Tz, timestamp: f64) -> Result<NaiveDate> {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1_000_000_000.0) as u32;
    Utc.timestamp_opt(secs as i64, nanos)
        .single()
        .map(|at| at.with_timezone(tz).date_naive())
        .ok_or_else(|| VocabError::validation(format!("timestamp {} is out of range", timestamp)))
}

/// Day and ISO week records over the answered date range. Days without
/// answers inside the range count as missed.
fn target_records(
    per_day: &BTreeMap<NaiveDate, usize>,
    config: &ProgressConfig,
) -> (TargetRecord, TargetRecord) {
    let (Some(&first), Some(&last)) = (per_day.keys().next(), per_day.keys().next_back()) else {
        return (TargetRecord::default(), TargetRecord::default());
    };

    let mut days = TargetRecord::default();
    let mut per_week: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for date in first.iter_days().take_while(|date| *date <= last) {
        let count = per_day.get(&date).copied().unwrap_or(0);
        days.periods += 1;
        days.met += usize::from(count >= config.daily_target as usize);

        let week = date.iso_week();
        *per_week.entry((week.year(), week.week())).or_default() += count;
    }

    let weeks = TargetRecord {
        periods: per_week.len(),
        met: per_week
            .values()
            .filter(|count| **count >= config.weekly_target as usize)
            .count(),
    };
    (days, weeks)
}

/// Summarize every answer in the log.
pub fn performance<S, Tz>(store: &S, tz: &Tz, config: &ProgressConfig) -> Result<PerformanceReport>
where
    S: VocabularyStore + ?Sized,
    Tz: TimeZone,
{
    let answers: Vec<Answer> = store.answers_since(0.0)?;

    let mut details: HashMap<WordId, WordDetails> = HashMap::new();
    let mut by_part_of_speech: HashMap<String, Tally> = HashMap::new();
    let mut by_word_category: HashMap<String, Tally> = HashMap::new();
    let mut by_grammar_category: HashMap<String, Tally> = HashMap::new();
    let mut by_direction: BTreeMap<DirectionId, usize> = BTreeMap::new();
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut correct = 0;

    for answer in &answers {
        let word = match details.entry(answer.word_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(store.word_details(answer.word_id)?),
        };
        let right = answer.mark.is_correct();
        correct += usize::from(right);

        by_part_of_speech
            .entry(word.part_of_speech.clone())
            .or_default()
            .add(right);
        by_word_category
            .entry(word.word_category.clone())
            .or_default()
            .add(right);
        by_grammar_category
            .entry(word.grammar_category.clone())
            .or_default()
            .add(right);
        *by_direction.entry(answer.direction_id).or_default() += 1;
        *per_day.entry(local_date(tz, answer.timestamp)?).or_default() += 1;
    }

    let direction_labels: HashMap<i64, String> = store
        .categories(CategoryKind::TranslationDirection)?
        .into_iter()
        .map(|category| (category.id, category.label))
        .collect();

    let total = answers.len();
    let (days, weeks) = target_records(&per_day, config);
    let report = PerformanceReport {
        answers: total,
        correct,
        by_part_of_speech: scores(by_part_of_speech),
        by_word_category: scores(by_word_category),
        by_grammar_category: scores(by_grammar_category),
        by_direction: by_direction
            .into_iter()
            .map(|(direction_id, count)| DirectionShare {
                direction_id,
                label: direction_labels
                    .get(&direction_id.0)
                    .cloned()
                    .unwrap_or_else(|| direction_id.to_string()),
                answers: count,
                share: count as f64 / total as f64,
            })
            .collect(),
        days,
        weeks,
    };

    tracing::debug!(
        answers = report.answers,
        days = report.days.periods,
        "computed performance"
    );

    Ok(report)
}
