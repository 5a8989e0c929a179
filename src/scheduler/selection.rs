//! Choosing the next question from scored candidates.
//!
//! Selection rules, in order:
//! 1. Only the highest non-empty tier is considered (unseen pairs first).
//! 2. Within that tier, prefer a pair outside the word group of the previous
//!    pick. The previous pick is the pair owning the newest answer. If the
//!    tier holds nothing else, the group rule is waived.
//! 3. Highest priority wins; ties are broken by the caller's rng.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::core::{Answer, Candidate, DirectionId, WordGroupId, WordId};
use crate::error::{Result, VocabError};
use crate::scheduler::priority::{priority, Priority};

/// A candidate with its computed priority.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub priority: Priority,
    /// Number of recorded attempts.
    pub attempts: usize,
    /// Newest answer for the pair.
    pub last_answer: Option<Answer>,
}

impl ScoredCandidate {
    /// Score one candidate from its history (oldest first).
    pub fn new(candidate: Candidate, history: &[Answer], now: f64, config: &SchedulerConfig) -> Self {
        Self {
            candidate,
            priority: priority(history, now, config),
            attempts: history.len(),
            last_answer: history.iter().copied().max_by(newest_first),
        }
    }
}

/// Order answers so that the newest compares greatest.
fn newest_first(a: &Answer, b: &Answer) -> Ordering {
    a.timestamp.total_cmp(&b.timestamp).then(a.id.cmp(&b.id))
}

/// Score every candidate, looking up each history through `history`.
pub fn score_candidates<F>(
    candidates: &[Candidate],
    mut history: F,
    now: f64,
    config: &SchedulerConfig,
) -> Result<Vec<ScoredCandidate>>
where
    F: FnMut(WordId, DirectionId) -> Result<Vec<Answer>>,
{
    candidates
        .iter()
        .map(|c| {
            let answers = history(c.word_id, c.direction_id)?;
            Ok(ScoredCandidate::new(*c, &answers, now, config))
        })
        .collect()
}

/// Word group of the pair answered most recently, if any.
pub fn previous_group(scored: &[ScoredCandidate]) -> Option<WordGroupId> {
    scored
        .iter()
        .filter_map(|s| s.last_answer.map(|a| (a, s.candidate.word_group)))
        .max_by(|(a, _), (b, _)| newest_first(a, b))
        .map(|(_, group)| group)
}

/// Pick one scored candidate. Returns `None` only for an empty input.
pub fn choose<R: Rng + ?Sized>(
    mut scored: Vec<ScoredCandidate>,
    rng: &mut R,
) -> Option<ScoredCandidate> {
    let previous = previous_group(&scored);

    // Shuffle first so the stable sort leaves equal priorities in random order.
    scored.shuffle(rng);
    scored.sort_by(|a, b| b.priority.cmp(&a.priority));

    let top_unseen = scored.first()?.priority.is_unseen();
    let pick = scored
        .iter()
        .take_while(|s| s.priority.is_unseen() == top_unseen)
        .position(|s| Some(s.candidate.word_group) != previous)
        .unwrap_or(0);

    if let Some(group) = previous {
        tracing::debug!(previous_group = group.0, pick, "applied word-group diversity");
    }

    Some(scored.swap_remove(pick))
}

/// Select the next pair to ask.
///
/// Fails with `NoCandidates` for an empty candidate set, and with whatever
/// error the history lookup returns.
pub fn select_next<F, R>(
    candidates: &[Candidate],
    history: F,
    now: f64,
    config: &SchedulerConfig,
    rng: &mut R,
) -> Result<ScoredCandidate>
where
    F: FnMut(WordId, DirectionId) -> Result<Vec<Answer>>,
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Err(VocabError::NoCandidates);
    }

    let scored = score_candidates(candidates, history, now, config)?;
    let selected = choose(scored, rng).ok_or(VocabError::NoCandidates)?;

    tracing::debug!(
        word_id = selected.candidate.word_id.0,
        direction_id = selected.candidate.direction_id.0,
        priority = ?selected.priority,
        "selected next question"
    );

    Ok(selected)
}

/// Rank candidates by priority, highest first.
///
/// Deterministic: equal priorities are ordered by word id, then direction.
pub fn rank<F>(
    candidates: &[Candidate],
    history: F,
    now: f64,
    config: &SchedulerConfig,
    limit: usize,
) -> Result<Vec<ScoredCandidate>>
where
    F: FnMut(WordId, DirectionId) -> Result<Vec<Answer>>,
{
    let mut scored = score_candidates(candidates, history, now, config)?;

    scored.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.candidate.word_id.cmp(&b.candidate.word_id))
            .then(a.candidate.direction_id.cmp(&b.candidate.direction_id))
    });
    scored.truncate(limit);

    Ok(scored)
}
