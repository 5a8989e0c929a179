//! Priority scoring for (word, direction) pairs.
//!
//! A pair with no history is in the unseen tier and outranks every seen
//! pair. A seen pair scores its recency-weighted error rate plus a
//! staleness boost:
//!
//! - attempt at age `k` (0 = newest) weighs `decay_rate^k`
//! - error rate = weighted mistakes / total weight, in [0, 1]
//! - boost = `boost_cap * (1 - 2^(-elapsed_hours / half_life_hours))`
//!
//! With `boost_cap < 1` a seen priority stays below 2 and never reaches the
//! unseen tier regardless of its value, since tiers compare first.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::core::Answer;

const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Selection priority of one pair. Higher is asked sooner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "tier", content = "score", rename_all = "snake_case")]
pub enum Priority {
    /// Answered at least once; carries error rate plus staleness boost.
    Seen(f64),
    /// Never answered.
    Unseen,
}

impl Priority {
    pub fn is_unseen(&self) -> bool {
        matches!(self, Self::Unseen)
    }

    /// Numeric score of a seen pair.
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Seen(score) => Some(*score),
            Self::Unseen => None,
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Unseen, Self::Unseen) => Ordering::Equal,
            (Self::Unseen, Self::Seen(_)) => Ordering::Greater,
            (Self::Seen(_), Self::Unseen) => Ordering::Less,
            (Self::Seen(a), Self::Seen(b)) => a.total_cmp(b),
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

/// Recency-weighted share of mistakes in `history` (oldest first).
///
/// Returns `None` for an empty history.
pub fn error_rate(history: &[Answer], decay_rate: f64) -> Option<f64> {
    if history.is_empty() {
        return None;
    }

    let mut weight = 1.0;
    let mut total = 0.0;
    let mut mistakes = 0.0;
    for answer in history.iter().rev() {
        total += weight;
        if !answer.mark.is_correct() {
            mistakes += weight;
        }
        weight *= decay_rate;
    }

    Some(mistakes / total)
}

/// Boost for a pair last answered `elapsed_seconds` ago.
///
/// Zero for a pair answered just now, approaching `boost_cap` as the pair
/// goes stale. Negative elapsed time (clock skew) counts as zero.
pub fn staleness_boost(elapsed_seconds: f64, config: &SchedulerConfig) -> f64 {
    let hours = elapsed_seconds.max(0.0) / SECONDS_PER_HOUR;
    config.boost_cap * (1.0 - (-hours / config.boost_half_life_hours).exp2())
}

/// Priority of a pair given its history (oldest first) at time `now`.
pub fn priority(history: &[Answer], now: f64, config: &SchedulerConfig) -> Priority {
    let Some(rate) = error_rate(history, config.decay_rate) else {
        return Priority::Unseen;
    };
    let last = history
        .iter()
        .map(|a| a.timestamp)
        .fold(f64::NEG_INFINITY, f64::max);

    Priority::Seen(rate + staleness_boost(now - last, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnswerId, Mark, WordId, ENGLISH_TO_SWEDISH};
    use proptest::prelude::*;

    const HOUR: f64 = SECONDS_PER_HOUR;
    const NOW: f64 = 1_700_000_000.0;

    fn history(marks: &[bool], last: f64) -> Vec<Answer> {
        let start = last - (marks.len().saturating_sub(1)) as f64 * 60.0;
        marks
            .iter()
            .enumerate()
            .map(|(i, correct)| Answer {
                id: AnswerId(i as i64 + 1),
                word_id: WordId(1),
                direction_id: ENGLISH_TO_SWEDISH,
                mark: Mark::from(*correct),
                timestamp: start + i as f64 * 60.0,
            })
            .collect()
    }

    #[test]
    fn test_empty_history_is_unseen() {
        let config = SchedulerConfig::default();
        assert_eq!(priority(&[], NOW, &config), Priority::Unseen);
        assert!(error_rate(&[], 0.7).is_none());
    }

    #[test]
    fn test_unseen_outranks_any_seen() {
        assert!(Priority::Unseen > Priority::Seen(1.99));
        assert!(Priority::Seen(0.2) > Priority::Seen(0.1));
        assert_eq!(Priority::Seen(0.5), Priority::Seen(0.5));
    }

    #[test]
    fn test_error_rate_extremes() {
        assert_eq!(error_rate(&history(&[false, false], NOW), 0.7), Some(1.0));
        assert_eq!(error_rate(&history(&[true, true, true], NOW), 0.7), Some(0.0));
    }

    #[test]
    fn test_error_rate_weights_recent_attempts_more() {
        // Newest mistake weighs 1, older correct weighs 0.5.
        let rate = error_rate(&history(&[true, false], NOW), 0.5).unwrap();
        assert!((rate - 1.0 / 1.5).abs() < 1e-12);

        let rate = error_rate(&history(&[false, true], NOW), 0.5).unwrap();
        assert!((rate - 0.5 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_staleness_boost_shape() {
        let config = SchedulerConfig::default();

        assert_eq!(staleness_boost(0.0, &config), 0.0);
        assert_eq!(staleness_boost(-HOUR, &config), 0.0);

        let half = staleness_boost(config.boost_half_life_hours * HOUR, &config);
        assert!((half - config.boost_cap / 2.0).abs() < 1e-12);

        let ancient = staleness_boost(1e9 * HOUR, &config);
        assert!(ancient <= config.boost_cap);
        assert!(ancient > config.boost_cap * 0.999);
    }

    #[test]
    fn test_recent_mistake_beats_old_mastery() {
        let config = SchedulerConfig::default();
        let missed = priority(&history(&[false], NOW - HOUR), NOW, &config);
        let mastered = priority(&history(&[true, true, true], NOW - HOUR), NOW, &config);
        assert!(missed > mastered);
    }

    #[test]
    fn test_stale_mastered_pair_resurfaces() {
        let config = SchedulerConfig::default();
        let fresh = priority(&history(&[true], NOW - 60.0), NOW, &config);
        let stale = priority(&history(&[true], NOW - 30.0 * 24.0 * HOUR), NOW, &config);
        assert!(stale > fresh);
    }

    fn decay_rate() -> impl Strategy<Value = f64> {
        0.05f64..0.95
    }

    proptest! {
        #[test]
        fn prop_error_rate_in_unit_interval(
            marks in proptest::collection::vec(any::<bool>(), 1..40),
            rate in decay_rate(),
        ) {
            let value = error_rate(&history(&marks, NOW), rate).unwrap();
            prop_assert!((0.0..=1.0).contains(&value));
        }

        #[test]
        fn prop_mistake_moved_more_recent_never_lowers_rate(
            marks in proptest::collection::vec(any::<bool>(), 2..30),
            rate in decay_rate(),
            pick in any::<prop::sample::Index>(),
        ) {
            // Swap a mistake with a correct answer newer than it.
            let i = pick.index(marks.len());
            prop_assume!(!marks[i]);
            let Some(j) = (i + 1..marks.len()).find(|&j| marks[j]) else {
                return Ok(());
            };

            let mut moved = marks.clone();
            moved.swap(i, j);

            let before = error_rate(&history(&marks, NOW), rate).unwrap();
            let after = error_rate(&history(&moved, NOW), rate).unwrap();
            prop_assert!(after >= before - 1e-12);
        }

        #[test]
        fn prop_correct_moved_more_recent_never_raises_rate(
            marks in proptest::collection::vec(any::<bool>(), 2..30),
            rate in decay_rate(),
            pick in any::<prop::sample::Index>(),
        ) {
            let i = pick.index(marks.len());
            prop_assume!(marks[i]);
            let Some(j) = (i + 1..marks.len()).find(|&j| !marks[j]) else {
                return Ok(());
            };

            let mut moved = marks.clone();
            moved.swap(i, j);

            let before = error_rate(&history(&marks, NOW), rate).unwrap();
            let after = error_rate(&history(&moved, NOW), rate).unwrap();
            prop_assert!(after <= before + 1e-12);
        }

        #[test]
        fn prop_boost_monotone_and_bounded(
            a in 0.0f64..1e7,
            b in 0.0f64..1e7,
            cap in 0.0f64..0.99,
            half_life in 0.1f64..1_000.0,
        ) {
            let config = SchedulerConfig {
                boost_cap: cap,
                boost_half_life_hours: half_life,
                ..SchedulerConfig::default()
            };
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let boost_low = staleness_boost(low, &config);
            let boost_high = staleness_boost(high, &config);
            prop_assert!(boost_low <= boost_high);
            prop_assert!((0.0..=cap).contains(&boost_high));
        }

        #[test]
        fn prop_seen_never_reaches_unseen(
            marks in proptest::collection::vec(any::<bool>(), 1..20),
            elapsed in 0.0f64..1e9,
        ) {
            let config = SchedulerConfig::default();
            let seen = priority(&history(&marks, NOW - elapsed), NOW, &config);
            prop_assert!(seen < Priority::Unseen);
            prop_assert!(seen.score().unwrap() < 1.0 + config.boost_cap + 1e-12);
        }
    }
}
