//! Answer log entries.
//!
//! An answer is written once per quiz attempt and never changed. Timestamps
//! are Unix seconds stored as `REAL`, matching the reporting queries that
//! read the `Answer` table directly.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::core::vocabulary::{AnswerId, DirectionId, WordId};
use crate::error::{Result, VocabError};

/// Correctness flag of one answer, stored as 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Mark {
    Incorrect,
    Correct,
}

impl Mark {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }

    /// Integer value stored in the `Mark` column.
    pub fn value(&self) -> i64 {
        match self {
            Self::Incorrect => 0,
            Self::Correct => 1,
        }
    }
}

impl From<bool> for Mark {
    fn from(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

impl From<Mark> for i64 {
    fn from(mark: Mark) -> Self {
        mark.value()
    }
}

impl TryFrom<i64> for Mark {
    type Error = VocabError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Incorrect),
            1 => Ok(Self::Correct),
            other => Err(VocabError::validation(format!(
                "mark must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// One recorded quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub word_id: WordId,
    pub direction_id: DirectionId,
    pub mark: Mark,
    pub timestamp: f64,
}

/// Reject timestamps that are not finite and positive.
pub fn validate_timestamp(timestamp: f64) -> Result<()> {
    if timestamp.is_finite() && timestamp > 0.0 {
        Ok(())
    } else {
        Err(VocabError::validation(format!(
            "timestamp must be a positive Unix time, got {}",
            timestamp
        )))
    }
}

/// Reject a timestamp older than the newest one already logged for the pair.
///
/// Histories are ordered by time, so a new answer must land at the end.
pub fn check_not_older(timestamp: f64, newest: Option<f64>) -> Result<()> {
    match newest {
        Some(newest) if timestamp < newest => Err(VocabError::validation(format!(
            "timestamp {} is older than the newest answer for this pair ({})",
            timestamp, newest
        ))),
        _ => Ok(()),
    }
}

/// Unix seconds (with sub-second precision) for a point in time.
pub fn unix_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}
