//! Progress command for glosor.
//!
//! Shows today's and this week's answer counts against the configured
//! targets.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::ProgressConfig;
use crate::error::VocabError;
use crate::stats::{progress, PeriodProgress, ProgressReport};
use crate::storage::VocabularyStore;

/// Options for the progress command.
#[derive(Debug, Clone, Default)]
pub struct ProgressOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the progress command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressOutput {
    /// Whether counting succeeded.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<PeriodInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<PeriodInfo>,
    /// Whether the daily target is still open.
    pub needs_reminder: bool,
    /// Error message if counting failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

/// Counts for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub answers: usize,
    pub correct: usize,
    pub target: u32,
    pub remaining: usize,
    pub met: bool,
}

impl From<&PeriodProgress> for PeriodInfo {
    fn from(period: &PeriodProgress) -> Self {
        Self {
            answers: period.answers,
            correct: period.correct,
            target: period.target,
            remaining: period.remaining(),
            met: period.met(),
        }
    }
}

impl ProgressOutput {
    /// Create a successful output.
    pub fn success(report: &ProgressReport) -> Self {
        Self {
            success: true,
            today: Some(PeriodInfo::from(&report.today)),
            week: Some(PeriodInfo::from(&report.week)),
            needs_reminder: report.needs_reminder(),
            error: None,
            retryable: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &VocabError) -> Self {
        Self {
            success: false,
            today: None,
            week: None,
            needs_reminder: false,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        let (Some(today), Some(week)) = (&self.today, &self.week) else {
            return format!(
                "Progress failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        };

        let mut lines = vec![
            format!("Day: {}/{}", today.answers, today.target),
            format!("Week: {}/{}", week.answers, week.target),
        ];
        if self.needs_reminder {
            lines.push("You need to do more translations!".to_string());
        } else {
            lines.push("Target already achieved.".to_string());
        }

        lines.join("\n")
    }
}

/// The progress command implementation.
pub struct ProgressCommand<S: VocabularyStore> {
    store: S,
    config: ProgressConfig,
}

impl<S: VocabularyStore> ProgressCommand<S> {
    /// Create a new progress command.
    pub fn new(store: S, config: ProgressConfig) -> Self {
        Self { store, config }
    }

    /// Run the progress command. Periods follow the time zone of `now`.
    pub fn run<Tz: TimeZone>(&self, _options: &ProgressOptions, now: &DateTime<Tz>) -> ProgressOutput {
        match progress(&self.store, now, &self.config) {
            Ok(report) => ProgressOutput::success(&report),
            Err(e) => ProgressOutput::failure(&e),
        }
    }
}
