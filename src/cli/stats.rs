//! Stats command for glosor.
//!
//! Shows accuracy, target hit rates and the direction split over the whole
//! answer log, with mean scores per category when detailed.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::config::ProgressConfig;
use crate::error::VocabError;
use crate::stats::{performance, CategoryScore, PerformanceReport, TargetRecord};
use crate::storage::VocabularyStore;

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Show mean scores per category.
    pub detailed: bool,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    /// Whether the log was summarized.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PerformanceReport>,
    /// Whether the text output includes the category tables.
    #[serde(default)]
    pub detailed: bool,
    /// Error message if stats failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

fn percent(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn target_line(record: &TargetRecord, period: &str) -> String {
    format!(
        "   Met on {} of {} {} ({})",
        record.met,
        record.periods,
        period,
        percent(record.rate())
    )
}

fn score_lines(lines: &mut Vec<String>, title: &str, scores: &[CategoryScore]) {
    lines.push(format!("Mean score per {}", title));
    for score in scores {
        lines.push(format!(
            "   {:<28} {:.3}  ({} answers)",
            score.label, score.mean, score.answers
        ));
    }
}

impl StatsOutput {
    /// Create a successful output.
    pub fn success(report: PerformanceReport, detailed: bool) -> Self {
        Self {
            success: true,
            report: Some(report),
            detailed,
            error: None,
            retryable: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &VocabError) -> Self {
        Self {
            success: false,
            report: None,
            detailed: false,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        let Some(report) = &self.report else {
            return format!(
                "Stats failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        };
        if report.answers == 0 {
            return "No answers yet.".to_string();
        }

        let mut lines = vec![format!(
            "Answers: {} | Correct: {} ({})",
            report.answers,
            report.correct,
            percent(report.accuracy())
        )];
        for direction in &report.by_direction {
            lines.push(format!(
                "   {}: {} ({})",
                direction.label,
                direction.answers,
                percent(Some(direction.share))
            ));
        }

        lines.push("Daily target".to_string());
        lines.push(target_line(&report.days, "days"));
        lines.push("Weekly target".to_string());
        lines.push(target_line(&report.weeks, "weeks"));

        if self.detailed {
            score_lines(&mut lines, "part of speech", &report.by_part_of_speech);
            score_lines(&mut lines, "word category", &report.by_word_category);
            score_lines(&mut lines, "grammar category", &report.by_grammar_category);
        }

        lines.join("\n")
    }
}

/// The stats command implementation.
pub struct StatsCommand<S: VocabularyStore> {
    store: S,
    config: ProgressConfig,
}

impl<S: VocabularyStore> StatsCommand<S> {
    /// Create a new stats command.
    pub fn new(store: S, config: ProgressConfig) -> Self {
        Self { store, config }
    }

    /// Run the stats command. Days and weeks are taken in `tz`.
    pub fn run<Tz: TimeZone>(&self, options: &StatsOptions, tz: &Tz) -> StatsOutput {
        match performance(&self.store, tz, &self.config) {
            Ok(report) => StatsOutput::success(report, options.detailed),
            Err(e) => StatsOutput::failure(&e),
        }
    }
}
