//! Practice statistics for glosor.
//!
//! The answer log is the source of truth; every statistic is computed from
//! it on demand.

pub mod performance;
pub mod progress;

pub use performance::{performance, CategoryScore, DirectionShare, PerformanceReport, TargetRecord};
pub use progress::{day_start, progress, week_start, PeriodProgress, ProgressReport};
