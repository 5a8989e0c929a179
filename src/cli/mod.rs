//! CLI commands for glosor.
//!
//! This module provides CLI commands for glosor, organized into:
//! - **Practice commands**: next, answer (one question/answer cycle)
//! - **Review commands**: history, rank, progress, stats
//! - **Authoring commands**: init, add, categories

pub mod question;

// Practice commands
pub mod answer;
pub mod next;

// Review commands
pub mod history;
pub mod progress;
pub mod rank;
pub mod stats;

// Authoring commands
pub mod add;
pub mod categories;
pub mod init;

pub use add::AddCommand;
pub use answer::AnswerCommand;
pub use categories::CategoriesCommand;
pub use history::HistoryCommand;
pub use init::InitCommand;
pub use next::NextCommand;
pub use progress::ProgressCommand;
pub use rank::RankCommand;
pub use stats::StatsCommand;
