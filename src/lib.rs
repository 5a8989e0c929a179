//! glosor - adaptive Swedish/English vocabulary trainer
//!
//! glosor keeps English/Swedish word pairs and an append-only log of
//! answers in SQLite, and picks the next (word, direction) question so that
//! every pair is asked once before any repeat, weak pairs come back more
//! often, and consecutive questions avoid inflections of the same word.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod stats;
pub mod storage;
pub mod util;

pub use config::Config;
pub use core::{
    Answer, AnswerId, Candidate, Category, CategoryKind, DirectionId, Mark, NewWordForm,
    NewWordGroup, Word, WordDetails, WordGroupId, WordId,
};
pub use error::{Result, VocabError};
pub use scheduler::{Priority, Question, ScoredCandidate, Scheduler};
pub use stats::{PerformanceReport, ProgressReport};
pub use storage::{MemoryStore, SqliteStore, VocabularyStore};

// CLI commands
pub use cli::{
    AddCommand, AnswerCommand, CategoriesCommand, HistoryCommand, InitCommand, NextCommand,
    ProgressCommand, RankCommand, StatsCommand,
};
