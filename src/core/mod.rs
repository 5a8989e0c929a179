//! Core domain types for glosor.
//!
//! Word pairs and their grouping, the category tables, and the append-only
//! answer log entries the scheduler reads.

pub mod answer;
pub mod vocabulary;

pub use answer::{check_not_older, unix_timestamp, validate_timestamp, Answer, Mark};
pub use vocabulary::{
    AddGroupReport, AnswerId, Candidate, Category, CategoryKind, DirectionId, NewWordForm,
    NewWordGroup, Word, WordDetails, WordGroupId, WordId, ADJECTIVE, ENGLISH_TO_SWEDISH,
    SWEDISH_TO_ENGLISH,
};
