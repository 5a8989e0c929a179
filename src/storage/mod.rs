//! Vocabulary storage for glosor.
//!
//! This module provides persistent storage for words, categories and the
//! answer log, supporting SQLite and in-memory backends.

pub mod authoring;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::VocabularyStore;
