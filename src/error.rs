//! Unified error types for glosor.
//!
//! Reads of unknown rows are `NotFound`, malformed writes are `Validation`
//! and are rejected before anything touches the database, and a database
//! that cannot be reached or is locked is `StoreUnavailable`. None of these
//! are swallowed by the scheduler; the caller decides whether to retry.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for glosor operations.
#[derive(Error, Debug)]
pub enum VocabError {
    /// A referenced word, direction or group does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A write was rejected before persistence.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The database is unreachable, busy or locked.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Any other SQLite failure.
    #[error("database error: {message}")]
    Database { message: String },

    /// Selection was requested over an empty candidate set.
    #[error("no eligible words to ask")]
    NoCandidates,

    /// I/O errors on config or authoring files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading or validation errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for glosor operations.
pub type Result<T> = std::result::Result<T, VocabError>;

impl VocabError {
    /// Create a not found error.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a store unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a generic database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether retrying the whole question/answer cycle later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_retryable() {
            exit_codes::TEMPFAIL
        } else {
            exit_codes::ERROR
        }
    }
}

impl From<rusqlite::Error> for VocabError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied,
            ) => Self::store_unavailable(err.to_string()),
            Some(ErrorCode::ConstraintViolation) => Self::validation(err.to_string()),
            _ => Self::database(err.to_string()),
        }
    }
}

impl From<io::Error> for VocabError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for VocabError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

impl From<toml::de::Error> for VocabError {
    fn from(err: toml::de::Error) -> Self {
        Self::serde(err.to_string())
    }
}

/// Trait for fail-open error handling.
///
/// Only configuration loading uses this: a broken config layer is logged
/// and skipped. Store and scheduler errors always propagate.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the glosor CLI.
pub mod exit_codes {
    /// Command succeeded.
    pub const SUCCESS: i32 = 0;

    /// Command failed.
    pub const ERROR: i32 = 1;

    /// Store temporarily unavailable; the caller may retry (EX_TEMPFAIL).
    pub const TEMPFAIL: i32 = 75;
}
