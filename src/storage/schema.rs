//! SQL schema for the vocabulary database.
//!
//! Table and column names are part of the reporting contract: ad-hoc
//! queries over `Answer` and `Word` must keep working.

use rusqlite::{params, Connection};

use crate::core::CategoryKind;
use crate::error::Result;

/// Tables, index and reporting view. Safe to run on an existing database.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS Answer (
    AnswerID               INTEGER PRIMARY KEY AUTOINCREMENT,
    WordID                 INTEGER NOT NULL,
    Mark                   INTEGER NOT NULL,
    TranslationDirectionID INTEGER NOT NULL,
    Timestamp              REAL    NOT NULL,

    FOREIGN KEY (WordID)
        REFERENCES Word (WordID),
    FOREIGN KEY (TranslationDirectionID)
        REFERENCES TranslationDirection (TranslationDirectionID)
);

CREATE TABLE IF NOT EXISTS GrammarCategory (
    GrammarCategoryID INTEGER PRIMARY KEY NOT NULL,
    GrammarCategory   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS Hint (
    WordGroup INTEGER PRIMARY KEY NOT NULL,
    Hint      TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS Link (
    WordGroup      INTEGER PRIMARY KEY NOT NULL,
    WiktionaryLink TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS PartOfSpeech (
    PartOfSpeechID INTEGER PRIMARY KEY NOT NULL,
    PartOfSpeech   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS TranslationDirection (
    TranslationDirectionID INTEGER PRIMARY KEY NOT NULL,
    TranslationDirection   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS WordCategory (
    WordCategoryID INTEGER PRIMARY KEY NOT NULL,
    WordCategory   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS Word (
    WordID            INTEGER PRIMARY KEY AUTOINCREMENT,
    English           TEXT    NOT NULL,
    Swedish           TEXT    NOT NULL,
    WordCategoryID    INTEGER NOT NULL,
    PartOfSpeechID    INTEGER NOT NULL,
    WordGroup         INTEGER NOT NULL,
    GrammarCategoryID INTEGER NOT NULL,

    FOREIGN KEY (WordCategoryID)
        REFERENCES WordCategory (WordCategoryID),
    FOREIGN KEY (PartOfSpeechID)
        REFERENCES PartOfSpeech (PartOfSpeechID),
    FOREIGN KEY (GrammarCategoryID)
        REFERENCES GrammarCategory (GrammarCategoryID)
);

CREATE INDEX IF NOT EXISTS AnswerWordDirection
    ON Answer (WordID, TranslationDirectionID, Timestamp);

CREATE VIEW IF NOT EXISTS AnswerView AS
    SELECT
        A.AnswerID,
        A.WordID,
        W.English,
        W.Swedish,
        W.WordGroup,
        P.PartOfSpeech,
        C.WordCategory,
        G.GrammarCategory,
        A.Mark,
        A.TranslationDirectionID,
        D.TranslationDirection,
        A.Timestamp,
        H.Hint,
        L.WiktionaryLink
    FROM
        Answer A
    JOIN Word W
        ON W.WordID = A.WordID
    JOIN PartOfSpeech P
        ON W.PartOfSpeechID = P.PartOfSpeechID
    JOIN WordCategory C
        ON W.WordCategoryID = C.WordCategoryID
    JOIN GrammarCategory G
        ON W.GrammarCategoryID = G.GrammarCategoryID
    LEFT JOIN Hint H
        ON W.WordGroup = H.WordGroup
    LEFT JOIN Link L
        ON W.WordGroup = L.WordGroup
    LEFT JOIN TranslationDirection D
        ON A.TranslationDirectionID = D.TranslationDirectionID;
"#;

/// Create missing tables and insert missing seed rows.
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    for kind in CategoryKind::ALL {
        let sql = format!(
            "INSERT OR IGNORE INTO {table} ({id}, {table}) VALUES (?1, ?2)",
            table = kind.table(),
            id = kind.id_column()
        );
        let mut stmt = conn.prepare(&sql)?;
        for (id, label) in kind.seed() {
            stmt.execute(params![id, label])?;
        }
    }

    Ok(())
}
