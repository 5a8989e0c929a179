//! SQLite-backed vocabulary storage.
//!
//! The database runs in WAL mode with foreign keys enforced. Each write
//! runs inside an immediate transaction, so an answer row is either fully
//! committed or absent; readers see one snapshot per statement.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::core::{
    check_not_older, validate_timestamp, AddGroupReport, Answer, AnswerId, Candidate, Category, CategoryKind,
    DirectionId, Mark, NewWordGroup, Word, WordDetails, WordGroupId, WordId,
};
use crate::error::{Result, VocabError};
use crate::storage::authoring::check_group;
use crate::storage::{schema, VocabularyStore};

const ANSWER_COLUMNS: &str = "AnswerID, WordID, TranslationDirectionID, Mark, Timestamp";

/// SQLite vocabulary store.
pub struct SqliteStore {
    connection: Mutex<Connection>,
    path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteStore {
    /// Open (and create if needed) the database at `path`.
    ///
    /// Creates the parent directory, enables WAL mode and foreign keys,
    /// and initializes missing tables and seed rows.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| VocabError::storage(parent, e))?;
            }
        }

        let connection = Connection::open(&path)?;
        connection.busy_timeout(busy_timeout)?;
        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        schema::initialize(&connection)?;

        tracing::debug!(path = %path.display(), "opened vocabulary database");

        Ok(Self {
            connection: Mutex::new(connection),
            path,
        })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA foreign_keys=ON;")?;
        schema::initialize(&connection)?;

        Ok(Self {
            connection: Mutex::new(connection),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| VocabError::store_unavailable(format!("lock poisoned: {}", e)))
    }
}

fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<Answer> {
    let mark: i64 = row.get(3)?;
    let mark = Mark::try_from(mark)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(e)))?;

    Ok(Answer {
        id: AnswerId(row.get(0)?),
        word_id: WordId(row.get(1)?),
        direction_id: DirectionId(row.get(2)?),
        mark,
        timestamp: row.get(4)?,
    })
}

fn exists(conn: &Connection, sql: &str, id: i64) -> Result<bool> {
    Ok(conn.query_row(sql, params![id], |row| row.get::<_, bool>(0))?)
}

fn category_exists(conn: &Connection, kind: CategoryKind, id: i64) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
        kind.table(),
        kind.id_column()
    );
    exists(conn, &sql, id)
}

impl VocabularyStore for SqliteStore {
    fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT W.WordID, W.WordGroup, D.TranslationDirectionID,
                   W.PartOfSpeechID, W.WordCategoryID
            FROM Word W
            CROSS JOIN TranslationDirection D
            "#,
        )?;

        let candidates = stmt
            .query_map([], |row| {
                Ok(Candidate {
                    word_id: WordId(row.get(0)?),
                    word_group: WordGroupId(row.get(1)?),
                    direction_id: DirectionId(row.get(2)?),
                    part_of_speech_id: row.get(3)?,
                    word_category_id: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(candidates)
    }

    fn answer_history(&self, word_id: WordId, direction_id: DirectionId) -> Result<Vec<Answer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {ANSWER_COLUMNS} FROM Answer
            WHERE WordID = ?1 AND TranslationDirectionID = ?2
            ORDER BY Timestamp ASC, AnswerID ASC
            "#
        ))?;

        let history = stmt
            .query_map(params![word_id.0, direction_id.0], answer_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(history)
    }

    fn record_answer(
        &self,
        word_id: WordId,
        direction_id: DirectionId,
        mark: i64,
        timestamp: f64,
    ) -> Result<AnswerId> {
        let mark = Mark::try_from(mark)?;
        validate_timestamp(timestamp)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM Word WHERE WordID = ?1)",
            word_id.0,
        )? {
            return Err(VocabError::validation(format!("unknown word {}", word_id)));
        }
        if !category_exists(&tx, CategoryKind::TranslationDirection, direction_id.0)? {
            return Err(VocabError::validation(format!(
                "unknown translation direction {}",
                direction_id
            )));
        }

        let newest: Option<f64> = tx.query_row(
            "SELECT MAX(Timestamp) FROM Answer WHERE WordID = ?1 AND TranslationDirectionID = ?2",
            params![word_id.0, direction_id.0],
            |row| row.get(0),
        )?;
        check_not_older(timestamp, newest)?;

        tx.execute(
            "INSERT INTO Answer (WordID, Mark, TranslationDirectionID, Timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![word_id.0, mark.value(), direction_id.0, timestamp],
        )?;
        let id = AnswerId(tx.last_insert_rowid());
        tx.commit()?;

        tracing::info!(
            answer_id = id.0,
            word_id = word_id.0,
            direction_id = direction_id.0,
            correct = mark.is_correct(),
            "recorded answer"
        );

        Ok(id)
    }

    fn word_details(&self, word_id: WordId) -> Result<WordDetails> {
        let conn = self.conn()?;
        let details = conn
            .query_row(
                r#"
                SELECT W.WordID, W.English, W.Swedish, W.WordCategoryID, W.PartOfSpeechID,
                       W.WordGroup, W.GrammarCategoryID,
                       C.WordCategory, P.PartOfSpeech, G.GrammarCategory,
                       H.Hint, L.WiktionaryLink
                FROM Word W
                JOIN WordCategory C ON W.WordCategoryID = C.WordCategoryID
                JOIN PartOfSpeech P ON W.PartOfSpeechID = P.PartOfSpeechID
                JOIN GrammarCategory G ON W.GrammarCategoryID = G.GrammarCategoryID
                LEFT JOIN Hint H ON W.WordGroup = H.WordGroup
                LEFT JOIN Link L ON W.WordGroup = L.WordGroup
                WHERE W.WordID = ?1
                "#,
                params![word_id.0],
                |row| {
                    Ok(WordDetails {
                        word: Word {
                            id: WordId(row.get(0)?),
                            english: row.get(1)?,
                            swedish: row.get(2)?,
                            word_category_id: row.get(3)?,
                            part_of_speech_id: row.get(4)?,
                            word_group: WordGroupId(row.get(5)?),
                            grammar_category_id: row.get(6)?,
                        },
                        word_category: row.get(7)?,
                        part_of_speech: row.get(8)?,
                        grammar_category: row.get(9)?,
                        hint: row.get(10)?,
                        wiktionary_link: row.get(11)?,
                    })
                },
            )
            .optional()?;

        details.ok_or_else(|| VocabError::not_found("word", word_id.0))
    }

    fn categories(&self, kind: CategoryKind) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {id}, {table} FROM {table} ORDER BY {id}",
            table = kind.table(),
            id = kind.id_column()
        ))?;

        let rows = stmt
            .query_map([], |row| Ok(Category::new(row.get(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn add_category(&self, kind: CategoryKind, category: &Category) -> Result<()> {
        if category.label.trim().is_empty() {
            return Err(VocabError::validation("category label must not be empty"));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if category_exists(&tx, kind, category.id)? {
            return Err(VocabError::validation(format!(
                "{} {} already exists",
                kind.entity(),
                category.id
            )));
        }
        tx.execute(
            &format!(
                "INSERT INTO {table} ({id}, {table}) VALUES (?1, ?2)",
                table = kind.table(),
                id = kind.id_column()
            ),
            params![category.id, category.label],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn add_word_group(&self, group: &NewWordGroup) -> Result<AddGroupReport> {
        check_group(group)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !category_exists(&tx, CategoryKind::PartOfSpeech, group.part_of_speech_id)? {
            return Err(VocabError::validation(format!(
                "unknown part of speech {}",
                group.part_of_speech_id
            )));
        }
        if !category_exists(&tx, CategoryKind::WordCategory, group.word_category_id)? {
            return Err(VocabError::validation(format!(
                "unknown word category {}",
                group.word_category_id
            )));
        }
        for form in &group.forms {
            if !category_exists(&tx, CategoryKind::GrammarCategory, form.grammar_category_id)? {
                return Err(VocabError::validation(format!(
                    "unknown grammar category {}",
                    form.grammar_category_id
                )));
            }
        }

        let word_group = WordGroupId(tx.query_row(
            "SELECT COALESCE(MAX(WordGroup), 0) + 1 FROM Word",
            [],
            |row| row.get(0),
        )?);
        let mut report = AddGroupReport::default();

        for form in &group.forms {
            let duplicate: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM Word
                 WHERE English = ?1 AND Swedish = ?2 AND GrammarCategoryID = ?3)",
                params![form.english, form.swedish, form.grammar_category_id],
                |row| row.get(0),
            )?;
            if duplicate {
                tracing::debug!(english = %form.english, swedish = %form.swedish, "skipping duplicate pair");
                report.duplicates.push(form.clone());
                continue;
            }

            tx.execute(
                "INSERT INTO Word (English, Swedish, WordCategoryID, PartOfSpeechID,
                                   WordGroup, GrammarCategoryID)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    form.english,
                    form.swedish,
                    group.word_category_id,
                    group.part_of_speech_id,
                    word_group.0,
                    form.grammar_category_id
                ],
            )?;
            report.added.push(WordId(tx.last_insert_rowid()));
        }

        if !report.added.is_empty() {
            report.word_group = Some(word_group);
        }

        if report.duplicates.is_empty() {
            if let Some(hint) = &group.hint {
                tx.execute(
                    "INSERT INTO Hint (WordGroup, Hint) VALUES (?1, ?2)",
                    params![word_group.0, hint],
                )?;
                report.hint_added = true;
            }
            if let Some(link) = &group.wiktionary_link {
                tx.execute(
                    "INSERT INTO Link (WordGroup, WiktionaryLink) VALUES (?1, ?2)",
                    params![word_group.0, link],
                )?;
                report.link_added = true;
            }
        }

        tx.commit()?;

        tracing::info!(
            word_group = word_group.0,
            added = report.added.len(),
            duplicates = report.duplicates.len(),
            "added word group"
        );

        Ok(report)
    }

    fn answers_since(&self, since: f64) -> Result<Vec<Answer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ANSWER_COLUMNS} FROM Answer
             WHERE Timestamp >= ?1
             ORDER BY Timestamp ASC, AnswerID ASC"
        ))?;

        let answers = stmt
            .query_map(params![since], answer_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(answers)
    }
}
