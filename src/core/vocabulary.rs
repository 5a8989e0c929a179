//! Vocabulary entity types.
//!
//! Words, word groups and the small category tables they reference. A word
//! group collects every inflected form of one lexical item and may carry a
//! hint and a Wiktionary link.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Identifier of a word pair.
    WordId
);
id_type!(
    /// Identifier shared by all inflected forms of one lexical item.
    WordGroupId
);
id_type!(
    /// Identifier of a translation direction.
    DirectionId
);
id_type!(
    /// Identifier of an answer row. Monotonically increasing.
    AnswerId
);

/// Direction id for English prompts answered in Swedish.
pub const ENGLISH_TO_SWEDISH: DirectionId = DirectionId(1);

/// Direction id for Swedish prompts answered in English.
pub const SWEDISH_TO_ENGLISH: DirectionId = DirectionId(2);

/// Part of speech id for adjectives.
///
/// Adjective questions show their grammar category as a hint.
pub const ADJECTIVE: i64 = 3;

/// The category tables a word or answer can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    GrammarCategory,
    PartOfSpeech,
    WordCategory,
    TranslationDirection,
}

impl CategoryKind {
    /// All category kinds, in table-name order.
    pub const ALL: [CategoryKind; 4] = [
        CategoryKind::GrammarCategory,
        CategoryKind::PartOfSpeech,
        CategoryKind::WordCategory,
        CategoryKind::TranslationDirection,
    ];

    /// SQL table name. The label column has the same name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::GrammarCategory => "GrammarCategory",
            Self::PartOfSpeech => "PartOfSpeech",
            Self::WordCategory => "WordCategory",
            Self::TranslationDirection => "TranslationDirection",
        }
    }

    /// SQL primary key column.
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::GrammarCategory => "GrammarCategoryID",
            Self::PartOfSpeech => "PartOfSpeechID",
            Self::WordCategory => "WordCategoryID",
            Self::TranslationDirection => "TranslationDirectionID",
        }
    }

    /// Entity name used in error messages.
    pub fn entity(&self) -> &'static str {
        match self {
            Self::GrammarCategory => "grammar category",
            Self::PartOfSpeech => "part of speech",
            Self::WordCategory => "word category",
            Self::TranslationDirection => "translation direction",
        }
    }

    /// Rows every new store starts with.
    pub fn seed(&self) -> &'static [(i64, &'static str)] {
        match self {
            Self::GrammarCategory => GRAMMAR_CATEGORIES,
            Self::PartOfSpeech => PARTS_OF_SPEECH,
            Self::WordCategory => WORD_CATEGORIES,
            Self::TranslationDirection => TRANSLATION_DIRECTIONS,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

const GRAMMAR_CATEGORIES: &[(i64, &str)] = &[
    (0, "N/A"),
    (1, "Noun indefinite singular"),
    (2, "Noun definite singular"),
    (3, "Noun indefinite plural"),
    (4, "Noun definite plural"),
    (5, "Adjective utrum"),
    (6, "Adjective neutrum"),
    (7, "Adjective plural"),
    (8, "Preposition"),
    (9, "Verb infinitive"),
    (10, "Verb present simple"),
    (11, "Verb past simple"),
    (12, "Verb present perfect"),
    (13, "Verb imperative"),
    (14, "Adjective comparative"),
    (15, "Adjective superlative"),
];

const PARTS_OF_SPEECH: &[(i64, &str)] = &[
    (1, "Noun"),
    (2, "Verb"),
    (3, "Adjective"),
    (4, "Adverb"),
    (5, "Phrase"),
    (6, "Preposition"),
    (7, "Conjunction"),
];

const WORD_CATEGORIES: &[(i64, &str)] = &[
    (1, "General"),
    (2, "Food"),
    (3, "Sport"),
    (4, "Business"),
    (5, "Geography"),
    (6, "Body"),
    (7, "Word order"),
    (8, "Time"),
    (9, "Particle verbs"),
    (10, "Clothes"),
    (11, "Computers"),
    (12, "Science"),
    (13, "Animals"),
];

const TRANSLATION_DIRECTIONS: &[(i64, &str)] = &[(1, "English to Swedish"), (2, "Swedish to English")];

/// One row of a category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub label: String,
}

impl Category {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A stored English/Swedish word pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub english: String,
    pub swedish: String,
    pub word_category_id: i64,
    pub part_of_speech_id: i64,
    pub word_group: WordGroupId,
    pub grammar_category_id: i64,
}

/// A word joined with its labels, hint and link, for rendering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDetails {
    pub word: Word,
    pub word_category: String,
    pub part_of_speech: String,
    pub grammar_category: String,
    pub hint: Option<String>,
    pub wiktionary_link: Option<String>,
}

impl WordDetails {
    /// Grammar hint shown with the question, if any.
    ///
    /// Only adjectives get one: their inflections are otherwise ambiguous.
    pub fn grammar_hint(&self) -> Option<&str> {
        (self.word.part_of_speech_id == ADJECTIVE).then_some(self.grammar_category.as_str())
    }
}

/// One quizzable (word, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub word_id: WordId,
    pub word_group: WordGroupId,
    pub direction_id: DirectionId,
    pub part_of_speech_id: i64,
    pub word_category_id: i64,
}

/// One inflected form in a new word group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWordForm {
    pub english: String,
    pub swedish: String,
    #[serde(default)]
    pub grammar_category_id: i64,
}

impl NewWordForm {
    pub fn new(english: impl Into<String>, swedish: impl Into<String>, grammar_category_id: i64) -> Self {
        Self {
            english: english.into(),
            swedish: swedish.into(),
            grammar_category_id,
        }
    }
}

/// Authoring input: every form of one lexical item plus optional context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWordGroup {
    pub part_of_speech_id: i64,
    #[serde(default = "default_word_category")]
    pub word_category_id: i64,
    pub forms: Vec<NewWordForm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiktionary_link: Option<String>,
}

fn default_word_category() -> i64 {
    1
}

impl NewWordGroup {
    /// Create a group with no hint or link.
    pub fn new(part_of_speech_id: i64, word_category_id: i64, forms: Vec<NewWordForm>) -> Self {
        Self {
            part_of_speech_id,
            word_category_id,
            forms,
            hint: None,
            wiktionary_link: None,
        }
    }

    /// Set the context hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Set the Wiktionary link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.wiktionary_link = Some(link.into());
        self
    }
}

/// Outcome of adding one word group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddGroupReport {
    /// Group the new words went into. `None` when every form was a duplicate.
    pub word_group: Option<WordGroupId>,
    /// Ids of newly inserted words.
    pub added: Vec<WordId>,
    /// Forms skipped because the pair already exists.
    pub duplicates: Vec<NewWordForm>,
    pub hint_added: bool,
    pub link_added: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(part_of_speech_id: i64) -> WordDetails {
        WordDetails {
            word: Word {
                id: WordId(1),
                english: "big".to_string(),
                swedish: "stort".to_string(),
                word_category_id: 1,
                part_of_speech_id,
                word_group: WordGroupId(1),
                grammar_category_id: 6,
            },
            word_category: "General".to_string(),
            part_of_speech: "Adjective".to_string(),
            grammar_category: "Adjective neutrum".to_string(),
            hint: None,
            wiktionary_link: None,
        }
    }

    #[test]
    fn test_grammar_hint_only_for_adjectives() {
        assert_eq!(details(ADJECTIVE).grammar_hint(), Some("Adjective neutrum"));
        assert_eq!(details(1).grammar_hint(), None);
    }

    #[test]
    fn test_seed_tables_are_non_empty_and_unique() {
        for kind in CategoryKind::ALL {
            let seed = kind.seed();
            assert!(!seed.is_empty(), "{} has no seed rows", kind);
            let mut ids: Vec<i64> = seed.iter().map(|(id, _)| *id).collect();
            ids.dedup();
            assert_eq!(ids.len(), seed.len(), "{} has duplicate ids", kind);
        }
    }

    #[test]
    fn test_direction_constants_match_seed() {
        let seed = CategoryKind::TranslationDirection.seed();
        assert!(seed.iter().any(|(id, _)| *id == ENGLISH_TO_SWEDISH.0));
        assert!(seed.iter().any(|(id, _)| *id == SWEDISH_TO_ENGLISH.0));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&WordId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_new_word_group_from_toml() {
        let group: NewWordGroup = toml::from_str(
            r#"
part_of_speech_id = 1
hint = "furniture"
forms = [
    { english = "a table", swedish = "ett bord", grammar_category_id = 1 },
    { english = "the table", swedish = "bordet", grammar_category_id = 2 },
]
"#,
        )
        .unwrap();

        assert_eq!(group.word_category_id, 1);
        assert_eq!(group.forms.len(), 2);
        assert_eq!(group.hint.as_deref(), Some("furniture"));
        assert!(group.wiktionary_link.is_none());
    }
}
