//! Terminal presentation of one question.
//!
//! Word texts may hold several accepted translations separated by `/`.
//! The prompt shows only the first; any of them is accepted as an answer.

use crate::core::{DirectionId, WordDetails, ENGLISH_TO_SWEDISH, SWEDISH_TO_ENGLISH};
use crate::error::{Result, VocabError};

fn unknown_direction(direction: DirectionId) -> VocabError {
    VocabError::validation(format!("unknown translation direction {}", direction))
}

/// Source and target text of a word for the given direction.
pub fn texts(details: &WordDetails, direction: DirectionId) -> Result<(&str, &str)> {
    match direction {
        ENGLISH_TO_SWEDISH => Ok((&details.word.english, &details.word.swedish)),
        SWEDISH_TO_ENGLISH => Ok((&details.word.swedish, &details.word.english)),
        other => Err(unknown_direction(other)),
    }
}

/// Language asked for in the response.
pub fn target_language(direction: DirectionId) -> Result<&'static str> {
    match direction {
        ENGLISH_TO_SWEDISH => Ok("Swedish"),
        SWEDISH_TO_ENGLISH => Ok("English"),
        other => Err(unknown_direction(other)),
    }
}

/// Text shown as the question: the first alternative.
pub fn prompt_text(source: &str) -> &str {
    source.split('/').next().unwrap_or(source).trim()
}

/// All alternatives, for showing the correct answer.
pub fn answer_text(target: &str) -> String {
    target.replace('/', " / ")
}

/// Normalize free text for comparison.
///
/// Keeps word characters (letters, digits, `_`), whitespace, `-` and `:`.
/// Whitespace runs collapse to one space, and the result is lowercased and
/// trimmed.
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | ':' | '_'))
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized accepted answers.
pub fn accepted_answers(target: &str) -> Vec<String> {
    target.split('/').map(normalize).collect()
}

/// Whether a typed response matches any accepted answer.
pub fn is_correct_response(response: &str, target: &str) -> bool {
    let response = normalize(response);
    !response.is_empty() && accepted_answers(target).contains(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Word, WordGroupId, WordId};

    fn details() -> WordDetails {
        WordDetails {
            word: Word {
                id: WordId(1),
                english: "a house".to_string(),
                swedish: "ett hus".to_string(),
                word_category_id: 1,
                part_of_speech_id: 1,
                word_group: WordGroupId(1),
                grammar_category_id: 1,
            },
            word_category: "Other".to_string(),
            part_of_speech: "Noun".to_string(),
            grammar_category: "Indefinite singular".to_string(),
            hint: None,
            wiktionary_link: None,
        }
    }

    #[test]
    fn test_texts_follow_direction() {
        let details = details();
        assert_eq!(texts(&details, ENGLISH_TO_SWEDISH).unwrap(), ("a house", "ett hus"));
        assert_eq!(texts(&details, SWEDISH_TO_ENGLISH).unwrap(), ("ett hus", "a house"));
        assert_eq!(target_language(ENGLISH_TO_SWEDISH).unwrap(), "Swedish");
        assert_eq!(target_language(SWEDISH_TO_ENGLISH).unwrap(), "English");
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let details = details();
        assert!(matches!(
            texts(&details, DirectionId(3)),
            Err(VocabError::Validation { .. })
        ));
        assert!(matches!(
            target_language(DirectionId(0)),
            Err(VocabError::Validation { .. })
        ));
    }

    #[test]
    fn test_prompt_uses_first_alternative() {
        assert_eq!(prompt_text("to run/to race"), "to run");
        assert_eq!(prompt_text("house"), "house");
    }

    #[test]
    fn test_answer_text_spaces_alternatives() {
        assert_eq!(answer_text("springa/löpa"), "springa / löpa");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Ett   Hus! "), "ett hus");
        assert_eq!(normalize("kl. 10:30"), "kl 10:30");
        assert_eq!(normalize("e-post"), "e-post");
        assert_eq!(normalize("Göteborg?"), "göteborg");
    }

    #[test]
    fn test_any_alternative_is_accepted() {
        assert!(is_correct_response("Löpa", "springa/löpa"));
        assert!(is_correct_response("springa ", "springa / löpa"));
        assert!(!is_correct_response("gå", "springa/löpa"));
        assert!(!is_correct_response("   ", "springa/löpa"));
    }
}
