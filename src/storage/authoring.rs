//! Checks shared by every store when authoring word groups.

use crate::core::{NewWordForm, NewWordGroup, Word};
use crate::error::{Result, VocabError};

/// Reject structurally malformed groups before touching any table.
pub fn check_group(group: &NewWordGroup) -> Result<()> {
    if group.forms.is_empty() {
        return Err(VocabError::validation("a word group needs at least one form"));
    }
    for form in &group.forms {
        if form.english.trim().is_empty() || form.swedish.trim().is_empty() {
            return Err(VocabError::validation(format!(
                "empty word in pair '{}' - '{}'",
                form.english, form.swedish
            )));
        }
    }
    if group.hint.as_deref().is_some_and(|h| h.trim().is_empty()) {
        return Err(VocabError::validation("hint must not be empty"));
    }
    if group
        .wiktionary_link
        .as_deref()
        .is_some_and(|l| l.trim().is_empty())
    {
        return Err(VocabError::validation("Wiktionary link must not be empty"));
    }
    Ok(())
}

/// Whether `word` already stores this form.
///
/// Pairs are compared together with their grammar category: the same
/// spelling can be a different inflection of another item.
pub fn is_duplicate(word: &Word, form: &NewWordForm) -> bool {
    word.english == form.english
        && word.swedish == form.swedish
        && word.grammar_category_id == form.grammar_category_id
}
