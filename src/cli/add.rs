//! Add command for glosor.
//!
//! Reads word groups from a TOML authoring file and stores them. A file
//! holds either one group at the top level or several `[[group]]` tables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{AddGroupReport, NewWordGroup};
use crate::error::{Result, VocabError};
use crate::storage::VocabularyStore;
use crate::util::read_to_string_limited;

/// Options for the add command.
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Authoring file to read.
    pub file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthoringFile {
    Many { group: Vec<NewWordGroup> },
    One(NewWordGroup),
}

impl AuthoringFile {
    fn into_groups(self) -> Vec<NewWordGroup> {
        match self {
            Self::Many { group } => group,
            Self::One(group) => vec![group],
        }
    }
}

/// Parse an authoring file's content into word groups.
pub fn parse_groups(content: &str) -> Result<Vec<NewWordGroup>> {
    let file: AuthoringFile = toml::from_str(content)?;
    let groups = file.into_groups();
    if groups.is_empty() {
        return Err(VocabError::validation("no word groups in file"));
    }
    Ok(groups)
}

/// What happened to one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_group: Option<i64>,
    pub added: Vec<i64>,
    /// Skipped pairs, as `english - swedish`.
    pub duplicates: Vec<String>,
    pub hint_added: bool,
    pub link_added: bool,
}

impl From<AddGroupReport> for GroupResult {
    fn from(report: AddGroupReport) -> Self {
        Self {
            word_group: report.word_group.map(|g| g.0),
            added: report.added.iter().map(|id| id.0).collect(),
            duplicates: report
                .duplicates
                .iter()
                .map(|form| format!("{} - {}", form.english, form.swedish))
                .collect(),
            hint_added: report.hint_added,
            link_added: report.link_added,
        }
    }
}

/// Output format for the add command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOutput {
    /// Whether every group was processed.
    pub success: bool,
    /// Groups processed before any failure.
    pub groups: Vec<GroupResult>,
    /// Error message if adding failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl AddOutput {
    /// Create a successful output.
    pub fn success(groups: Vec<GroupResult>) -> Self {
        Self {
            success: true,
            groups,
            error: None,
            retryable: false,
        }
    }

    /// Create a failed output, keeping the groups already stored.
    pub fn failure(error: &VocabError, groups: Vec<GroupResult>) -> Self {
        Self {
            success: false,
            groups,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        let mut lines = Vec::new();

        for group in &self.groups {
            match group.word_group {
                Some(id) => lines.push(format!(
                    "Group {}: added {} word(s)",
                    id,
                    group.added.len()
                )),
                None => lines.push("Nothing added: every pair already exists".to_string()),
            }
            for duplicate in &group.duplicates {
                lines.push(format!("  Already exists: {}", duplicate));
            }
            if group.hint_added {
                lines.push("  Hint added".to_string());
            }
            if group.link_added {
                lines.push("  Wiktionary link added".to_string());
            }
        }

        if !self.success {
            lines.push(format!(
                "Add failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ));
        }

        lines.join("\n")
    }
}

/// The add command implementation.
pub struct AddCommand<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> AddCommand<S> {
    /// Create a new add command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the add command.
    pub fn run(&self, options: &AddOptions) -> AddOutput {
        match read_groups(&options.file) {
            Ok(groups) => self.add_all(&groups),
            Err(e) => AddOutput::failure(&e, Vec::new()),
        }
    }

    /// Store each group in order, stopping at the first failure.
    pub fn add_all(&self, groups: &[NewWordGroup]) -> AddOutput {
        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            match self.store.add_word_group(group) {
                Ok(report) => results.push(GroupResult::from(report)),
                Err(e) => return AddOutput::failure(&e, results),
            }
        }
        AddOutput::success(results)
    }
}

fn read_groups(path: &Path) -> Result<Vec<NewWordGroup>> {
    let content = read_to_string_limited(path)?;
    parse_groups(&content)
}
