//! Categories command for glosor.
//!
//! Lists the category tables and adds new rows to them.

use serde::{Deserialize, Serialize};

use crate::core::{Category, CategoryKind};
use crate::error::{Result, VocabError};
use crate::storage::VocabularyStore;

/// Options for the categories command.
#[derive(Debug, Clone, Default)]
pub struct CategoriesOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Only this table. All tables when `None`.
    pub kind: Option<CategoryKind>,
    /// Row to add before listing. Requires `kind`.
    pub add: Option<Category>,
}

/// One listed table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTable {
    pub kind: CategoryKind,
    pub rows: Vec<Category>,
}

/// Output format for the categories command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub tables: Vec<CategoryTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<Category>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl CategoriesOutput {
    /// Create a failed output.
    pub fn failure(error: &VocabError) -> Self {
        Self {
            success: false,
            tables: Vec::new(),
            added: None,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Categories failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        if let Some(added) = &self.added {
            lines.push(format!("Added {}: {}", added.id, added.label));
            lines.push(String::new());
        }

        for (i, table) in self.tables.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.push(format!("{}:", table.kind));
            for row in &table.rows {
                lines.push(format!("  {:>3}  {}", row.id, row.label));
            }
        }

        lines.join("\n")
    }
}

/// The categories command implementation.
pub struct CategoriesCommand<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> CategoriesCommand<S> {
    /// Create a new categories command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the categories command.
    pub fn run(&self, options: &CategoriesOptions) -> CategoriesOutput {
        self.execute(options)
            .unwrap_or_else(|e| CategoriesOutput::failure(&e))
    }

    fn execute(&self, options: &CategoriesOptions) -> Result<CategoriesOutput> {
        let added = match (&options.add, options.kind) {
            (Some(category), Some(kind)) => {
                self.store.add_category(kind, category)?;
                Some(category.clone())
            }
            (Some(_), None) => {
                return Err(VocabError::validation(
                    "a category table is required when adding a row",
                ))
            }
            (None, _) => None,
        };

        let kinds = match options.kind {
            Some(kind) => vec![kind],
            None => CategoryKind::ALL.to_vec(),
        };
        let tables = kinds
            .into_iter()
            .map(|kind| {
                Ok(CategoryTable {
                    kind,
                    rows: self.store.categories(kind)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CategoriesOutput {
            success: true,
            tables,
            added,
            error: None,
            retryable: false,
        })
    }
}
