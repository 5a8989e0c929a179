//! Init command for glosor.
//!
//! Scaffolds the configuration files and creates the vocabulary database
//! with its seeded category tables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::{glosor_home, project_config_path, Config};
use crate::storage::SqliteStore;

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Overwrite an existing project config.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether initialization was successful.
    pub success: bool,
    /// Files and directories created.
    pub created: Vec<String>,
    /// Files that already existed (skipped).
    pub skipped: Vec<String>,
    /// Error message if initialization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether trying again later may succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl InitOutput {
    /// Create a successful output.
    pub fn success(created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: true,
            created,
            skipped,
            error: None,
            retryable: false,
        }
    }

    /// Create a failed output with partial success information.
    ///
    /// Reports what was created before the failure so the user knows what
    /// partial state may have been left behind.
    pub fn failure(error: impl Into<String>, created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: false,
            created,
            skipped,
            error: Some(error.into()),
            retryable: false,
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        let mut lines = Vec::new();

        if !self.success {
            lines.push(format!(
                "Init failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ));

            if !self.created.is_empty() {
                lines.push(String::new());
                lines.push("Partially created before failure:".to_string());
                for path in &self.created {
                    lines.push(format!("  {}", path));
                }
            }

            if !self.skipped.is_empty() {
                lines.push(String::new());
                lines.push("Already existed (skipped):".to_string());
                for path in &self.skipped {
                    lines.push(format!("  {}", path));
                }
            }

            return lines.join("\n");
        }

        if self.created.is_empty() && self.skipped.is_empty() {
            return "glosor already initialized.".to_string();
        }

        if !self.created.is_empty() {
            lines.push("Created:".to_string());
            for path in &self.created {
                lines.push(format!("  {}", path));
            }
        }

        if !self.skipped.is_empty() {
            lines.push("Already exists (skipped):".to_string());
            for path in &self.skipped {
                lines.push(format!("  {}", path));
            }
        }

        lines.push(String::new());
        lines.push("glosor initialized successfully.".to_string());

        lines.join("\n")
    }
}

/// Default config.toml content.
const DEFAULT_CONFIG: &str = r#"# glosor configuration

# Vocabulary database. Defaults to ~/.glosor/vocabulary.db
[store]
# path = "vocabulary.db"
busy_timeout_ms = 5000

# Question selection
# decay_rate: weight kept per older answer, in (0, 1)
# boost_cap: largest staleness bonus, in [0, 1]
[scheduler]
decay_rate = 0.7
boost_cap = 0.5
boost_half_life_hours = 72.0
directions = [1, 2]
# Empty means every part of speech / word category
parts_of_speech = []
word_categories = []

# Answers per day and per week
[progress]
daily_target = 80
weekly_target = 560
"#;

/// The init command implementation.
pub struct InitCommand {
    cwd: String,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(cwd: impl Into<String>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let cwd = Path::new(&self.cwd);
        let mut created = Vec::new();
        let mut skipped = Vec::new();

        // Project .glosor directory and config
        let config_path = project_config_path(cwd);
        if let Some(project_dir) = config_path.parent() {
            match self.ensure_dir(project_dir) {
                Ok(true) => created.push(project_dir.display().to_string()),
                Ok(false) => skipped.push(project_dir.display().to_string()),
                Err(e) => return InitOutput::failure(e, created, skipped),
            }
        }

        match self.ensure_file(&config_path, DEFAULT_CONFIG, options.force) {
            Ok(true) => created.push(config_path.display().to_string()),
            Ok(false) => skipped.push(config_path.display().to_string()),
            Err(e) => return InitOutput::failure(e, created, skipped),
        }

        // User-level ~/.glosor directory
        if let Some(home) = glosor_home() {
            match self.ensure_dir(&home) {
                Ok(true) => created.push(home.display().to_string()),
                Ok(false) => skipped.push(home.display().to_string()),
                Err(e) => return InitOutput::failure(e, created, skipped),
            }
        }

        // Database, wherever the layered config puts it
        let config = Config::load_from_cwd(cwd);
        let Some(db_path) = config.store.database_path() else {
            return InitOutput::failure(
                "cannot determine database path: no home directory",
                created,
                skipped,
            );
        };
        let existed = db_path.exists();
        match SqliteStore::open(&db_path, config.store.busy_timeout()) {
            Ok(_) if existed => skipped.push(db_path.display().to_string()),
            Ok(_) => created.push(db_path.display().to_string()),
            Err(e) => {
                let mut output = InitOutput::failure(e.to_string(), created, skipped);
                output.retryable = e.is_retryable();
                return output;
            }
        }

        InitOutput::success(created, skipped)
    }

    /// Ensure a directory exists.
    /// Returns Ok(true) if created, Ok(false) if already exists.
    fn ensure_dir(&self, path: &Path) -> Result<bool, String> {
        if path.exists() {
            if path.is_dir() {
                return Ok(false);
            }
            return Err(format!("{} exists but is not a directory", path.display()));
        }

        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))?;

        Ok(true)
    }

    /// Ensure a file exists with the given content.
    /// Returns Ok(true) if created, Ok(false) if already exists.
    fn ensure_file(&self, path: &Path, content: &str, force: bool) -> Result<bool, String> {
        if path.exists() && !force {
            return Ok(false);
        }

        fs::write(path, content)
            .map_err(|e| format!("Failed to write file {}: {}", path.display(), e))?;

        Ok(true)
    }
}
