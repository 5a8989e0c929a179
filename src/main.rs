//! glosor - adaptive Swedish/English vocabulary trainer
//!
//! CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, Utc};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use glosor::config::Config;
use glosor::core::{Category, CategoryKind, DirectionId, WordId};
use glosor::error::{exit_codes, VocabError};
use glosor::scheduler::Scheduler;
use glosor::storage::SqliteStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// glosor - adaptive Swedish/English vocabulary trainer
#[derive(Parser)]
#[command(name = "glosor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// [Practice] Pick the next question
    Next {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Seed for the tie-breaking shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// [Practice] Record the outcome of a question
    #[command(group(
        ArgGroup::new("outcome")
            .required(true)
            .args(["correct", "incorrect", "response"])
    ))]
    Answer {
        /// Word id from `glosor next`
        word_id: i64,
        /// Direction id from `glosor next`
        direction_id: i64,
        /// Mark the answer correct
        #[arg(long)]
        correct: bool,
        /// Mark the answer incorrect
        #[arg(long)]
        incorrect: bool,
        /// Check a typed response against the word
        #[arg(long, short)]
        response: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// [Review] Show all attempts for one pair
    History {
        word_id: i64,
        direction_id: i64,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// [Review] List pairs by current priority
    Rank {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Maximum number of pairs
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
    },

    /// [Review] Show answers today and this week against the targets
    Progress {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// [Review] Show accuracy and target history over all answers
    Stats {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Show mean scores per category
        #[arg(long, short)]
        detailed: bool,
    },

    /// [Authoring] Create config files and the database
    Init {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Overwrite an existing project config
        #[arg(long, short)]
        force: bool,
    },

    /// [Authoring] Add word groups from a TOML file
    Add {
        /// Authoring file
        file: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// [Authoring] List category tables or add a row
    Categories {
        /// Only this table
        #[arg(value_enum)]
        kind: Option<KindArg>,
        /// Label of a row to add
        #[arg(long, requires_all = ["kind", "id"])]
        add: Option<String>,
        /// Id of the row to add
        #[arg(long, requires = "add")]
        id: Option<i64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

/// Category table selector.
#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Grammar,
    Pos,
    Word,
    Direction,
}

impl From<KindArg> for CategoryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Grammar => CategoryKind::GrammarCategory,
            KindArg::Pos => CategoryKind::PartOfSpeech,
            KindArg::Word => CategoryKind::WordCategory,
            KindArg::Direction => CategoryKind::TranslationDirection,
        }
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GLOSOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("glosor error: {}", e);
            let code = e
                .downcast_ref::<VocabError>()
                .map_or(exit_codes::ERROR, VocabError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Next { json, quiet, seed } => run_next(json, quiet, seed),
        Commands::Answer {
            word_id,
            direction_id,
            correct,
            incorrect: _,
            response,
            json,
            quiet,
        } => run_answer(word_id, direction_id, correct, response, json, quiet),
        Commands::History {
            word_id,
            direction_id,
            json,
            quiet,
        } => run_history(word_id, direction_id, json, quiet),
        Commands::Rank { json, quiet, limit } => run_rank(json, quiet, limit),
        Commands::Progress { json, quiet } => run_progress(json, quiet),
        Commands::Stats {
            json,
            quiet,
            detailed,
        } => run_stats(json, quiet, detailed),
        Commands::Init { json, quiet, force } => run_init(json, quiet, force, &cwd),
        Commands::Add { file, json, quiet } => run_add(file, json, quiet),
        Commands::Categories {
            kind,
            add,
            id,
            json,
            quiet,
        } => run_categories(kind, add, id, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Open the configured database.
fn open_store(config: &Config) -> Result<SqliteStore, VocabError> {
    let path = config
        .store
        .database_path()
        .ok_or_else(|| VocabError::config("cannot determine database path: no home directory"))?;
    SqliteStore::open(&path, config.store.busy_timeout())
}

/// Convert a command outcome to an exit code.
fn outcome_to_exit_code(success: bool, retryable: bool) -> ExitCode {
    let code = match (success, retryable) {
        (true, _) => exit_codes::SUCCESS,
        (false, true) => exit_codes::TEMPFAIL,
        (false, false) => exit_codes::ERROR,
    };
    ExitCode::from(code as u8)
}

/// Print a command output as JSON or text.
fn print_output<T: Serialize>(
    output: &T,
    text: impl FnOnce() -> String,
    json: bool,
    quiet: bool,
) -> Result<(), serde_json::Error> {
    if !quiet {
        if json {
            println!("{}", serde_json::to_string_pretty(output)?);
        } else {
            println!("{}", text());
        }
    }
    Ok(())
}

fn run_next(
    json: bool,
    quiet: bool,
    seed: Option<u64>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::next::{NextCommand, NextOptions};

    let config = Config::load();
    let store = open_store(&config)?;
    let scheduler = Scheduler::new(store, config.scheduler)?;
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let cmd = NextCommand::new(scheduler);
    let options = NextOptions { json, quiet };
    let output = cmd.run(&options, Utc::now(), &mut rng);

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_answer(
    word_id: i64,
    direction_id: i64,
    correct: bool,
    response: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::answer::{AnswerCommand, AnswerOptions, Outcome};

    let config = Config::load();
    let store = open_store(&config)?;
    let scheduler = Scheduler::new(store, config.scheduler)?;

    let outcome = match response {
        Some(response) => Outcome::Response(response),
        None if correct => Outcome::Correct,
        None => Outcome::Incorrect,
    };
    let cmd = AnswerCommand::new(scheduler);
    let options = AnswerOptions {
        json,
        quiet,
        word_id: WordId(word_id),
        direction_id: DirectionId(direction_id),
        outcome,
    };
    let output = cmd.run(&options, Utc::now());

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_history(
    word_id: i64,
    direction_id: i64,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::history::{HistoryCommand, HistoryOptions};

    let config = Config::load();
    config.scheduler.validate()?;
    let store = open_store(&config)?;

    let cmd = HistoryCommand::new(store, config.scheduler);
    let options = HistoryOptions {
        json,
        quiet,
        word_id: WordId(word_id),
        direction_id: DirectionId(direction_id),
    };
    let output = cmd.run(&options, Utc::now());

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_rank(
    json: bool,
    quiet: bool,
    limit: usize,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::rank::{RankCommand, RankOptions};

    let config = Config::load();
    let store = open_store(&config)?;
    let scheduler = Scheduler::new(store, config.scheduler)?;

    let cmd = RankCommand::new(scheduler);
    let options = RankOptions { json, quiet, limit };
    let output = cmd.run(&options, Utc::now());

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_progress(json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::progress::{ProgressCommand, ProgressOptions};

    let config = Config::load();
    let store = open_store(&config)?;

    let cmd = ProgressCommand::new(store, config.progress);
    let options = ProgressOptions { json, quiet };
    let output = cmd.run(&options, &Local::now());

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_stats(
    json: bool,
    quiet: bool,
    detailed: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::stats::{StatsCommand, StatsOptions};

    let config = Config::load();
    let store = open_store(&config)?;

    let cmd = StatsCommand::new(store, config.progress);
    let options = StatsOptions {
        json,
        quiet,
        detailed,
    };
    let output = cmd.run(&options, &Local);

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_init(
    json: bool,
    quiet: bool,
    force: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::init::{InitCommand, InitOptions};

    let cmd = InitCommand::new(cwd.to_string_lossy().to_string());
    let options = InitOptions { json, quiet, force };
    let output = cmd.run(&options);

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_add(file: PathBuf, json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::add::{AddCommand, AddOptions};

    let config = Config::load();
    let store = open_store(&config)?;

    let cmd = AddCommand::new(store);
    let options = AddOptions { json, quiet, file };
    let output = cmd.run(&options);

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

fn run_categories(
    kind: Option<KindArg>,
    add: Option<String>,
    id: Option<i64>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use glosor::cli::categories::{CategoriesCommand, CategoriesOptions};

    let config = Config::load();
    let store = open_store(&config)?;

    let cmd = CategoriesCommand::new(store);
    let options = CategoriesOptions {
        json,
        quiet,
        kind: kind.map(CategoryKind::from),
        add: add.zip(id).map(|(label, id)| Category::new(id, label)),
    };
    let output = cmd.run(&options);

    print_output(&output, || output.format_text(), json, quiet)?;
    Ok(outcome_to_exit_code(output.success, output.retryable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_answer_requires_an_outcome() {
        assert!(Cli::try_parse_from(["glosor", "answer", "1", "2"]).is_err());
        assert!(Cli::try_parse_from(["glosor", "answer", "1", "2", "--correct"]).is_ok());
        assert!(
            Cli::try_parse_from(["glosor", "answer", "1", "2", "--correct", "--incorrect"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["glosor", "answer", "1", "2", "-r", "hus"]).is_ok());
    }

    #[test]
    fn test_categories_add_requires_kind_and_id() {
        assert!(Cli::try_parse_from(["glosor", "categories", "--add", "Music"]).is_err());
        assert!(
            Cli::try_parse_from(["glosor", "categories", "word", "--add", "Music", "--id", "14"])
                .is_ok()
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(outcome_to_exit_code(true, true), ExitCode::from(0));
        assert_eq!(outcome_to_exit_code(false, true), ExitCode::from(75));
        assert_eq!(outcome_to_exit_code(false, false), ExitCode::from(1));
    }
}
