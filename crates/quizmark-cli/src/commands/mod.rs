//! Subcommand implementations.

pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod results;
pub mod settings;
pub mod show;
pub mod take;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use quizmark_core::grade::Grade;
use quizmark_core::model::AttemptResult;
use quizmark_core::statistics::ResultFilter;
use quizmark_core::traits::{QuizRepository, ResultStore};
use quizmark_store::{load_config_from, open_store, QuizmarkConfig, Store};

/// Result filters shared by `results` and `export`.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Only this class
    #[arg(long)]
    pub class: Option<String>,

    /// Only this grade (1-5)
    #[arg(long)]
    pub grade: Option<Grade>,

    /// Earliest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl From<FilterArgs> for ResultFilter {
    fn from(args: FilterArgs) -> Self {
        ResultFilter {
            class_name: args.class,
            grade: args.grade,
            from: args.from,
            to: args.to,
        }
    }
}

/// Load the configuration and open the file-backed store.
pub fn open(config_path: Option<PathBuf>) -> Result<(QuizmarkConfig, Store)> {
    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config);
    Ok((config, store))
}

/// Fail unless the quiz exists.
pub async fn require_quiz(store: &Store, quiz_id: &str) -> Result<()> {
    if store.quizzes.load_quiz(quiz_id).await?.is_none() {
        anyhow::bail!("no such quiz: {quiz_id}");
    }
    Ok(())
}

/// All stored results of a quiz.
pub async fn load_results(store: &Store, quiz_id: &str) -> Result<Vec<AttemptResult>> {
    require_quiz(store, quiz_id).await?;
    store.results.load_results(quiz_id).await
}
