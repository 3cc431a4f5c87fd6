//! Command-line interface for quizmark.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

use commands::FilterArgs;

#[derive(Parser)]
#[command(name = "quizmark", version, about = "Classroom quiz scoring engine")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and a sample quiz
    Init,

    /// Validate quiz JSON files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Add a quiz file to the store, refusing invalid quizzes
    Import {
        /// Quiz JSON file
        #[arg(long)]
        file: PathBuf,

        /// Display name; the quiz id is derived from it
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing quiz with the same id
        #[arg(long)]
        replace: bool,
    },

    /// List stored quizzes
    List {
        /// Only quizzes visible to students
        #[arg(long)]
        students: bool,
    },

    /// Show or change the settings of a quiz
    Settings {
        #[arg(long)]
        quiz_id: String,

        /// Whether students can see and take the quiz
        #[arg(long)]
        visible: Option<bool>,

        /// Allow students to retake the quiz
        #[arg(long)]
        allow_retake: Option<bool>,

        /// Reveal correct answers after an attempt
        #[arg(long)]
        show_correct: Option<bool>,

        /// Shuffle question and option order
        #[arg(long)]
        shuffle: Option<bool>,

        /// Number of questions to draw per attempt (0 = all)
        #[arg(long)]
        questions_to_show: Option<usize>,

        /// Make this the active quiz
        #[arg(long)]
        activate: bool,
    },

    /// Take a quiz interactively on stdin
    Take {
        /// Quiz to take (defaults to the active quiz)
        #[arg(long)]
        quiz_id: Option<String>,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        class: String,

        /// Allow quizzes hidden from students
        #[arg(long)]
        preview: bool,
    },

    /// Show results of a quiz
    Results {
        #[arg(long)]
        quiz_id: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the JSON report to this file instead of printing
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Review one stored attempt
    Show {
        #[arg(long)]
        quiz_id: String,

        /// Attempt id
        #[arg(long)]
        attempt: Uuid,
    },

    /// Export results as CSV
    Export {
        #[arg(long)]
        quiz_id: String,

        /// Output CSV file
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizmark=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(config).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Import {
            file,
            name,
            replace,
        } => commands::import::execute(file, name, replace, config).await,
        Commands::List { students } => commands::list::execute(students, config).await,
        Commands::Settings {
            quiz_id,
            visible,
            allow_retake,
            show_correct,
            shuffle,
            questions_to_show,
            activate,
        } => {
            let changes = commands::settings::SettingsChanges {
                visible,
                allow_retake,
                show_correct,
                shuffle,
                questions_to_show,
                activate,
            };
            commands::settings::execute(quiz_id, changes, config).await
        }
        Commands::Take {
            quiz_id,
            name,
            email,
            class,
            preview,
        } => commands::take::execute(quiz_id, name, email, class, preview, config).await,
        Commands::Results {
            quiz_id,
            filter,
            format,
            output,
        } => commands::results::execute(quiz_id, filter.into(), format, output, config).await,
        Commands::Show { quiz_id, attempt } => {
            commands::show::execute(quiz_id, attempt, config).await
        }
        Commands::Export {
            quiz_id,
            output,
            filter,
        } => commands::export::execute(quiz_id, output, filter.into(), config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
