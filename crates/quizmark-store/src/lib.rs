//! File-backed storage for quizmark.
//!
//! Implements `QuizRepository` over a directory of JSON quiz files plus a
//! shared settings file, and `ResultStore` as one append-only JSON-lines log
//! per quiz.

pub mod config;
pub mod quizzes;
pub mod results;

pub use config::{load_config_from, open_store, QuizmarkConfig, Store};
pub use quizzes::FsQuizRepository;
pub use results::FsResultStore;
