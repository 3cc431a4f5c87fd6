//! Quiz model, scoring, and attempt sessions.
//!
//! This crate defines the data model, the pure scoring pipeline (text
//! normalization, numeric parsing, answer evaluation, point computation, and
//! grading), the attempt session state machine, and the collaborator traits
//! the rest of quizmark builds on.

pub mod engine;
pub mod error;
pub mod evaluate;
pub mod grade;
pub mod memory;
pub mod model;
pub mod parser;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod text;
pub mod traits;

pub use error::{EngineError, QuizError, SessionError};
pub use grade::{grade, Grade};
pub use session::{QuizSession, SessionState, SubmitOutcome};
