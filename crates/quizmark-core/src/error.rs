//! Error types for quiz authoring, attempt sessions, and orchestration.
//!
//! A wrong answer is never an error: scoring, evaluation, and numeric parsing
//! report wrongness as values. The types here cover input the student can fix,
//! malformed quiz data, and collaborator failures.

use thiserror::Error;
use uuid::Uuid;

use crate::model::{AttemptResult, QuestionKind};
use crate::parser::ValidationIssue;
use crate::session::SessionState;

/// Errors raised when a quiz definition cannot be accepted.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The quiz failed authoring-time validation.
    #[error("quiz '{quiz_id}' is invalid: {}", summarize(.issues))]
    Invalid {
        quiz_id: String,
        issues: Vec<ValidationIssue>,
    },

    /// A question record could not be interpreted.
    #[error("question {index} of quiz '{quiz_id}': {message}")]
    MalformedQuestion {
        quiz_id: String,
        index: usize,
        message: String,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by a quiz session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A multiple-choice submission selected nothing.
    #[error("select at least one option")]
    EmptySelection,

    /// A text submission was empty or whitespace only.
    #[error("an answer is required")]
    BlankAnswer,

    /// The submitted answer does not fit the current question type.
    #[error("expected a {expected} answer, got a {found} answer")]
    AnswerKindMismatch {
        expected: QuestionKind,
        found: QuestionKind,
    },

    /// The operation is not valid in the session's current state.
    #[error("cannot {operation} while the attempt is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The quiz has no questions to present.
    #[error("quiz '{0}' has no questions")]
    NoQuestions(String),

    /// The quiz settings do not allow another attempt.
    #[error("retakes are not allowed for quiz '{0}'")]
    RetakeNotAllowed(String),
}

impl SessionError {
    /// Returns `true` for rejections the student can fix by re-answering.
    ///
    /// These leave the attempt untouched and are not logged as errors.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            SessionError::EmptySelection
                | SessionError::BlankAnswer
                | SessionError::AnswerKindMismatch { .. }
        )
    }
}

/// Errors raised by the attempt orchestrator.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no such quiz: {0}")]
    QuizNotFound(String),

    #[error("quiz '{0}' is not visible to students")]
    QuizNotVisible(String),

    #[error(transparent)]
    InvalidQuiz(#[from] QuizError),

    #[error("unknown attempt: {0}")]
    UnknownAttempt(Uuid),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The attempt finished but its result could not be stored.
    ///
    /// The computed result travels with the error so it can be retried or
    /// recorded elsewhere.
    #[error("attempt {} finished but its result could not be stored: {source:#}", .result.attempt_id)]
    Persist {
        result: Box<AttemptResult>,
        #[source]
        source: anyhow::Error,
    },

    /// A collaborator failed while loading data.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    /// Returns `true` if the error is an input rejection from the session.
    pub fn is_input_rejection(&self) -> bool {
        matches!(self, EngineError::Session(e) if e.is_input_rejection())
    }

    /// The computed result of an attempt whose persistence failed.
    pub fn unsaved_result(&self) -> Option<&AttemptResult> {
        match self {
            EngineError::Persist { result, .. } => Some(result),
            _ => None,
        }
    }
}
