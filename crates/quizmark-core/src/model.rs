//! Core data model types for quizmark.
//!
//! These are the fundamental types the whole system uses to represent
//! quizzes, answer keys, submissions, and finished attempts.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grade::Grade;

/// The three supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multiple,
    Text,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Single => write!(f, "single"),
            QuestionKind::Multiple => write!(f, "multiple"),
            QuestionKind::Text => write!(f, "text"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(QuestionKind::Single),
            "multiple" | "multi" => Ok(QuestionKind::Multiple),
            "text" => Ok(QuestionKind::Text),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

impl QuestionKind {
    /// Human-readable label used in reviews and listings.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Single => "Single choice",
            QuestionKind::Multiple => "Multiple choice",
            QuestionKind::Text => "Text answer",
        }
    }
}

/// How a free-text answer is compared against the accepted forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    #[default]
    Exact,
    Contains,
    Number,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Exact => write!(f, "exact"),
            MatchPolicy::Contains => write!(f, "contains"),
            MatchPolicy::Number => write!(f, "number"),
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "exact" => Ok(MatchPolicy::Exact),
            "contains" => Ok(MatchPolicy::Contains),
            "number" | "numeric" => Ok(MatchPolicy::Number),
            other => Err(format!("unknown match type: {other}")),
        }
    }
}

impl MatchPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            MatchPolicy::Exact => "Exact match",
            MatchPolicy::Contains => "Contains",
            MatchPolicy::Number => "Numeric value",
        }
    }
}

/// The answer key of a question, tagged by question type.
///
/// Serialized flattened into [`Question`], so a stored question reads
/// `{"type": "single", "options": [...], "answer": "B", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnswerKey {
    /// Exactly one option is correct.
    Single {
        options: Vec<String>,
        answer: String,
    },
    /// A non-empty subset of the options is correct.
    Multiple {
        options: Vec<String>,
        answer: BTreeSet<String>,
    },
    /// Free text compared against one or more accepted forms.
    Text {
        answer: Vec<String>,
        #[serde(default, rename = "match_type")]
        policy: MatchPolicy,
    },
}

impl AnswerKey {
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerKey::Single { .. } => QuestionKind::Single,
            AnswerKey::Multiple { .. } => QuestionKind::Multiple,
            AnswerKey::Text { .. } => QuestionKind::Text,
        }
    }

    /// The displayed options; empty for text questions.
    pub fn options(&self) -> &[String] {
        match self {
            AnswerKey::Single { options, .. } | AnswerKey::Multiple { options, .. } => options,
            AnswerKey::Text { .. } => &[],
        }
    }

    pub(crate) fn options_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            AnswerKey::Single { options, .. } | AnswerKey::Multiple { options, .. } => {
                Some(options)
            }
            AnswerKey::Text { .. } => None,
        }
    }

    /// The correct answer(s), in display order.
    pub fn correct_answers(&self) -> Vec<String> {
        match self {
            AnswerKey::Single { answer, .. } => vec![answer.clone()],
            AnswerKey::Multiple { answer, .. } => answer.iter().cloned().collect(),
            AnswerKey::Text { answer, .. } => answer.clone(),
        }
    }

    /// The match policy for text questions.
    pub fn policy(&self) -> Option<MatchPolicy> {
        match self {
            AnswerKey::Text { policy, .. } => Some(*policy),
            _ => None,
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its quiz.
    pub id: String,
    /// The question prompt.
    #[serde(rename = "question")]
    pub text: String,
    /// Type, options, and answer key.
    #[serde(flatten)]
    pub key: AnswerKey,
    /// Points awarded for a fully correct answer.
    pub points: u32,
    /// Optional image file name shown with the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        self.key.kind()
    }

    pub fn options(&self) -> &[String] {
        self.key.options()
    }
}

/// An ordered collection of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier (also the storage file stem).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The questions in authoring order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Sum of the points of every question.
    pub fn max_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// Per-quiz presentation settings chosen by the instructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Reveal the correct answers in the post-attempt review.
    #[serde(default = "default_true")]
    pub show_correct_answers: bool,
    /// Allow a student to start over after finishing.
    #[serde(default = "default_true")]
    pub allow_retake: bool,
    /// Randomize question order.
    #[serde(default = "default_true")]
    pub shuffle_questions: bool,
    /// Randomize option order within each choice question.
    #[serde(default = "default_true")]
    pub shuffle_options: bool,
    /// Number of questions to draw at random; 0 presents all of them.
    #[serde(default)]
    pub questions_to_show: usize,
    /// Whether students can see and take the quiz.
    #[serde(default)]
    pub visible_to_students: bool,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            show_correct_answers: true,
            allow_retake: true,
            shuffle_questions: true,
            shuffle_options: true,
            questions_to_show: 0,
            visible_to_students: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Listing entry for a stored quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
    pub visible: bool,
}

/// The student taking an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "student_name")]
    pub name: String,
    #[serde(rename = "student_email")]
    pub email: String,
    #[serde(rename = "class", default)]
    pub class_name: String,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            class_name: class_name.into(),
        }
    }

    /// Case-insensitive identity key derived from the email address.
    pub fn key(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// A learner's raw input for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmittedAnswer {
    /// The chosen option of a single-choice question.
    Single(String),
    /// The selected options of a multiple-choice question.
    Multiple(BTreeSet<String>),
    /// Free text.
    Text(String),
}

impl SubmittedAnswer {
    /// Build a multiple-choice selection from any iterator of option strings.
    pub fn selection<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SubmittedAnswer::Multiple(options.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            SubmittedAnswer::Single(_) => QuestionKind::Single,
            SubmittedAnswer::Multiple(_) => QuestionKind::Multiple,
            SubmittedAnswer::Text(_) => QuestionKind::Text,
        }
    }
}

impl fmt::Display for SubmittedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmittedAnswer::Single(s) | SubmittedAnswer::Text(s) => write!(f, "{s}"),
            SubmittedAnswer::Multiple(set) => {
                let joined = set.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
                write!(f, "{joined}")
            }
        }
    }
}

/// The outcome of scoring one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    /// Snapshot of the question as presented (options in displayed order).
    pub question: Question,
    /// What the student submitted.
    pub submitted: SubmittedAnswer,
    /// Points earned, in `[0, max_points]`.
    pub earned_points: f64,
    /// Points available for the question.
    pub max_points: u32,
    /// Whether the full points were earned.
    pub is_correct: bool,
    /// Normalized form of a text answer, as compared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_answer: Option<String>,
}

impl ScoredAnswer {
    /// Some but not all points were earned.
    pub fn is_partial(&self) -> bool {
        !self.is_correct && self.earned_points > 0.0
    }
}

/// A completed, scored attempt. Append-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Unique attempt identifier.
    pub attempt_id: Uuid,
    /// The quiz that was taken.
    pub quiz_id: String,
    /// Who took it.
    #[serde(flatten)]
    pub student: Student,
    /// Sum of earned points.
    pub score: f64,
    /// Number of questions presented.
    pub total_questions: usize,
    /// Sum of points of the presented questions.
    pub max_points: u32,
    /// `100 * score / max_points`, rounded to two decimals.
    pub percentage: f64,
    pub grade: Grade,
    /// When the attempt was finalized.
    pub timestamp: DateTime<Utc>,
    /// Per-question detail in presentation order.
    pub answers: Vec<ScoredAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_policy_display_and_parse() {
        assert_eq!(QuestionKind::Multiple.to_string(), "multiple");
        assert_eq!("Single".parse::<QuestionKind>().unwrap(), QuestionKind::Single);
        assert!("essay".parse::<QuestionKind>().is_err());
        assert_eq!("".parse::<MatchPolicy>().unwrap(), MatchPolicy::Exact);
        assert_eq!("NUMBER".parse::<MatchPolicy>().unwrap(), MatchPolicy::Number);
        assert!("fuzzy".parse::<MatchPolicy>().is_err());
    }

    #[test]
    fn settings_defaults_apply_to_missing_fields() {
        let settings: QuizSettings = serde_json::from_str(r#"{"questions_to_show": 3}"#).unwrap();
        assert!(settings.show_correct_answers);
        assert!(settings.allow_retake);
        assert!(settings.shuffle_questions);
        assert!(!settings.visible_to_students);
        assert_eq!(settings.questions_to_show, 3);
    }

    #[test]
    fn question_serializes_flat() {
        let q = Question {
            id: "q1".into(),
            text: "Capital of Hungary?".into(),
            key: AnswerKey::Single {
                options: vec!["Budapest".into(), "Vienna".into()],
                answer: "Budapest".into(),
            },
            points: 2,
            image: None,
        };
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "single");
        assert_eq!(value["question"], "Capital of Hungary?");
        assert_eq!(value["answer"], "Budapest");
        assert!(value.get("image").is_none());

        let back: Question = serde_json::from_value(value).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn text_key_defaults_to_exact() {
        let q: Question = serde_json::from_str(
            r#"{"id":"t","question":"2+2","type":"text","answer":["4"],"points":1}"#,
        )
        .unwrap();
        assert_eq!(q.key.policy(), Some(MatchPolicy::Exact));
        assert!(q.options().is_empty());
    }

    #[test]
    fn submitted_answer_display() {
        let answer = SubmittedAnswer::selection(["Y", "X"]);
        assert_eq!(answer.to_string(), "X, Y");
        assert_eq!(answer.kind(), QuestionKind::Multiple);
    }
}
