//! JSON quiz parser and validator.
//!
//! Loads quizzes from JSON files and directories, normalizes the legacy answer
//! shapes into [`AnswerKey`], and checks quizzes for authoring mistakes.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::QuizError;
use crate::model::{AnswerKey, MatchPolicy, Question, QuestionKind, Quiz};
use crate::text::parse_number;

/// Object layout of a quiz file.
#[derive(Debug, Deserialize)]
struct JsonQuizDocument {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    questions: Vec<serde_json::Value>,
}

/// One question record as authored.
#[derive(Debug, Deserialize)]
struct JsonQuestion {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    question: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: JsonAnswer,
    #[serde(default = "default_points")]
    points: u32,
    #[serde(default)]
    match_type: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    quiz_name: Option<String>,
}

/// Answer keys appear both as a bare string and as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonAnswer {
    One(String),
    Many(Vec<String>),
}

impl Default for JsonAnswer {
    fn default() -> Self {
        JsonAnswer::Many(Vec::new())
    }
}

impl JsonAnswer {
    fn into_vec(self) -> Vec<String> {
        match self {
            JsonAnswer::One(s) => vec![s],
            JsonAnswer::Many(v) => v,
        }
    }
}

fn default_points() -> u32 {
    1
}

/// Parse a quiz file. The file stem is the quiz id unless the file names one.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;
    let quiz_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    parse_quiz_str(&content, &quiz_id)
        .with_context(|| format!("failed to parse quiz: {}", path.display()))
}

/// Parse quiz JSON, using `quiz_id` when the content carries no id.
pub fn parse_quiz_str(content: &str, quiz_id: &str) -> Result<Quiz> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("quiz file is not valid JSON")?;

    let (id, name, records) = match value {
        serde_json::Value::Array(records) => (None, None, records),
        serde_json::Value::Object(_) => {
            let doc: JsonQuizDocument =
                serde_json::from_value(value).context("invalid quiz document")?;
            (doc.id, doc.name, doc.questions)
        }
        _ => anyhow::bail!("expected a list of questions or a quiz object"),
    };

    let id = id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| quiz_id.to_string());

    let mut legacy_name = None;
    let mut questions = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let raw: JsonQuestion =
            serde_json::from_value(record).map_err(|e| QuizError::MalformedQuestion {
                quiz_id: id.clone(),
                index: index + 1,
                message: e.to_string(),
            })?;
        if legacy_name.is_none() {
            legacy_name = raw.quiz_name.clone().filter(|n| !n.trim().is_empty());
        }
        let question = convert_question(raw, index).map_err(|message| {
            QuizError::MalformedQuestion {
                quiz_id: id.clone(),
                index: index + 1,
                message,
            }
        })?;
        questions.push(question);
    }

    let name = name
        .or(legacy_name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| display_name_from_id(&id));

    Ok(Quiz {
        id,
        name,
        questions,
    })
}

fn convert_question(raw: JsonQuestion, index: usize) -> Result<Question, String> {
    let kind: QuestionKind = raw.kind.parse()?;
    let answers = raw.answer.into_vec();

    let key = match kind {
        QuestionKind::Single => AnswerKey::Single {
            options: raw.options,
            answer: answers.into_iter().next().unwrap_or_default(),
        },
        QuestionKind::Multiple => AnswerKey::Multiple {
            options: raw.options,
            answer: answers.into_iter().collect(),
        },
        QuestionKind::Text => {
            if !raw.options.is_empty() {
                tracing::warn!(question = index + 1, "options on a text question are ignored");
            }
            let policy: MatchPolicy = raw.match_type.as_deref().unwrap_or_default().parse()?;
            AnswerKey::Text {
                answer: answers
                    .into_iter()
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect(),
                policy,
            }
        }
    };

    Ok(Question {
        id: raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("q{}", index + 1)),
        text: raw.question,
        key,
        points: raw.points,
        image: raw.image.filter(|i| !i.trim().is_empty()),
    })
}

/// Recursively load every `.json` quiz in a directory.
///
/// Files that fail to parse are skipped with a warning. The result is sorted
/// by quiz id.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    quizzes.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(quizzes)
}

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Suspicious but takeable.
    Warning,
    /// The quiz cannot be scored correctly.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A finding from quiz validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The question id, for question-level findings.
    pub question_id: Option<String>,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(question_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            question_id: question_id.map(str::to_string),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(question_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            question_id: question_id.map(str::to_string),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.question_id {
            Some(id) => write!(f, "{} ({id}): {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Check a quiz for authoring mistakes.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if quiz.questions.is_empty() {
        issues.push(ValidationIssue::error(None, "quiz has no questions"));
    }

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        let id = Some(question.id.as_str());

        if !seen_ids.insert(question.id.as_str()) {
            issues.push(ValidationIssue::warning(
                id,
                format!("duplicate question ID: {}", question.id),
            ));
        }
        if question.text.trim().is_empty() {
            issues.push(ValidationIssue::warning(id, "question text is empty"));
        }
        if question.points == 0 {
            issues.push(ValidationIssue::error(id, "question is worth zero points"));
        }

        match &question.key {
            AnswerKey::Single { options, answer } => {
                check_options(id, options, &mut issues);
                if !options.contains(answer) {
                    issues.push(ValidationIssue::error(
                        id,
                        format!("answer '{answer}' is not one of the options"),
                    ));
                }
            }
            AnswerKey::Multiple { options, answer } => {
                check_options(id, options, &mut issues);
                if answer.is_empty() {
                    issues.push(ValidationIssue::error(id, "no correct options are marked"));
                }
                let stray: Vec<&str> = answer
                    .iter()
                    .filter(|a| !options.contains(a))
                    .map(String::as_str)
                    .collect();
                if !stray.is_empty() {
                    issues.push(ValidationIssue::error(
                        id,
                        format!("answers not among the options: {}", stray.join(", ")),
                    ));
                }
            }
            AnswerKey::Text { answer, policy } => {
                if answer.is_empty() {
                    issues.push(ValidationIssue::error(id, "no accepted answers"));
                } else if *policy == MatchPolicy::Number
                    && answer.iter().all(|a| parse_number(a).is_none())
                {
                    issues.push(ValidationIssue::error(
                        id,
                        "numeric match but no accepted answer is a number",
                    ));
                }
            }
        }
    }

    issues
}

fn check_options(id: Option<&str>, options: &[String], issues: &mut Vec<ValidationIssue>) {
    if options.len() < 2 {
        issues.push(ValidationIssue::error(
            id,
            "choice question needs at least two options",
        ));
    }
    let distinct: BTreeSet<&String> = options.iter().collect();
    if distinct.len() != options.len() {
        issues.push(ValidationIssue::warning(id, "duplicate options"));
    }
}

/// Fail if validation finds any error-severity issue.
pub fn ensure_valid(quiz: &Quiz) -> Result<(), QuizError> {
    let errors: Vec<ValidationIssue> = validate_quiz(quiz)
        .into_iter()
        .filter(ValidationIssue::is_error)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(QuizError::Invalid {
            quiz_id: quiz.id.clone(),
            issues: errors,
        })
    }
}

/// Derive a storage id from a display name: lowercase, spaces to underscores.
pub fn quiz_id_from_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Title-case an id for display: `magyar_foldrajz` becomes `Magyar Foldrajz`.
pub fn display_name_from_id(id: &str) -> String {
    id.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
