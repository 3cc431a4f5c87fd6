//! A single student's attempt at a quiz.
//!
//! The session owns everything about an attempt in flight: the drawn and
//! shuffled question list, the cursor, and the scored answers so far. It moves
//! `NotStarted -> InProgress -> Completed` and back to `NotStarted` on restart.

use std::fmt;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::grade::Grade;
use crate::model::{
    AttemptResult, Question, Quiz, QuizSettings, ScoredAnswer, Student, SubmittedAnswer,
};
use crate::scoring::{round2, score_answer};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::InProgress => write!(f, "in progress"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// What happened after an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The answer was scored and another question follows.
    Answered(ScoredAnswer),
    /// That was the last question; the attempt is finalized.
    Completed(AttemptResult),
}

/// An owned, short-lived attempt.
#[derive(Debug, Clone)]
pub struct QuizSession {
    attempt_id: Uuid,
    student: Student,
    quiz_id: String,
    settings: QuizSettings,
    questions: Vec<Question>,
    cursor: usize,
    answers: Vec<ScoredAnswer>,
    score: f64,
    state: SessionState,
    result: Option<AttemptResult>,
}

impl QuizSession {
    pub fn new(student: Student) -> Self {
        Self {
            attempt_id: Uuid::nil(),
            student,
            quiz_id: String::new(),
            settings: QuizSettings::default(),
            questions: Vec::new(),
            cursor: 0,
            answers: Vec::new(),
            score: 0.0,
            state: SessionState::NotStarted,
            result: None,
        }
    }

    /// Start the attempt using the thread-local RNG.
    pub fn start(&mut self, quiz: &Quiz, settings: &QuizSettings) -> Result<(), SessionError> {
        self.start_with_rng(quiz, settings, &mut rand::thread_rng())
    }

    /// Start the attempt, drawing and shuffling with `rng`.
    ///
    /// With `0 < questions_to_show < total` a uniform subset is drawn without
    /// replacement, keeping authoring order unless question shuffling is on.
    /// Option shuffling moves option strings, and answer keys hold strings, so
    /// correctness is unaffected by display order.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        quiz: &Quiz,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::InvalidState {
                operation: "start the quiz",
                state: self.state,
            });
        }
        if quiz.questions.is_empty() {
            return Err(SessionError::NoQuestions(quiz.id.clone()));
        }

        let total = quiz.questions.len();
        let draw = settings.questions_to_show;
        let mut questions: Vec<Question> = if draw > 0 && draw < total {
            let mut picked = rand::seq::index::sample(rng, total, draw).into_vec();
            picked.sort_unstable();
            picked
                .into_iter()
                .map(|i| quiz.questions[i].clone())
                .collect()
        } else {
            quiz.questions.clone()
        };

        if settings.shuffle_questions {
            questions.shuffle(rng);
        }
        if settings.shuffle_options {
            for question in &mut questions {
                if let Some(options) = question.key.options_mut() {
                    options.shuffle(rng);
                }
            }
        }

        self.attempt_id = Uuid::new_v4();
        self.quiz_id = quiz.id.clone();
        self.settings = *settings;
        self.questions = questions;
        self.cursor = 0;
        self.answers.clear();
        self.score = 0.0;
        self.result = None;
        self.state = SessionState::InProgress;

        tracing::debug!(
            attempt = %self.attempt_id,
            quiz = %self.quiz_id,
            presented = self.questions.len(),
            total,
            "attempt started"
        );
        Ok(())
    }

    /// Score the answer to the current question and advance.
    ///
    /// Empty selections, blank text, and answers of the wrong shape are
    /// rejected without touching the attempt.
    pub fn submit_current_answer(
        &mut self,
        answer: SubmittedAnswer,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.state != SessionState::InProgress {
            return Err(SessionError::InvalidState {
                operation: "submit an answer",
                state: self.state,
            });
        }
        let question = &self.questions[self.cursor];

        if answer.kind() != question.kind() {
            return Err(SessionError::AnswerKindMismatch {
                expected: question.kind(),
                found: answer.kind(),
            });
        }
        match &answer {
            SubmittedAnswer::Multiple(selection) if selection.is_empty() => {
                return Err(SessionError::EmptySelection);
            }
            SubmittedAnswer::Text(text) if text.trim().is_empty() => {
                return Err(SessionError::BlankAnswer);
            }
            _ => {}
        }

        let scored = score_answer(question, answer);
        self.score += scored.earned_points;
        self.answers.push(scored.clone());
        self.cursor += 1;

        if self.cursor < self.questions.len() {
            return Ok(SubmitOutcome::Answered(scored));
        }

        let result = self.finalize();
        Ok(SubmitOutcome::Completed(result))
    }

    fn finalize(&mut self) -> AttemptResult {
        let max_points = self.max_points();
        let score = round2(self.score);
        let percentage = if max_points == 0 {
            0.0
        } else {
            round2(score / max_points as f64 * 100.0)
        };

        let result = AttemptResult {
            attempt_id: self.attempt_id,
            quiz_id: self.quiz_id.clone(),
            student: self.student.clone(),
            score,
            total_questions: self.questions.len(),
            max_points,
            percentage,
            grade: Grade::from_percentage(percentage.clamp(0.0, 100.0)),
            timestamp: Utc::now(),
            answers: self.answers.clone(),
        };

        self.state = SessionState::Completed;
        self.result = Some(result.clone());
        result
    }

    /// Discard the attempt and return to `NotStarted`.
    ///
    /// Only permitted when the quiz allows retakes. Restarting a session that
    /// never started is a no-op.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::NotStarted {
            return Ok(());
        }
        if !self.settings.allow_retake {
            return Err(SessionError::RetakeNotAllowed(self.quiz_id.clone()));
        }

        let student = std::mem::replace(&mut self.student, Student::new("", "", ""));
        *self = QuizSession::new(student);
        Ok(())
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The question awaiting an answer, if the attempt is in progress.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress => self.questions.get(self.cursor),
            _ => None,
        }
    }

    /// Zero-based index of the current question and the number presented.
    pub fn position(&self) -> (usize, usize) {
        (self.cursor, self.questions.len())
    }

    /// The questions presented in this attempt, in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[ScoredAnswer] {
        &self.answers
    }

    /// Points earned so far.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Sum of the points of the presented questions.
    pub fn max_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    pub fn result(&self) -> Option<&AttemptResult> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::model::{AnswerKey, MatchPolicy};

    fn single(id: &str, points: u32, options: &[&str], answer: &str) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            key: AnswerKey::Single {
                options: options.iter().map(|s| s.to_string()).collect(),
                answer: answer.into(),
            },
            points,
            image: None,
        }
    }

    fn multiple(id: &str, points: u32, options: &[&str], answer: &[&str]) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            key: AnswerKey::Multiple {
                options: options.iter().map(|s| s.to_string()).collect(),
                answer: answer.iter().map(|s| s.to_string()).collect(),
            },
            points,
            image: None,
        }
    }

    fn text(id: &str, points: u32, answer: &[&str], policy: MatchPolicy) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            key: AnswerKey::Text {
                answer: answer.iter().map(|s| s.to_string()).collect(),
                policy,
            },
            points,
            image: None,
        }
    }

    fn quiz(questions: Vec<Question>) -> Quiz {
        Quiz {
            id: "geo".into(),
            name: "Geography".into(),
            questions,
        }
    }

    fn fixed_order() -> QuizSettings {
        QuizSettings {
            shuffle_questions: false,
            shuffle_options: false,
            ..QuizSettings::default()
        }
    }

    fn student() -> Student {
        Student::new("Anna Kovács", "anna@example.com", "9.A")
    }

    #[test]
    fn scenario_single_plus_partial_multiple() {
        let quiz = quiz(vec![
            single("s", 2, &["A", "B", "C"], "B"),
            multiple("m", 3, &["X", "Y", "Z"], &["X", "Y"]),
        ]);
        let mut session = QuizSession::new(student());
        session.start(&quiz, &fixed_order()).unwrap();
        assert_eq!(session.state(), SessionState::InProgress);

        let first = session
            .submit_current_answer(SubmittedAnswer::Single("B".into()))
            .unwrap();
        assert!(matches!(first, SubmitOutcome::Answered(ref a) if a.earned_points == 2.0));

        let SubmitOutcome::Completed(result) = session
            .submit_current_answer(SubmittedAnswer::selection(["X"]))
            .unwrap()
        else {
            panic!("expected the attempt to complete");
        };

        assert_eq!(result.score, 3.5);
        assert_eq!(result.max_points, 5);
        assert_eq!(result.percentage, 70.0);
        assert_eq!(result.grade, Grade::GOOD);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.answers.len(), 2);
        assert_eq!(result.student.email, "anna@example.com");
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.result(), Some(&result));
        assert!(session.current_question().is_none());
    }

    #[test]
    fn rejected_input_leaves_state_unchanged() {
        let quiz = quiz(vec![
            multiple("m", 2, &["X", "Y"], &["X"]),
            text("t", 1, &["Budapest"], MatchPolicy::Exact),
        ]);
        let mut session = QuizSession::new(student());
        session.start(&quiz, &fixed_order()).unwrap();

        let err = session
            .submit_current_answer(SubmittedAnswer::Multiple(BTreeSet::new()))
            .unwrap_err();
        assert!(matches!(err, SessionError::EmptySelection));
        let err = session
            .submit_current_answer(SubmittedAnswer::Text("X".into()))
            .unwrap_err();
        assert!(matches!(err, SessionError::AnswerKindMismatch { .. }));
        assert_eq!(session.position(), (0, 2));
        assert!(session.answers().is_empty());

        session
            .submit_current_answer(SubmittedAnswer::selection(["X"]))
            .unwrap();
        let err = session
            .submit_current_answer(SubmittedAnswer::Text("   \n".into()))
            .unwrap_err();
        assert!(matches!(err, SessionError::BlankAnswer));
        assert!(err.is_input_rejection());
        assert_eq!(session.position(), (1, 2));
        assert_eq!(session.score(), 2.0);
    }

    #[test]
    fn submit_requires_in_progress() {
        let mut session = QuizSession::new(student());
        let err = session
            .submit_current_answer(SubmittedAnswer::Single("A".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                state: SessionState::NotStarted,
                ..
            }
        ));
    }

    #[test]
    fn start_rejects_empty_quiz_and_double_start() {
        let mut session = QuizSession::new(student());
        assert!(matches!(
            session.start(&quiz(vec![]), &fixed_order()),
            Err(SessionError::NoQuestions(_))
        ));

        let quiz = quiz(vec![single("s", 1, &["A", "B"], "A")]);
        session.start(&quiz, &fixed_order()).unwrap();
        assert!(matches!(
            session.start(&quiz, &fixed_order()),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn subset_draws_distinct_questions_and_scales_max_points() {
        let questions: Vec<Question> = (1..=10)
            .map(|i| single(&format!("q{i}"), i, &["A", "B"], "A"))
            .collect();
        let quiz = quiz(questions);
        let settings = QuizSettings {
            questions_to_show: 4,
            ..QuizSettings::default()
        };

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = QuizSession::new(student());
            session.start_with_rng(&quiz, &settings, &mut rng).unwrap();

            let ids: HashSet<&str> = session.questions().iter().map(|q| q.id.as_str()).collect();
            assert_eq!(session.questions().len(), 4);
            assert_eq!(ids.len(), 4, "drawn questions must be distinct");
            assert!(session
                .questions()
                .iter()
                .all(|q| quiz.questions.iter().any(|o| o.id == q.id)));

            let expected: u32 = session.questions().iter().map(|q| q.points).sum();
            assert_eq!(session.max_points(), expected);

            while session.state() == SessionState::InProgress {
                session
                    .submit_current_answer(SubmittedAnswer::Single("A".into()))
                    .unwrap();
            }
            let result = session.result().unwrap();
            assert_eq!(result.max_points, expected);
            assert_eq!(result.percentage, 100.0);
        }
    }

    #[test]
    fn subset_without_shuffle_keeps_authoring_order() {
        let questions: Vec<Question> = (1..=8)
            .map(|i| single(&format!("q{i:02}"), 1, &["A", "B"], "A"))
            .collect();
        let quiz = quiz(questions);
        let settings = QuizSettings {
            questions_to_show: 5,
            ..fixed_order()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = QuizSession::new(student());
        session.start_with_rng(&quiz, &settings, &mut rng).unwrap();

        let ids: Vec<&str> = session.questions().iter().map(|q| q.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn subset_size_at_or_above_total_presents_everything() {
        let quiz = quiz(vec![
            single("a", 1, &["A", "B"], "A"),
            single("b", 1, &["A", "B"], "A"),
        ]);
        let settings = QuizSettings {
            questions_to_show: 2,
            ..fixed_order()
        };
        let mut session = QuizSession::new(student());
        session.start(&quiz, &settings).unwrap();
        assert_eq!(session.questions().len(), 2);
        assert_eq!(session.questions()[0].id, "a");
    }

    #[test]
    fn shuffled_options_keep_answer_keys_valid() {
        let quiz = quiz(vec![
            single("s", 1, &["A", "B", "C", "D"], "C"),
            multiple("m", 2, &["W", "X", "Y", "Z"], &["W", "Z"]),
        ]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = QuizSession::new(student());
            session
                .start_with_rng(&quiz, &QuizSettings::default(), &mut rng)
                .unwrap();

            for question in session.questions() {
                let mut options = question.options().to_vec();
                options.sort();
                let original = quiz.questions.iter().find(|q| q.id == question.id).unwrap();
                let mut expected = original.options().to_vec();
                expected.sort();
                assert_eq!(options, expected);
                assert_eq!(question.key.correct_answers(), original.key.correct_answers());
            }

            while let Some(question) = session.current_question() {
                let answer = match &question.key {
                    AnswerKey::Single { answer, .. } => SubmittedAnswer::Single(answer.clone()),
                    AnswerKey::Multiple { answer, .. } => SubmittedAnswer::Multiple(answer.clone()),
                    AnswerKey::Text { answer, .. } => SubmittedAnswer::Text(answer[0].clone()),
                };
                session.submit_current_answer(answer).unwrap();
            }
            assert_eq!(session.result().unwrap().percentage, 100.0);
        }
    }

    #[test]
    fn text_answers_record_normalized_form() {
        let quiz = quiz(vec![text("t", 2, &["29/5"], MatchPolicy::Number)]);
        let mut session = QuizSession::new(student());
        session.start(&quiz, &fixed_order()).unwrap();
        let SubmitOutcome::Completed(result) = session
            .submit_current_answer(SubmittedAnswer::Text("  5.8 ".into()))
            .unwrap()
        else {
            panic!("single question quiz should complete");
        };
        assert!(result.answers[0].is_correct);
        assert_eq!(result.answers[0].normalized_answer.as_deref(), Some("5.8"));
        assert_eq!(result.grade, Grade::EXCELLENT);
    }

    #[test]
    fn restart_respects_retake_policy() {
        let quiz = quiz(vec![single("s", 1, &["A", "B"], "A")]);

        let mut session = QuizSession::new(student());
        session.start(&quiz, &fixed_order()).unwrap();
        session
            .submit_current_answer(SubmittedAnswer::Single("B".into()))
            .unwrap();
        let first_attempt = session.attempt_id();
        session.restart().unwrap();
        assert_eq!(session.state(), SessionState::NotStarted);
        assert!(session.result().is_none());
        assert_eq!(session.student().name, "Anna Kovács");

        session.start(&quiz, &fixed_order()).unwrap();
        assert_ne!(session.attempt_id(), first_attempt);

        let no_retake = QuizSettings {
            allow_retake: false,
            ..fixed_order()
        };
        let mut locked = QuizSession::new(student());
        locked.start(&quiz, &no_retake).unwrap();
        locked
            .submit_current_answer(SubmittedAnswer::Single("A".into()))
            .unwrap();
        assert!(matches!(
            locked.restart(),
            Err(SessionError::RetakeNotAllowed(_))
        ));
        assert_eq!(locked.state(), SessionState::Completed);
    }
}
