//! Point computation for single, multiple, and text questions.
//!
//! Every function here is pure and total: a wrong or malformed answer scores
//! zero, it never fails.

use std::collections::BTreeSet;

use crate::evaluate::is_text_correct;
use crate::model::{AnswerKey, MatchPolicy, Question, ScoredAnswer, SubmittedAnswer};
use crate::text::normalize;

/// Round to two decimal places, exact ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Full points if the chosen option is exactly the key, else zero.
///
/// Options are compared verbatim: the presentation layer hands back the option
/// string it displayed. An empty key never matches.
pub fn score_single(submitted: &str, key: &str, points: u32) -> f64 {
    if !key.is_empty() && submitted == key {
        points as f64
    } else {
        0.0
    }
}

/// Partial credit for a multiple-choice selection.
///
/// Each wrong selection cancels one right one, floored at zero:
/// `round2(max(0, |S ∩ K| - |S \ K|) * points / |K|)`. Since `|S ∩ K| <= |K|`
/// the result never exceeds `points`. An empty key scores zero; such quizzes
/// are rejected by validation before they can be taken.
pub fn score_multiple(submitted: &BTreeSet<String>, key: &BTreeSet<String>, points: u32) -> f64 {
    if key.is_empty() {
        return 0.0;
    }
    let correct = submitted.intersection(key).count();
    let incorrect = submitted.difference(key).count();
    let credited = correct.saturating_sub(incorrect);
    round2(credited as f64 * (points as f64 / key.len() as f64))
}

/// Full points if the text matches an accepted form under `policy`.
pub fn score_text<S: AsRef<str>>(
    submitted: &str,
    accepted: &[S],
    policy: MatchPolicy,
    points: u32,
) -> f64 {
    if is_text_correct(submitted, accepted, policy) {
        points as f64
    } else {
        0.0
    }
}

/// Score a submission against an answer key.
///
/// A submission of the wrong shape for the key scores zero.
pub fn score(submitted: &SubmittedAnswer, key: &AnswerKey, points: u32) -> f64 {
    match (key, submitted) {
        (AnswerKey::Single { answer, .. }, SubmittedAnswer::Single(choice)) => {
            score_single(choice, answer, points)
        }
        (AnswerKey::Multiple { answer, .. }, SubmittedAnswer::Multiple(selection)) => {
            score_multiple(selection, answer, points)
        }
        (AnswerKey::Text { answer, policy }, SubmittedAnswer::Text(text)) => {
            score_text(text, answer, *policy, points)
        }
        _ => 0.0,
    }
}

/// Score a submission and package it with a snapshot of the question.
pub fn score_answer(question: &Question, submitted: SubmittedAnswer) -> ScoredAnswer {
    let earned_points = score(&submitted, &question.key, question.points);
    let normalized_answer = match &submitted {
        SubmittedAnswer::Text(text) => Some(normalize(text)),
        _ => None,
    };

    ScoredAnswer {
        question: question.clone(),
        submitted,
        earned_points,
        max_points: question.points,
        is_correct: (earned_points - question.points as f64).abs() < 1e-9,
        normalized_answer,
    }
}
