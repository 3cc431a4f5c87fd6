//! Text answer evaluation under a match policy.

use crate::model::MatchPolicy;
use crate::text::{normalize, parse_number};

/// Absolute tolerance for numeric answers.
pub const NUMBER_TOLERANCE: f64 = 0.001;

/// Decide whether a free-text answer is correct.
///
/// An empty set of accepted answers never matches.
pub fn is_text_correct<S: AsRef<str>>(
    student_answer: &str,
    accepted_answers: &[S],
    policy: MatchPolicy,
) -> bool {
    if accepted_answers.is_empty() {
        return false;
    }

    match policy {
        MatchPolicy::Exact => {
            let student = normalize(student_answer);
            accepted_answers
                .iter()
                .any(|accepted| normalize(accepted.as_ref()) == student)
        }
        MatchPolicy::Contains => {
            let student = normalize(student_answer);
            accepted_answers
                .iter()
                .any(|accepted| student.contains(normalize(accepted.as_ref()).as_str()))
        }
        MatchPolicy::Number => {
            let Some(student) = parse_number(student_answer) else {
                return false;
            };
            accepted_answers
                .iter()
                .filter_map(|accepted| parse_number(accepted.as_ref()))
                .any(|accepted| (student - accepted).abs() < NUMBER_TOLERANCE)
        }
    }
}
