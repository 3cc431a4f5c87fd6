//! Aggregate statistics over stored attempt results.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;
use crate::model::AttemptResult;
use crate::scoring::round2;

/// Criteria for narrowing a result list. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultFilter {
    /// Exact class name, compared case-insensitively.
    pub class_name: Option<String>,
    pub grade: Option<Grade>,
    /// Earliest UTC date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest UTC date, inclusive.
    pub to: Option<NaiveDate>,
}

impl ResultFilter {
    pub fn matches(&self, result: &AttemptResult) -> bool {
        if let Some(class_name) = &self.class_name {
            if !result
                .student
                .class_name
                .trim()
                .eq_ignore_ascii_case(class_name.trim())
            {
                return false;
            }
        }
        if self.grade.is_some_and(|g| g != result.grade) {
            return false;
        }
        let date = result.timestamp.date_naive();
        if self.from.is_some_and(|from| date < from) {
            return false;
        }
        if self.to.is_some_and(|to| date > to) {
            return false;
        }
        true
    }

    /// The matching results, in their original order.
    pub fn apply<'a>(&self, results: &'a [AttemptResult]) -> Vec<&'a AttemptResult> {
        results.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Headline numbers for a set of attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsOverview {
    pub attempts: usize,
    pub distinct_students: usize,
    pub average_percentage: f64,
    pub best_percentage: f64,
    pub average_grade: f64,
}

impl ResultsOverview {
    /// Summarize the given results; `None` when there are none.
    pub fn compute<'a, I>(results: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a AttemptResult>,
    {
        let mut attempts = 0usize;
        let mut percentage_sum = 0.0;
        let mut best = f64::MIN;
        let mut grade_sum = 0u32;
        let mut students = HashSet::new();

        for result in results {
            attempts += 1;
            percentage_sum += result.percentage;
            best = best.max(result.percentage);
            grade_sum += u32::from(result.grade.value());
            students.insert(result.student.key());
        }

        if attempts == 0 {
            return None;
        }

        Some(Self {
            attempts,
            distinct_students: students.len(),
            average_percentage: round2(percentage_sum / attempts as f64),
            best_percentage: best,
            average_grade: round2(grade_sum as f64 / attempts as f64),
        })
    }
}

/// Count of attempts per grade, with every grade present.
pub fn grade_distribution<'a, I>(results: I) -> BTreeMap<Grade, usize>
where
    I: IntoIterator<Item = &'a AttemptResult>,
{
    let mut distribution: BTreeMap<Grade, usize> = Grade::ALL.iter().map(|g| (*g, 0)).collect();
    for result in results {
        *distribution.entry(result.grade).or_default() += 1;
    }
    distribution
}

/// How one question fared across attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub text: String,
    pub answered: usize,
    pub correct: usize,
    pub partial: usize,
    pub average_points: f64,
    pub max_points: u32,
}

impl QuestionStats {
    /// Share of fully correct answers, in percent.
    pub fn correct_rate(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            round2(self.correct as f64 / self.answered as f64 * 100.0)
        }
    }
}

/// Per-question statistics, ordered by first appearance.
pub fn question_stats<'a, I>(results: I) -> Vec<QuestionStats>
where
    I: IntoIterator<Item = &'a AttemptResult>,
{
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, (QuestionStats, f64)> = HashMap::new();

    for answer in results.into_iter().flat_map(|r| r.answers.iter()) {
        let id = &answer.question.id;
        let (stats, earned) = by_id.entry(id.clone()).or_insert_with(|| {
            order.push(id.clone());
            (
                QuestionStats {
                    question_id: id.clone(),
                    text: answer.question.text.clone(),
                    answered: 0,
                    correct: 0,
                    partial: 0,
                    average_points: 0.0,
                    max_points: answer.max_points,
                },
                0.0,
            )
        });
        stats.answered += 1;
        if answer.is_correct {
            stats.correct += 1;
        } else if answer.is_partial() {
            stats.partial += 1;
        }
        *earned += answer.earned_points;
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .map(|(mut stats, earned)| {
            stats.average_points = round2(earned / stats.answered as f64);
            stats
        })
        .collect()
}
