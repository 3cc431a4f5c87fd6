//! Percentage to grade mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A grade on the 1 (fail) to 5 (excellent) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const FAIL: Grade = Grade(1);
    pub const SUFFICIENT: Grade = Grade(2);
    pub const SATISFACTORY: Grade = Grade(3);
    pub const GOOD: Grade = Grade(4);
    pub const EXCELLENT: Grade = Grade(5);

    /// All grades, lowest first.
    pub const ALL: [Grade; 5] = [
        Grade::FAIL,
        Grade::SUFFICIENT,
        Grade::SATISFACTORY,
        Grade::GOOD,
        Grade::EXCELLENT,
    ];

    /// Map a percentage in `[0, 100]` to its grade band.
    ///
    /// Bands are inclusive on the lower edge: below 40 is 1, then 55, 70 and
    /// 85 open grades 3, 4 and 5. Callers clamp out-of-range values first.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 40.0 {
            Grade::FAIL
        } else if percentage < 55.0 {
            Grade::SUFFICIENT
        } else if percentage < 70.0 {
            Grade::SATISFACTORY
        } else if percentage < 85.0 {
            Grade::GOOD
        } else {
            Grade::EXCELLENT
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Fail",
            2 => "Sufficient",
            3 => "Satisfactory",
            4 => "Good",
            _ => "Excellent",
        }
    }

    pub fn description(self) -> &'static str {
        match self.0 {
            1 => "Further study is needed.",
            2 => "Basic knowledge, but improvement is needed.",
            3 => "Average performance.",
            4 => "Solid knowledge.",
            _ => "Outstanding performance!",
        }
    }
}

/// Shorthand for [`Grade::from_percentage`].
pub fn grade(percentage: f64) -> Grade {
    Grade::from_percentage(percentage)
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Grade(value))
        } else {
            Err(format!("grade must be between 1 and 5, got {value}"))
        }
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid grade: {s}"))?;
        Grade::try_from(value)
    }
}
