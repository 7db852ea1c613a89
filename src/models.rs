use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Mastery labels, ordered by review cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    New,
    Struggling,
    Okay,
    Mastered,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::New, Label::Struggling, Label::Okay, Label::Mastered];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::New => "new",
            Label::Struggling => "struggling",
            Label::Okay => "okay",
            Label::Mastered => "mastered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(Label::New),
            "struggling" | "s" | "hard" => Some(Label::Struggling),
            "okay" | "ok" | "o" => Some(Label::Okay),
            "mastered" | "m" | "easy" => Some(Label::Mastered),
            _ => None,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Label::New => "New",
            Label::Struggling => "Struggling",
            Label::Okay => "Okay",
            Label::Mastered => "Mastered",
        }
    }

    /// Minimum number of whole days between reviews. `New` has no interval:
    /// it is always eligible.
    pub fn review_interval_days(&self) -> Option<i64> {
        match self {
            Label::New => None,
            Label::Struggling => Some(3),
            Label::Okay => Some(7),
            Label::Mastered => Some(14),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub label: Label,
    pub last_reviewed: Option<NaiveDate>,
    pub review_count: i64,
    pub key_insight: Option<String>,
    pub created_at: String,
}

impl Problem {
    /// First date on which the problem can be picked again.
    pub fn next_due(&self) -> Option<NaiveDate> {
        let interval = self.label.review_interval_days()?;
        let last = self.last_reviewed?;
        last.checked_add_signed(chrono::Duration::days(interval))
    }
}

// Append-only record of one reported outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub problem_id: i64,
    pub outcome: Label,
    pub practice_date: NaiveDate,
    pub attempted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAssignment {
    pub id: i64,
    pub problem_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
}

// A problem as it appears in a day's practice set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub assignment_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(flatten)]
    pub problem: Problem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemWithHistory {
    pub problem: Problem,
    pub next_due: Option<NaiveDate>,
    pub attempts: Vec<Attempt>,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
