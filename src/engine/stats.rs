use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::eligibility::is_eligible;
use super::{Engine, RandomSource};
use crate::error::Result;
use crate::models::Label;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tip {
    pub problem_id: i64,
    pub title: String,
    pub insight: String,
}

impl<R: RandomSource> Engine<'_, R> {
    /// Previously attempted problems whose interval has elapsed. New
    /// problems are selectable but do not count as review pressure.
    /// Problems sitting in today's open set still count.
    pub fn ready_for_review(&self, date: NaiveDate) -> Result<usize> {
        let problems = self.db.list_problems(None)?;
        Ok(problems
            .iter()
            .filter(|p| p.label != Label::New && is_eligible(p, date))
            .count())
    }

    /// Consecutive fully completed days ending yesterday. `date` itself is
    /// still in progress and never counts; a day without assignments breaks
    /// the streak. Past rows whose problem was later deleted still count by
    /// their completed flag.
    pub fn current_streak(&self, date: NaiveDate) -> Result<u32> {
        let mut streak = 0;
        let mut expected = date.pred_opt();

        for day in self.db.assignment_days_before(date)? {
            if Some(day.date) != expected || day.completed < day.total {
                break;
            }
            streak += 1;
            expected = day.date.pred_opt();
        }

        Ok(streak)
    }

    /// One key insight per calendar day, cycling through every problem that
    /// has one.
    pub fn tip_for(&self, date: NaiveDate) -> Result<Option<Tip>> {
        let problems = self.db.list_problems_with_insight()?;
        if problems.is_empty() {
            return Ok(None);
        }

        let index = date.num_days_from_ce().rem_euclid(problems.len() as i32) as usize;
        let problem = &problems[index];
        Ok(Some(Tip {
            problem_id: problem.id,
            title: problem.title.clone(),
            insight: problem.key_insight.clone().unwrap_or_default(),
        }))
    }
}
