use chrono::NaiveDate;

use super::mastery::{next_state, validate_outcome};
use super::{Engine, RandomSource};
use crate::error::{EngineError, Result};
use crate::models::{Label, Problem};

impl<R: RandomSource> Engine<'_, R> {
    /// Apply `outcome` to a problem in the practice set for `date`.
    ///
    /// The problem update, the attempt record and the completed flag are
    /// written in one transaction. Completing twice is an error, not a no-op.
    pub fn complete(&self, date: NaiveDate, problem_id: i64, outcome: Label) -> Result<Problem> {
        let outcome = validate_outcome(outcome)?;

        self.db.with_transaction(|db| -> Result<Problem> {
            let not_found = || EngineError::NotFound { problem_id, date };

            let assignment = db.get_assignment(problem_id, date)?.ok_or_else(not_found)?;
            if assignment.completed {
                return Err(EngineError::AlreadyCompleted { problem_id, date });
            }

            let problem = db.get_problem(problem_id)?.ok_or_else(not_found)?;
            let transition = next_state(problem.label, outcome, date)?;

            db.record_problem_review(problem_id, transition.label, transition.last_reviewed)?;
            db.add_attempt(problem_id, outcome, date)?;
            db.mark_assignment_completed(assignment.id)?;

            let updated = db.get_problem(problem_id)?.ok_or_else(not_found)?;
            log::info!(
                "completed problem {} on {}: {} -> {} (review #{})",
                problem_id,
                date,
                problem.label.as_str(),
                updated.label.as_str(),
                updated.review_count
            );
            Ok(updated)
        })
    }
}
