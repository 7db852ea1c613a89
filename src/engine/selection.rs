use chrono::NaiveDate;

use super::eligibility::eligible_ids;
use super::{Engine, RandomSource};
use crate::db::Database;
use crate::error::{EngineError, Result};
use crate::models::DailyEntry;

impl<R: RandomSource> Engine<'_, R> {
    /// The practice set for `date`, creating it on first request.
    ///
    /// Once any row exists for the date it is returned as-is, in creation
    /// order, whatever its completion state.
    pub fn get_or_create_today(&mut self, date: NaiveDate) -> Result<Vec<DailyEntry>> {
        let daily_count = self.daily_count;
        let rng = &mut self.rng;

        self.db.with_transaction(|db| -> Result<Vec<DailyEntry>> {
            let existing = db.list_daily_entries(date)?;
            if !existing.is_empty() {
                return Ok(existing);
            }

            let drawn = draw_assignments(db, rng, date, daily_count, &[])?;
            log::info!("created practice set for {} with {} problems", date, drawn.len());

            Ok(db.list_daily_entries(date)?)
        })
    }

    /// Discard the open rows for `date` and draw a fresh set.
    ///
    /// Completed rows are kept and their problems are not candidates. The
    /// redraw is the same draw as the first request, sized to the slots left
    /// after those completions, so the day never holds more than
    /// `daily_count` rows.
    pub fn refresh_today(&mut self, date: NaiveDate) -> Result<Vec<DailyEntry>> {
        let daily_count = self.daily_count;
        let rng = &mut self.rng;

        self.db.with_transaction(|db| -> Result<Vec<DailyEntry>> {
            let completed: Vec<i64> = db
                .list_assignments(date)?
                .into_iter()
                .filter(|a| a.completed)
                .map(|a| a.problem_id)
                .collect();

            let discarded = db.delete_pending_assignments(date)?;
            let open_slots = daily_count.saturating_sub(completed.len());
            let drawn = draw_assignments(db, rng, date, open_slots, &completed)?;

            log::info!(
                "refreshed practice set for {}: discarded {}, kept {} completed, drew {}",
                date,
                discarded,
                completed.len(),
                drawn.len()
            );

            Ok(db.list_daily_entries(date)?)
        })
    }

    /// Swap one open assignment for a random eligible problem not already
    /// in the day's set. On failure nothing changes.
    pub fn replace_one(&mut self, date: NaiveDate, problem_id: i64) -> Result<DailyEntry> {
        let rng = &mut self.rng;

        self.db.with_transaction(|db| -> Result<DailyEntry> {
            let current = match db.get_assignment(problem_id, date)? {
                Some(a) if !a.completed => a,
                _ => return Err(EngineError::NotFound { problem_id, date }),
            };

            let assigned: Vec<i64> = db
                .list_assignments(date)?
                .iter()
                .map(|a| a.problem_id)
                .collect();
            let problems = db.list_problems(None)?;
            let candidates = eligible_ids(&problems, date, &assigned);
            log::debug!("{} replacement candidates for {}", candidates.len(), date);

            let drawn = rng.draw(&candidates, 1);
            let Some(&replacement) = drawn.first() else {
                log::warn!("no replacement available for problem {} on {}", problem_id, date);
                return Err(EngineError::NoCandidateAvailable { date });
            };

            db.delete_assignment(current.id)?;
            let assignment_id = db.add_assignment(replacement, date)?;
            log::info!("replaced problem {} with {} on {}", problem_id, replacement, date);

            db.list_daily_entries(date)?
                .into_iter()
                .find(|e| e.assignment_id == assignment_id)
                .ok_or(EngineError::NotFound {
                    problem_id: replacement,
                    date,
                })
        })
    }
}

// Draw up to `k` eligible problems (minus `exclude`) and persist them for `date`.
fn draw_assignments<R: RandomSource>(
    db: &Database,
    rng: &mut R,
    date: NaiveDate,
    k: usize,
    exclude: &[i64],
) -> Result<Vec<i64>> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let problems = db.list_problems(None)?;
    let candidates = eligible_ids(&problems, date, exclude);
    log::debug!(
        "{} of {} problems eligible on {}",
        candidates.len(),
        problems.len(),
        date
    );

    let drawn = rng.draw(&candidates, k);
    for id in &drawn {
        db.add_assignment(*id, date)?;
    }
    Ok(drawn)
}
