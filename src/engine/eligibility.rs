use chrono::NaiveDate;

use crate::models::Problem;

/// Whether `problem` may be picked on `today`.
///
/// New problems are always eligible. Anything else needs at least its
/// label's interval of whole days since the last review (inclusive).
pub fn is_eligible(problem: &Problem, today: NaiveDate) -> bool {
    let Some(interval) = problem.label.review_interval_days() else {
        return true;
    };

    match problem.last_reviewed {
        Some(last) => (today - last).num_days() >= interval,
        None => {
            log::warn!(
                "problem {} is labelled {} but has never been reviewed; treating as eligible",
                problem.id,
                problem.label.as_str()
            );
            true
        }
    }
}

/// Ids of eligible problems, skipping anything in `exclude`.
pub fn eligible_ids(problems: &[Problem], today: NaiveDate, exclude: &[i64]) -> Vec<i64> {
    problems
        .iter()
        .filter(|p| !exclude.contains(&p.id))
        .filter(|p| is_eligible(p, today))
        .map(|p| p.id)
        .collect()
}
