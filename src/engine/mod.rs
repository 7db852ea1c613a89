//! Daily selection engine.
//!
//! Decides which problems belong to a calendar day, keeps that choice stable
//! across calls, and folds completion results back into each problem's
//! mastery label and review schedule. The engine holds no state between
//! calls: everything it knows lives in the [`Database`], and every
//! multi-row mutation runs inside [`Database::with_transaction`].

mod completion;
pub mod eligibility;
pub mod mastery;
pub mod random;
mod selection;
mod stats;

pub use random::RandomSource;

use crate::db::Database;

pub struct Engine<'a, R: RandomSource> {
    db: &'a Database,
    rng: R,
    daily_count: usize,
}

impl<'a, R: RandomSource> Engine<'a, R> {
    pub fn new(db: &'a Database, rng: R, daily_count: usize) -> Self {
        Self {
            db,
            rng,
            daily_count,
        }
    }
}
