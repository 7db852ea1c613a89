use chrono::NaiveDate;

use crate::error::{EngineError, Result};
use crate::models::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub label: Label,
    pub last_reviewed: NaiveDate,
}

/// The reported outcome always becomes the new label; there is no blending
/// with the current one. `reviewCount` is bumped by the writer.
pub fn next_state(current: Label, outcome: Label, today: NaiveDate) -> Result<Transition> {
    let outcome = validate_outcome(outcome)?;
    log::debug!("transition {} -> {}", current.as_str(), outcome.as_str());

    Ok(Transition {
        label: outcome,
        last_reviewed: today,
    })
}

pub fn validate_outcome(outcome: Label) -> Result<Label> {
    match outcome {
        Label::New => Err(EngineError::InvalidOutcome(outcome.as_str().to_string())),
        other => Ok(other),
    }
}

/// Parse a user-supplied outcome; `new` and unknown words are rejected.
pub fn parse_outcome(s: &str) -> Result<Label> {
    Label::from_str(s)
        .ok_or_else(|| EngineError::InvalidOutcome(s.to_string()))
        .and_then(validate_outcome)
}
