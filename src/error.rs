use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Problem {problem_id} is not in the open set for {date}")]
    NotFound { problem_id: i64, date: NaiveDate },

    #[error("Problem {problem_id} was already completed on {date}")]
    AlreadyCompleted { problem_id: i64, date: NaiveDate },

    #[error("No eligible replacement available for {date}")]
    NoCandidateAvailable { date: NaiveDate },

    #[error("Invalid outcome '{0}'. Use: struggling, okay, or mastered")]
    InvalidOutcome(String),

    #[error("Store failure: {0}")]
    StoreFailure(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Daily problem count must be between {min} and {max}, got {value}")]
    InvalidDailyCount { value: i64, min: usize, max: usize },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}
