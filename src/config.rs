use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const APP_DIR: &str = "grindstone";
const DEFAULT_DB_NAME: &str = "grindstone.db";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const DB_ENV: &str = "GRINDSTONE_DB";
pub const DAILY_COUNT_ENV: &str = "GRINDSTONE_DAILY_COUNT";

pub const DEFAULT_DAILY_COUNT: usize = 3;
pub const MIN_DAILY_COUNT: usize = 1;
pub const MAX_DAILY_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub daily_problem_count: usize,
}

// On-disk shape; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database_path: Option<PathBuf>,
    daily_problem_count: Option<i64>,
}

impl Config {
    /// Defaults, then `config.toml`, then environment.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = config_dir();
        let file = dir.join(CONFIG_FILE_NAME);
        let file_config = if file.exists() {
            read_file_config(&file)?
        } else {
            FileConfig::default()
        };

        let env = |key: &str| std::env::var(key).ok();
        Self::resolve(&dir, file_config, env(DB_ENV), env(DAILY_COUNT_ENV))
    }

    fn resolve(
        dir: &Path,
        file_config: FileConfig,
        db_env: Option<String>,
        count_env: Option<String>,
    ) -> Result<Self, ConfigError> {
        let database_path = db_env
            .map(PathBuf::from)
            .or(file_config.database_path)
            .unwrap_or_else(|| dir.join(DEFAULT_DB_NAME));

        let raw_count = match count_env {
            Some(value) => value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnv {
                key: DAILY_COUNT_ENV,
                value,
            })?,
            None => file_config
                .daily_problem_count
                .unwrap_or(DEFAULT_DAILY_COUNT as i64),
        };

        Ok(Self {
            database_path,
            daily_problem_count: validate_daily_count(raw_count)?,
        })
    }

    /// Apply a per-command override such as `--count`.
    pub fn with_daily_count(mut self, count: Option<i64>) -> Result<Self, ConfigError> {
        if let Some(count) = count {
            self.daily_problem_count = validate_daily_count(count)?;
        }
        Ok(self)
    }
}

pub fn validate_daily_count(value: i64) -> Result<usize, ConfigError> {
    let range = MIN_DAILY_COUNT as i64..=MAX_DAILY_COUNT as i64;
    if range.contains(&value) {
        Ok(value as usize)
    } else {
        Err(ConfigError::InvalidDailyCount {
            value,
            min: MIN_DAILY_COUNT,
            max: MAX_DAILY_COUNT,
        })
    }
}

fn config_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);

    std::fs::create_dir_all(&dir).ok();
    dir
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
