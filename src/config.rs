//! Configuration module
//!
//! Loads server and incentive configuration from environment variables.
//! Parsing of list-valued settings is kept in plain functions so it can be
//! tested without touching the process environment.

use std::env;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Money, RankOverrides, RankTable, RankTier};
use crate::engine::IncentiveRules;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    pub incentives: IncentiveSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            incentives: IncentiveSettings::from_env()?,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Incentive program settings consumed at the report boundary.
#[derive(Debug, Clone, Default)]
pub struct IncentiveSettings {
    /// Phones receiving the flat manual bonus
    pub manual_bonus_phones: Vec<String>,
    pub rules: IncentiveRules,
    /// Used when a report request does not name a window start
    pub default_window_start: Option<DateTime<Utc>>,
}

impl IncentiveSettings {
    /// Load incentive settings from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let manual_bonus_phones = env::var("MANUAL_BONUS_PHONES")
            .map(|raw| parse_phone_list(&raw))
            .unwrap_or_default();

        let stackable_bonus = money_var("STACKABLE_BONUS_AMOUNT", "10000")?;
        let manual_bonus = money_var("MANUAL_BONUS_AMOUNT", "21000")?;

        let rank_table = match env::var("RANK_THRESHOLDS") {
            Ok(raw) => parse_rank_table(&raw)?,
            Err(_) => RankTable::default(),
        };

        let rank_overrides = match env::var("RANK_OVERRIDES") {
            Ok(raw) => parse_rank_overrides(&raw)?,
            Err(_) => RankOverrides::default(),
        };

        let default_window_start = match env::var("INCENTIVE_WINDOW_START") {
            Ok(raw) => Some(
                parse_window_bound(&raw)
                    .ok_or(ConfigError::InvalidValue("INCENTIVE_WINDOW_START"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            manual_bonus_phones,
            rules: IncentiveRules::new(stackable_bonus, manual_bonus)
                .with_rank_table(rank_table)
                .with_rank_overrides(rank_overrides),
            default_window_start,
        })
    }
}

fn money_var(name: &'static str, default: &str) -> Result<Money, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name))
}

/// Split a comma-separated phone list, trimming entries and dropping blanks.
pub fn parse_phone_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `amount:Title,amount:Title,...` into a rank table.
pub fn parse_rank_table(raw: &str) -> Result<RankTable, ConfigError> {
    let mut tiers = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        let (amount, title) = item
            .split_once(':')
            .ok_or(ConfigError::InvalidValue("RANK_THRESHOLDS"))?;
        let threshold: Money = amount
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RANK_THRESHOLDS"))?;
        tiers.push(RankTier::new(threshold, title.trim()));
    }

    RankTable::new(tiers).map_err(|e| ConfigError::Invalid {
        name: "RANK_THRESHOLDS",
        reason: e.to_string(),
    })
}

/// Parse `phone:Title,phone:Title,...` into rank overrides.
pub fn parse_rank_overrides(raw: &str) -> Result<RankOverrides, ConfigError> {
    let mut overrides = RankOverrides::new();
    for item in raw.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        let (phone, title) = item
            .split_once(':')
            .ok_or(ConfigError::InvalidValue("RANK_OVERRIDES"))?;
        overrides.insert(phone, title);
    }
    Ok(overrides)
}

/// Accept an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_window_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid value for environment variable {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
