//! SEC Incentives Library
//!
//! Incentive aggregation and leaderboard reporting for SEC sales programs.
//! The engine is pure and synchronous; the API and binaries wrap it with a
//! snapshot source, configuration and export.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod export;
pub mod snapshot;

mod error;

pub use config::{Config, IncentiveSettings};
pub use domain::{DomainError, Money, MoneyError, PersonRosterEntry, SaleEvent, TestSubmission};
pub use engine::{AggregatedPerson, AggregationOutcome, IncentiveAggregator, IncentiveRules};
pub use error::AppError;
