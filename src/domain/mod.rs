//! Domain module
//!
//! Core domain types: money, input records and rank tiers.

pub mod error;
pub mod money;
pub mod rank;
pub mod records;

pub use error::DomainError;
pub use money::{Money, MoneyError};
pub use rank::{RankOverrides, RankTable, RankTier, SALES_GENERAL};
pub use records::{normalize_phone, PersonRosterEntry, SaleEvent, TestSubmission};
