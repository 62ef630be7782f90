//! Rank tiers
//!
//! Titles assigned from cumulative sales via a descending threshold table.

use std::collections::HashMap;

use serde::Serialize;

use super::{normalize_phone, DomainError, Money};

/// Title reserved for manually promoted people above every threshold.
/// It is never produced by `RankTable::assign`.
pub const SALES_GENERAL: &str = "Sales General";

const DEFAULT_TIERS: &[(i64, &str)] = &[
    (150_000, "Sales Chief Marshal"),
    (120_000, "Sales Commander"),
    (80_000, "Sales Major"),
    (51_000, "Sales Captain"),
    (21_000, "Sales Lieutenant"),
    (0, "Salesveer"),
];

/// A single tier: totals at or above `threshold` earn `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankTier {
    pub threshold: Money,
    pub title: String,
}

impl RankTier {
    pub fn new(threshold: Money, title: impl Into<String>) -> Self {
        Self {
            threshold,
            title: title.into(),
        }
    }
}

/// Threshold table ordered highest-first.
///
/// # Invariants
/// - At least one tier
/// - Thresholds are unique and titles non-blank
/// - The lowest tier is the floor for totals below every threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankTable {
    tiers: Vec<RankTier>,
}

impl RankTable {
    /// Build a table from tiers in any order.
    pub fn new(mut tiers: Vec<RankTier>) -> Result<Self, DomainError> {
        if tiers.is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "rank table needs at least one tier".to_string(),
            ));
        }

        if let Some(tier) = tiers.iter().find(|t| t.title.trim().is_empty()) {
            return Err(DomainError::InvalidConfiguration(format!(
                "rank tier at {} has an empty title",
                tier.threshold
            )));
        }

        tiers.sort_by(|a, b| b.threshold.cmp(&a.threshold));

        if let Some(pair) = tiers.windows(2).find(|w| w[0].threshold == w[1].threshold) {
            return Err(DomainError::InvalidConfiguration(format!(
                "duplicate rank threshold {}",
                pair[0].threshold
            )));
        }

        Ok(Self { tiers })
    }

    /// Tiers highest-first.
    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }

    /// Title of the highest tier whose threshold the total reaches.
    pub fn assign(&self, total: &Money) -> &str {
        self.tiers
            .iter()
            .find(|tier| total.reaches(&tier.threshold))
            .or_else(|| self.tiers.last())
            .map(|tier| tier.title.as_str())
            .unwrap_or_default()
    }

    /// Position of a title in the table (0 = highest tier).
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.tiers.iter().position(|tier| tier.title == title)
    }
}

impl Default for RankTable {
    fn default() -> Self {
        let tiers = DEFAULT_TIERS
            .iter()
            .map(|(threshold, title)| RankTier::new(Money::from_trusted(*threshold), *title))
            .collect();
        Self { tiers }
    }
}

/// Manually assigned titles layered on top of the computed rank,
/// keyed by normalized phone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankOverrides {
    by_phone: HashMap<String, String>,
}

impl RankOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override. Blank phones or titles are ignored.
    pub fn insert(&mut self, phone: &str, title: impl Into<String>) {
        let title = title.into();
        if title.trim().is_empty() {
            return;
        }
        if let Some(phone) = normalize_phone(phone) {
            self.by_phone.insert(phone, title.trim().to_string());
        }
    }

    pub fn with(mut self, phone: &str, title: impl Into<String>) -> Self {
        self.insert(phone, title);
        self
    }

    pub fn title_for(&self, phone: &str) -> Option<&str> {
        normalize_phone(phone)
            .and_then(|phone| self.by_phone.get(&phone))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_phone.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_phone.len()
    }
}
