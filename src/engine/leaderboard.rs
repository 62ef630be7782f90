//! Leaderboard views
//!
//! Read-side shaping of an aggregation run: global positions, rank groups,
//! filtering and pagination.

use serde::{Deserialize, Serialize};

use crate::domain::{Money, RankTable};

use super::AggregatedPerson;

/// Default page size for leaderboard listings
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Upper bound on page size
pub const MAX_PAGE_LIMIT: usize = 1000;

/// A leaderboard row with its global 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub phone: Option<String>,
    pub store_name: Option<String>,
    pub region: Option<String>,
    pub total_sales_amount: Money,
    pub rank_title: String,
}

impl LeaderboardRow {
    fn from_person(position: usize, person: &AggregatedPerson) -> Self {
        Self {
            rank: position,
            name: person.name.clone(),
            phone: person.phone.clone(),
            store_name: person.store_name.clone(),
            region: person.region.clone(),
            total_sales_amount: person.total_sales_amount,
            rank_title: person.rank_title().to_string(),
        }
    }
}

/// Optional row filters. Matching ignores case; `store` is a substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeaderboardFilter {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub rank_title: Option<String>,
}

impl LeaderboardFilter {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.store.is_none() && self.rank_title.is_none()
    }

    pub fn matches(&self, row: &LeaderboardRow) -> bool {
        let region_ok = match needle(&self.region) {
            Some(region) => row
                .region
                .as_deref()
                .is_some_and(|r| r.trim().to_lowercase() == region),
            None => true,
        };
        let store_ok = match needle(&self.store) {
            Some(store) => row
                .store_name
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&store)),
            None => true,
        };
        let rank_ok = match needle(&self.rank_title) {
            Some(title) => row.rank_title.to_lowercase() == title,
            None => true,
        };

        region_ok && store_ok && rank_ok
    }
}

fn needle(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Page {
    /// Clamp user input: page >= 1, 1 <= limit <= MAX_PAGE_LIMIT.
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of filtered rows plus the filtered total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardPage {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub rows: Vec<LeaderboardRow>,
}

/// People sharing a rank title, sorted by total descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankGroup {
    pub rank_title: String,
    pub people: Vec<AggregatedPerson>,
}

/// Ordered leaderboard built from an aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    /// Number people in the order given (the aggregator's sorted output).
    pub fn from_people(people: &[AggregatedPerson]) -> Self {
        let rows = people
            .iter()
            .enumerate()
            .map(|(i, person)| LeaderboardRow::from_person(i + 1, person))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows passing the filter. Positions stay global.
    pub fn filtered(&self, filter: &LeaderboardFilter) -> Vec<LeaderboardRow> {
        self.rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect()
    }

    pub fn page(&self, filter: &LeaderboardFilter, page: Page) -> LeaderboardPage {
        let matching = self.filtered(filter);
        let total = matching.len();
        let rows = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .collect();

        LeaderboardPage {
            total,
            page: page.page,
            limit: page.limit,
            rows,
        }
    }
}

/// Group people by displayed rank title.
///
/// Override titles come first (in order of first appearance), then the
/// table's tiers highest-first. Each group is sorted by total descending,
/// keeping input order on ties. Empty groups are omitted.
pub fn group_by_rank(people: &[AggregatedPerson], table: &RankTable) -> Vec<RankGroup> {
    let mut groups: Vec<RankGroup> = Vec::new();

    for person in people {
        let title = person.rank_title();
        match groups.iter_mut().find(|g| g.rank_title == title) {
            Some(group) => group.people.push(person.clone()),
            None => groups.push(RankGroup {
                rank_title: title.to_string(),
                people: vec![person.clone()],
            }),
        }
    }

    for group in &mut groups {
        group
            .people
            .sort_by(|a, b| b.total_sales_amount.cmp(&a.total_sales_amount));
    }

    // Titles outside the table (overrides) sort ahead of every tier
    groups.sort_by_key(|g| match table.position_of(&g.rank_title) {
        Some(pos) => (1, pos),
        None => (0, 0),
    });

    groups
}
