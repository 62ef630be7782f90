//! Incentive Aggregator
//!
//! Turns a snapshot of sale events and the bonus roster into one ranked row
//! per salesperson. Every run starts from an empty accumulator; nothing is
//! carried over between calls.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    normalize_phone, DomainError, Money, PersonRosterEntry, RankOverrides, RankTable, SaleEvent,
};

/// Name used when neither the event nor the roster knows the person.
pub const UNKNOWN_NAME: &str = "Unknown";

// =========================================================================
// Rules and window
// =========================================================================

/// Bonus amounts and rank configuration applied by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct IncentiveRules {
    /// One-time bonus for people with the roster bonus flag
    pub stackable_bonus: Money,
    /// Flat bonus for every listed manual-bonus phone
    pub manual_bonus: Money,
    pub rank_table: RankTable,
    pub rank_overrides: RankOverrides,
}

impl IncentiveRules {
    pub fn new(stackable_bonus: Money, manual_bonus: Money) -> Self {
        Self {
            stackable_bonus,
            manual_bonus,
            rank_table: RankTable::default(),
            rank_overrides: RankOverrides::default(),
        }
    }

    pub fn with_rank_table(mut self, rank_table: RankTable) -> Self {
        self.rank_table = rank_table;
        self
    }

    pub fn with_rank_overrides(mut self, rank_overrides: RankOverrides) -> Self {
        self.rank_overrides = rank_overrides;
        self
    }
}

impl Default for IncentiveRules {
    fn default() -> Self {
        Self::new(Money::from_trusted(10_000), Money::from_trusted(21_000))
    }
}

/// Report window on `dateOfSale`: inclusive start, optional exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl ReportWindow {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::invalid_argument(format!(
                "window end {} must be after start {}",
                end, start
            )));
        }
        Ok(Self {
            start,
            end: Some(end),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && self.end.map_or(true, |end| at < end)
    }
}

// =========================================================================
// Output types
// =========================================================================

/// Identity an aggregated row is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PersonKey {
    Id(String),
    Phone(String),
    /// Sale with no resolvable person, kept so its volume still shows up
    Unknown(Uuid),
}

impl PersonKey {
    fn for_roster(entry: &PersonRosterEntry) -> Option<Self> {
        entry
            .person_id()
            .map(|id| Self::Id(id.to_string()))
            .or_else(|| entry.normalized_phone().map(Self::Phone))
    }
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Phone(phone) => write!(f, "phone:{}", phone),
            Self::Unknown(event_id) => write!(f, "unknown:{}", event_id),
        }
    }
}

impl Serialize for PersonKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One salesperson's totals for a single aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPerson {
    pub person_key: PersonKey,
    pub person_id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub store_name: Option<String>,
    pub region: Option<String>,
    pub total_sales_amount: Money,
    /// Qualifying sale events counted into the total
    pub sale_count: u32,
    /// Stackable bonus added (at most once per run)
    pub bonus_applied: bool,
    /// Manual bonus-phone bonus added (at most once per run)
    pub manual_bonus_applied: bool,
    /// Rank computed from the threshold table
    pub rank: String,
    /// Manually assigned title layered over `rank`
    pub rank_override: Option<String>,
}

impl AggregatedPerson {
    fn seeded(
        key: PersonKey,
        roster: Option<&PersonRosterEntry>,
        event: Option<&SaleEvent>,
    ) -> Self {
        let person_id = match &key {
            PersonKey::Id(id) => Some(id.clone()),
            _ => roster.and_then(|r| r.person_id()).map(str::to_string),
        };
        let phone = roster
            .and_then(PersonRosterEntry::normalized_phone)
            .or_else(|| event.and_then(SaleEvent::normalized_phone));
        let name = roster
            .and_then(|r| r.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_NAME)
            .to_string();

        Self {
            person_key: key,
            person_id,
            name,
            phone,
            store_name: roster.and_then(|r| r.store_name.clone()),
            region: roster.and_then(|r| r.region.clone()),
            total_sales_amount: Money::zero(),
            sale_count: 0,
            bonus_applied: false,
            manual_bonus_applied: false,
            rank: String::new(),
            rank_override: None,
        }
    }

    /// Title shown on leaderboards: the override when present.
    pub fn rank_title(&self) -> &str {
        self.rank_override.as_deref().unwrap_or(&self.rank)
    }
}

/// Counts surfaced to callers so they can report data-quality issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub events_considered: usize,
    pub events_unpaid: usize,
    pub events_outside_window: usize,
    /// Events credited to a synthetic "Unknown" row
    pub events_unattributed: usize,
    /// Roster entries with neither person id nor phone
    pub roster_skipped: usize,
    pub stackable_bonuses: usize,
    pub manual_bonuses: usize,
    /// Sales and bonuses left out because the total would exceed the money limit
    pub amounts_rejected: usize,
}

/// Result of one aggregation run, sorted by total descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationOutcome {
    pub people: Vec<AggregatedPerson>,
    pub stats: AggregationStats,
}

impl AggregationOutcome {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

// =========================================================================
// Aggregator
// =========================================================================

/// Stateless aggregation engine. Safe to share across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct IncentiveAggregator {
    rules: IncentiveRules,
}

impl IncentiveAggregator {
    pub fn new(rules: IncentiveRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &IncentiveRules {
        &self.rules
    }

    /// Aggregate paid events with `dateOfSale >= window_start`.
    pub fn aggregate<P: AsRef<str>>(
        &self,
        events: &[SaleEvent],
        roster: &[PersonRosterEntry],
        manual_bonus_phones: &[P],
        window_start: DateTime<Utc>,
    ) -> AggregationOutcome {
        self.aggregate_window(
            events,
            roster,
            manual_bonus_phones,
            ReportWindow::starting_at(window_start),
        )
    }

    /// Aggregate paid events inside `window`.
    pub fn aggregate_window<P: AsRef<str>>(
        &self,
        events: &[SaleEvent],
        roster: &[PersonRosterEntry],
        manual_bonus_phones: &[P],
        window: ReportWindow,
    ) -> AggregationOutcome {
        let mut stats = AggregationStats::default();
        let roster_index = RosterIndex::build(roster, &mut stats);
        let mut acc = Accumulator::new(&self.rules);

        // Base sales plus the stackable bonus of the seller's roster entry
        for event in events {
            if !event.is_paid() {
                stats.events_unpaid += 1;
                continue;
            }
            if !window.contains(event.date_of_sale) {
                stats.events_outside_window += 1;
                continue;
            }
            stats.events_considered += 1;

            let entry = roster_index.for_event(event);
            let key = match (event.person_id(), entry.and_then(PersonKey::for_roster)) {
                (Some(id), _) => PersonKey::Id(id.to_string()),
                (None, Some(key)) => key,
                (None, None) => match event.normalized_phone() {
                    Some(phone) => PersonKey::Phone(phone),
                    None => {
                        stats.events_unattributed += 1;
                        PersonKey::Unknown(event.event_id)
                    }
                },
            };

            let idx = match &key {
                PersonKey::Phone(phone) => match acc.find(&key, Some(phone)) {
                    Some(idx) => idx,
                    None => acc.ensure_person(key, entry, Some(event)),
                },
                _ => acc.ensure_person(key, entry, Some(event)),
            };
            if !acc.add_sale(idx, &event.plan_price) {
                tracing::warn!(
                    event_id = %event.event_id,
                    person = %acc.people[idx].person_key,
                    "Skipping sale that would push the total past the money limit"
                );
                stats.amounts_rejected += 1;
            }

            if entry.is_some_and(|e| e.has_bonus_flag) {
                acc.apply_bonus_once(idx, &mut stats);
            }
        }

        // Manual bonus phones, deduplicated by normalized phone
        let manual_phones: HashSet<String> = manual_bonus_phones
            .iter()
            .filter_map(|p| normalize_phone(p.as_ref()))
            .collect();

        for entry in roster_index.entries() {
            let Some(phone) = entry.normalized_phone() else {
                continue;
            };
            if !manual_phones.contains(&phone) {
                continue;
            }
            let Some(idx) = acc.ensure_roster_person(entry) else {
                continue;
            };
            acc.apply_manual_bonus(idx, &mut stats);
            if entry.has_bonus_flag {
                acc.apply_bonus_once(idx, &mut stats);
            }
        }

        // Bonus-eligible people without any sales
        for entry in roster_index.entries().filter(|e| e.has_bonus_flag) {
            if let Some(idx) = acc.ensure_roster_person(entry) {
                acc.apply_bonus_once(idx, &mut stats);
            }
        }

        stats.stackable_bonuses = acc.people.iter().filter(|p| p.bonus_applied).count();
        stats.manual_bonuses = acc.people.iter().filter(|p| p.manual_bonus_applied).count();

        let people = acc.finish();

        tracing::debug!(
            people = people.len(),
            events_considered = stats.events_considered,
            events_unpaid = stats.events_unpaid,
            events_outside_window = stats.events_outside_window,
            events_unattributed = stats.events_unattributed,
            roster_skipped = stats.roster_skipped,
            amounts_rejected = stats.amounts_rejected,
            "Incentive aggregation completed"
        );

        AggregationOutcome { people, stats }
    }
}

// =========================================================================
// Internals
// =========================================================================

/// Roster lookups by person id and by normalized phone (first entry wins).
struct RosterIndex<'a> {
    entries: Vec<&'a PersonRosterEntry>,
    by_id: HashMap<&'a str, &'a PersonRosterEntry>,
    by_phone: HashMap<String, &'a PersonRosterEntry>,
}

impl<'a> RosterIndex<'a> {
    fn build(roster: &'a [PersonRosterEntry], stats: &mut AggregationStats) -> Self {
        let mut index = Self {
            entries: Vec::with_capacity(roster.len()),
            by_id: HashMap::new(),
            by_phone: HashMap::new(),
        };

        for entry in roster {
            let phone = entry.normalized_phone();
            if entry.person_id().is_none() && phone.is_none() {
                stats.roster_skipped += 1;
                continue;
            }
            if let Some(id) = entry.person_id() {
                index.by_id.entry(id).or_insert(entry);
            }
            if let Some(phone) = phone {
                index.by_phone.entry(phone).or_insert(entry);
            }
            index.entries.push(entry);
        }

        index
    }

    fn entries(&self) -> impl Iterator<Item = &'a PersonRosterEntry> + '_ {
        self.entries.iter().copied()
    }

    fn for_event(&self, event: &SaleEvent) -> Option<&'a PersonRosterEntry> {
        event
            .person_id()
            .and_then(|id| self.by_id.get(id).copied())
            .or_else(|| {
                event
                    .normalized_phone()
                    .and_then(|phone| self.by_phone.get(&phone).copied())
            })
    }
}

/// Per-run upsert table keyed by identity, with a secondary phone index.
struct Accumulator<'r> {
    rules: &'r IncentiveRules,
    people: Vec<AggregatedPerson>,
    by_key: HashMap<PersonKey, usize>,
    by_phone: HashMap<String, usize>,
}

impl<'r> Accumulator<'r> {
    fn new(rules: &'r IncentiveRules) -> Self {
        Self {
            rules,
            people: Vec::new(),
            by_key: HashMap::new(),
            by_phone: HashMap::new(),
        }
    }

    fn find(&self, key: &PersonKey, phone: Option<&str>) -> Option<usize> {
        self.by_key
            .get(key)
            .or_else(|| phone.and_then(|p| self.by_phone.get(p)))
            .copied()
    }

    fn ensure_person(
        &mut self,
        key: PersonKey,
        roster: Option<&PersonRosterEntry>,
        event: Option<&SaleEvent>,
    ) -> usize {
        if let Some(idx) = self.by_key.get(&key) {
            return *idx;
        }

        let person = AggregatedPerson::seeded(key.clone(), roster, event);
        if let PersonKey::Id(_) = key {
            if let Some(idx) = self.adopt_phone_row(&key, &person) {
                return idx;
            }
        }
        let idx = self.people.len();
        if let Some(phone) = &person.phone {
            self.by_phone.entry(phone.clone()).or_insert(idx);
        }
        self.by_key.insert(key, idx);
        self.people.push(person);
        idx
    }

    /// Existing row for a roster entry (by identity, then phone), or a new one.
    fn ensure_roster_person(&mut self, entry: &PersonRosterEntry) -> Option<usize> {
        let key = PersonKey::for_roster(entry)?;
        let phone = entry.normalized_phone();

        let idx = match self.find(&key, phone.as_deref()) {
            Some(idx) => idx,
            None => self.ensure_person(key, Some(entry), None),
        };
        Some(idx)
    }

    /// Re-key a row created from a phone-only sale once the same phone shows
    /// up under a person id, so merging does not depend on event order.
    fn adopt_phone_row(&mut self, key: &PersonKey, seeded: &AggregatedPerson) -> Option<usize> {
        let idx = *self.by_phone.get(seeded.phone.as_deref()?)?;
        let row = &mut self.people[idx];
        if !matches!(row.person_key, PersonKey::Phone(_)) {
            return None;
        }

        let old_key = std::mem::replace(&mut row.person_key, key.clone());
        row.person_id = seeded.person_id.clone();
        if row.name == UNKNOWN_NAME {
            row.name = seeded.name.clone();
        }
        row.store_name = row.store_name.take().or_else(|| seeded.store_name.clone());
        row.region = row.region.take().or_else(|| seeded.region.clone());

        self.by_key.remove(&old_key);
        self.by_key.insert(key.clone(), idx);
        Some(idx)
    }

    /// Add a sale price; false when the total would leave the money range.
    fn add_sale(&mut self, idx: usize, price: &Money) -> bool {
        let person = &mut self.people[idx];
        match person.total_sales_amount.checked_add(price) {
            Ok(total) => {
                person.total_sales_amount = total;
                person.sale_count += 1;
                true
            }
            Err(_) => false,
        }
    }

    fn apply_bonus_once(&mut self, idx: usize, stats: &mut AggregationStats) {
        let bonus = self.rules.stackable_bonus;
        let person = &mut self.people[idx];
        if person.bonus_applied {
            return;
        }
        match person.total_sales_amount.checked_add(&bonus) {
            Ok(total) => {
                person.total_sales_amount = total;
                person.bonus_applied = true;
            }
            Err(_) => {
                tracing::warn!(
                    person = %person.person_key,
                    "Stackable bonus exceeds the money limit"
                );
                stats.amounts_rejected += 1;
            }
        }
    }

    fn apply_manual_bonus(&mut self, idx: usize, stats: &mut AggregationStats) {
        let bonus = self.rules.manual_bonus;
        let person = &mut self.people[idx];
        if person.manual_bonus_applied {
            return;
        }
        match person.total_sales_amount.checked_add(&bonus) {
            Ok(total) => {
                person.total_sales_amount = total;
                person.manual_bonus_applied = true;
            }
            Err(_) => {
                tracing::warn!(
                    person = %person.person_key,
                    "Manual bonus exceeds the money limit"
                );
                stats.amounts_rejected += 1;
            }
        }
    }

    /// Assign ranks and sort by total descending (stable on ties).
    fn finish(self) -> Vec<AggregatedPerson> {
        let rules = self.rules;
        let mut people = self.people;

        for person in &mut people {
            person.rank = rules.rank_table.assign(&person.total_sales_amount).to_string();
            person.rank_override = person
                .phone
                .as_deref()
                .and_then(|phone| rules.rank_overrides.title_for(phone))
                .map(str::to_string);
        }

        people.sort_by(|a, b| b.total_sales_amount.cmp(&a.total_sales_amount));
        people
    }
}
