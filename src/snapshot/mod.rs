//! Snapshot module
//!
//! The persistence collaborator of the report layer. A snapshot is the set
//! of sale events and roster entries one report run aggregates; the caller
//! fetches it once and hands it to the engine.

mod error;
mod memory;
mod postgres;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{normalize_phone, PersonRosterEntry, SaleEvent, TestSubmission};
use crate::engine::ReportWindow;

pub use error::SnapshotError;
pub use memory::InMemorySnapshotSource;
pub use postgres::PgSnapshotSource;

/// Source of report inputs.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Paid sale events with `date_of_sale` inside the window
    async fn sale_events(&self, window: &ReportWindow) -> Result<Vec<SaleEvent>, SnapshotError>;

    /// Roster entries matching any person id or phone, plus every
    /// bonus-flagged entry
    async fn roster(
        &self,
        person_ids: &[String],
        phones: &[String],
    ) -> Result<Vec<PersonRosterEntry>, SnapshotError>;

    /// Certification attempts, optionally for a single test
    async fn test_submissions(
        &self,
        test_name: Option<&str>,
    ) -> Result<Vec<TestSubmission>, SnapshotError>;
}

/// Inputs for one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct IncentiveSnapshot {
    pub events: Vec<SaleEvent>,
    pub roster: Vec<PersonRosterEntry>,
}

/// Load the events in `window` and every roster entry they, or the manual
/// bonus phones, can resolve to.
pub async fn load_snapshot(
    source: &dyn SnapshotSource,
    window: &ReportWindow,
    manual_bonus_phones: &[String],
) -> Result<IncentiveSnapshot, SnapshotError> {
    let events = source.sale_events(window).await?;

    let person_ids: Vec<String> = events
        .iter()
        .filter_map(|e| e.person_id().map(str::to_string))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let phones: Vec<String> = events
        .iter()
        .filter_map(SaleEvent::normalized_phone)
        .chain(manual_bonus_phones.iter().filter_map(|p| normalize_phone(p)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let roster = source.roster(&person_ids, &phones).await?;

    Ok(IncentiveSnapshot { events, roster })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_load_snapshot_pulls_relevant_roster() {
        let day = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        let source = InMemorySnapshotSource::new()
            .with_events(vec![
                SaleEvent::new(Uuid::new_v4(), "p1", Money::from_integer(100).unwrap(), day)
                    .paid(day),
                SaleEvent::new(Uuid::new_v4(), "p2", Money::from_integer(100).unwrap(), day),
            ])
            .with_roster(vec![
                PersonRosterEntry::new("p1", "9000000001"),
                PersonRosterEntry::new("p2", "9000000002"),
                PersonRosterEntry::new("p3", "9000000003"),
                PersonRosterEntry::new("p4", "9000000004").with_bonus_flag(),
            ]);

        let window = ReportWindow::starting_at(day);
        let snapshot = load_snapshot(&source, &window, &["9000000003 ".to_string()])
            .await
            .unwrap();

        assert_eq!(snapshot.events.len(), 1);
        let ids: Vec<_> = snapshot.roster.iter().filter_map(|r| r.person_id()).collect();
        assert_eq!(ids, vec!["p1", "p3", "p4"]);
    }
}
