//! In-memory Snapshot Source
//!
//! Serves fixed records with the same filtering the Postgres source applies.
//! Used by tests and by local demos without a database.

use async_trait::async_trait;

use crate::domain::{PersonRosterEntry, SaleEvent, TestSubmission};
use crate::engine::ReportWindow;

use super::{SnapshotError, SnapshotSource};

#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotSource {
    events: Vec<SaleEvent>,
    roster: Vec<PersonRosterEntry>,
    submissions: Vec<TestSubmission>,
}

impl InMemorySnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: Vec<SaleEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_roster(mut self, roster: Vec<PersonRosterEntry>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_submissions(mut self, submissions: Vec<TestSubmission>) -> Self {
        self.submissions = submissions;
        self
    }
}

#[async_trait]
impl SnapshotSource for InMemorySnapshotSource {
    async fn sale_events(&self, window: &ReportWindow) -> Result<Vec<SaleEvent>, SnapshotError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.is_paid() && window.contains(e.date_of_sale))
            .cloned()
            .collect())
    }

    async fn roster(
        &self,
        person_ids: &[String],
        phones: &[String],
    ) -> Result<Vec<PersonRosterEntry>, SnapshotError> {
        Ok(self
            .roster
            .iter()
            .filter(|entry| {
                entry.has_bonus_flag
                    || entry
                        .person_id()
                        .is_some_and(|id| person_ids.iter().any(|p| p == id))
                    || entry
                        .normalized_phone()
                        .is_some_and(|phone| phones.contains(&phone))
            })
            .cloned()
            .collect())
    }

    async fn test_submissions(
        &self,
        test_name: Option<&str>,
    ) -> Result<Vec<TestSubmission>, SnapshotError> {
        Ok(self
            .submissions
            .iter()
            .filter(|s| test_name.map_or(true, |name| s.test_name.as_deref() == Some(name)))
            .cloned()
            .collect())
    }
}
