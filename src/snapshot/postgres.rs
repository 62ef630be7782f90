//! Postgres Snapshot Source
//!
//! Reads sale events, the SEC roster and test attempts from the reporting
//! tables. Filtering on payment and window happens in SQL; rows whose
//! amounts cannot be represented are dropped with a warning.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Money, PersonRosterEntry, SaleEvent, TestSubmission};
use crate::engine::ReportWindow;

use super::{SnapshotError, SnapshotSource};

type SaleRow = (
    Uuid,
    Option<String>,
    Option<String>,
    Option<String>,
    Decimal,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

type RosterRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
);

type SubmissionRow = (
    Uuid,
    Option<String>,
    Option<String>,
    Option<String>,
    Decimal,
    DateTime<Utc>,
);

/// Snapshot source backed by Postgres
#[derive(Debug, Clone)]
pub struct PgSnapshotSource {
    pool: PgPool,
}

impl PgSnapshotSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn sale_from_row(row: SaleRow) -> Option<SaleEvent> {
    let (id, sec_id, phone, store_id, plan_price, date_of_sale, paid_at) = row;

    let plan_price = match Money::new(plan_price) {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!(event_id = %id, error = %e, "Skipping sale with invalid plan price");
            return None;
        }
    };

    Some(SaleEvent {
        event_id: id,
        person_id: sec_id,
        phone,
        store_id,
        plan_price,
        date_of_sale,
        paid_at,
    })
}

fn roster_from_row(row: RosterRow) -> PersonRosterEntry {
    let (sec_id, phone, name, store_name, region, has_bonus_flag) = row;
    PersonRosterEntry {
        person_id: sec_id,
        phone,
        name,
        store_name,
        region,
        has_bonus_flag,
    }
}

fn submission_from_row(row: SubmissionRow) -> TestSubmission {
    let (id, sec_id, phone, test_name, score, submitted_at) = row;
    TestSubmission {
        submission_id: id,
        person_id: sec_id,
        phone,
        test_name,
        score,
        submitted_at,
    }
}

#[async_trait]
impl SnapshotSource for PgSnapshotSource {
    async fn sale_events(&self, window: &ReportWindow) -> Result<Vec<SaleEvent>, SnapshotError> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, sec_id, sec_phone, store_id, plan_price, date_of_sale, paid_at
            FROM spot_incentive_reports
            WHERE paid_at IS NOT NULL
              AND date_of_sale >= $1
              AND ($2::timestamptz IS NULL OR date_of_sale < $2)
            ORDER BY date_of_sale ASC, id ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let fetched = rows.len();
        let events: Vec<SaleEvent> = rows.into_iter().filter_map(sale_from_row).collect();

        tracing::debug!(
            fetched,
            kept = events.len(),
            window_start = %window.start,
            "Loaded sale events"
        );

        Ok(events)
    }

    async fn roster(
        &self,
        person_ids: &[String],
        phones: &[String],
    ) -> Result<Vec<PersonRosterEntry>, SnapshotError> {
        let rows: Vec<RosterRow> = sqlx::query_as(
            r#"
            SELECT sec_id, phone, name, store_name, region, has_protect_max_bonus
            FROM sec_roster
            WHERE sec_id = ANY($1)
               OR TRIM(phone) = ANY($2)
               OR has_protect_max_bonus = true
            ORDER BY created_at ASC, phone ASC
            "#,
        )
        .bind(person_ids)
        .bind(phones)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(entries = rows.len(), "Loaded roster");

        Ok(rows.into_iter().map(roster_from_row).collect())
    }

    async fn test_submissions(
        &self,
        test_name: Option<&str>,
    ) -> Result<Vec<TestSubmission>, SnapshotError> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(
            r#"
            SELECT id, sec_id, phone, test_name, score, submitted_at
            FROM test_submissions
            WHERE ($1::text IS NULL OR test_name = $1)
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(test_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(submission_from_row).collect())
    }
}
