//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{middleware, Router};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use sec_incentives::api::{self, AppState};
use sec_incentives::config::IncentiveSettings;
use sec_incentives::domain::{Money, PersonRosterEntry, SaleEvent, TestSubmission};
use sec_incentives::snapshot::InMemorySnapshotSource;

/// Start of the report window used across tests
pub fn window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, d, 10, 0, 0).unwrap()
}

pub fn money(amount: i64) -> Money {
    Money::from_integer(amount).unwrap()
}

/// Paid sale on the given March day
pub fn paid_sale(person_id: &str, price: i64, d: u32) -> SaleEvent {
    SaleEvent::new(Uuid::new_v4(), person_id, money(price), day(d)).paid(day(d))
}

/// Roster entry that has a phone but no person id
pub fn phone_only_roster(phone: &str) -> PersonRosterEntry {
    PersonRosterEntry {
        person_id: None,
        phone: Some(phone.to_string()),
        name: None,
        store_name: None,
        region: None,
        has_bonus_flag: false,
    }
}

pub fn submission(person_id: &str, score: i64, submitted_at: DateTime<Utc>) -> TestSubmission {
    TestSubmission {
        submission_id: Uuid::new_v4(),
        person_id: Some(person_id.to_string()),
        phone: None,
        test_name: Some("Plan Basics".to_string()),
        score: Decimal::from(score),
        submitted_at,
    }
}

/// Three sellers across two regions, one of them on the manual bonus list
pub fn sample_source() -> InMemorySnapshotSource {
    let roster = vec![
        PersonRosterEntry::new("p1", "9000000001")
            .with_name("Asha")
            .with_store("Croma Andheri")
            .with_region("West")
            .with_bonus_flag(),
        PersonRosterEntry::new("p2", "9000000002")
            .with_name("Bilal")
            .with_store("Reliance Digital Saket")
            .with_region("North"),
        PersonRosterEntry::new("p3", "9000000003")
            .with_name("Chitra")
            .with_store("Croma Powai")
            .with_region("West"),
    ];

    let mut late = paid_sale("p2", 99_000, 5);
    late.paid_at = None;

    let events = vec![
        paid_sale("p1", 25_000, 2),
        paid_sale("p2", 40_000, 3),
        paid_sale("p2", 15_000, 4),
        paid_sale("p3", 3_000, 4),
        late,
    ];

    let submissions = vec![
        submission("p1", 80, day(2)),
        submission("p1", 80, day(6)),
        submission("p2", 90, day(1)),
        submission("p2", 60, day(7)),
    ];

    InMemorySnapshotSource::new()
        .with_events(events)
        .with_roster(roster)
        .with_submissions(submissions)
}

pub fn sample_settings() -> IncentiveSettings {
    IncentiveSettings {
        manual_bonus_phones: vec!["9000000003".to_string()],
        default_window_start: Some(window_start()),
        ..IncentiveSettings::default()
    }
}

/// Report router over an in-memory snapshot
pub fn test_app(source: InMemorySnapshotSource, settings: IncentiveSettings) -> Router {
    let state = AppState::new(Arc::new(source), settings);
    api::create_router()
        .layer(middleware::from_fn(api::middleware::logging_middleware))
        .with_state(state)
}
