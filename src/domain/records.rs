//! Input records
//!
//! Flat records supplied by the persistence layer. They are owned by the
//! POS/import flows and treated as immutable snapshots here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Money;

/// Trim a phone number for comparison. Blank input counts as absent.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A recorded plan sale credited to a salesperson (SEC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleEvent {
    pub event_id: Uuid,
    #[serde(default)]
    pub person_id: Option<String>,
    /// Phone captured on the report, used when `person_id` is missing
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub store_id: Option<String>,
    pub plan_price: Money,
    pub date_of_sale: DateTime<Utc>,
    /// Only paid (approved) sales count toward totals
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl SaleEvent {
    pub fn new(
        event_id: Uuid,
        person_id: impl Into<String>,
        plan_price: Money,
        date_of_sale: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            person_id: Some(person_id.into()),
            phone: None,
            store_id: None,
            plan_price,
            date_of_sale,
            paid_at: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    pub fn paid(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = Some(paid_at);
        self
    }

    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    pub fn person_id(&self) -> Option<&str> {
        non_blank(self.person_id.as_deref())
    }

    pub fn normalized_phone(&self) -> Option<String> {
        self.phone.as_deref().and_then(normalize_phone)
    }
}

/// A known salesperson eligible for bonus consideration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRosterEntry {
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// One-time stackable bonus eligibility (e.g. ProtectMax bonus)
    #[serde(default)]
    pub has_bonus_flag: bool,
}

impl PersonRosterEntry {
    pub fn new(person_id: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            person_id: Some(person_id.into()),
            phone: Some(phone.into()),
            name: None,
            store_name: None,
            region: None,
            has_bonus_flag: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_store(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = Some(store_name.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_bonus_flag(mut self) -> Self {
        self.has_bonus_flag = true;
        self
    }

    pub fn person_id(&self) -> Option<&str> {
        non_blank(self.person_id.as_deref())
    }

    pub fn normalized_phone(&self) -> Option<String> {
        self.phone.as_deref().and_then(normalize_phone)
    }
}

/// One attempt at an SEC certification test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSubmission {
    pub submission_id: Uuid,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub test_name: Option<String>,
    pub score: rust_decimal::Decimal,
    pub submitted_at: DateTime<Utc>,
}

impl TestSubmission {
    pub fn person_id(&self) -> Option<&str> {
        non_blank(self.person_id.as_deref())
    }

    pub fn normalized_phone(&self) -> Option<String> {
        self.phone.as_deref().and_then(normalize_phone)
    }
}
