//! Delivery domain model.
//!
//! # Responsibility
//! - Define the scheduled delivery record and its cost/status value types.
//!
//! # Invariants
//! - Identity is the integer `id`; ids are assigned once and never reused.
//! - `client` is a value copy of the referenced client, refreshed by the
//!   client-edit cascade rather than shared by pointer.
//! - `remarks` is never blank.

use crate::model::client::Client;
use crate::model::error::EntityKind;
use crate::model::tag::Tag;
use crate::model::unique_list::Identified;
use crate::model::validation::ValidationError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable delivery identifier, starting at 1.
pub type DeliveryId = u32;

/// Display/parse format for scheduled date-times.
pub const DELIVERY_DATE_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Delivery lifecycle flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Undelivered,
    Delivered,
}

impl DeliveryStatus {
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undelivered => "undelivered",
            Self::Delivered => "delivered",
        }
    }
}

/// Non-negative money amount kept as integer cents.
///
/// Serialized as a decimal string (`"12.50"`) so files never carry float
/// rounding noise.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Cost {
    cents: u64,
}

impl Cost {
    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub fn cents(self) -> u64 {
        self.cents
    }

    /// Parses `"10"`, `"10.5"` or `"10.50"`; rejects signs, exponents and more
    /// than two fractional digits.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCost(value.to_string());
        let trimmed = value.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        let all_digits = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) || fraction.len() > 2 {
            return Err(invalid());
        }
        if trimmed.ends_with('.') {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => u64::from(fraction.as_bytes()[0] - b'0') * 10,
            _ => fraction.parse::<u64>().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction_cents))
            .map(Self::from_cents)
            .ok_or_else(invalid)
    }
}

impl FromStr for Cost {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Cost {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cost> for String {
    fn from(value: Cost) -> Self {
        value.to_string()
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

/// Scheduled delivery for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Identity key, assigned by the store at creation.
    pub id: DeliveryId,
    /// Value copy of the referenced client.
    pub client: Client,
    pub scheduled_at: NaiveDateTime,
    /// Free text; must not be blank.
    pub remarks: String,
    pub cost: Cost,
    pub tag: Option<Tag>,
    pub status: DeliveryStatus,
}

impl Delivery {
    /// Builds an undelivered, untagged delivery.
    pub fn new(
        id: DeliveryId,
        client: Client,
        scheduled_at: NaiveDateTime,
        remarks: impl Into<String>,
        cost: Cost,
    ) -> Self {
        Self {
            id,
            client,
            scheduled_at,
            remarks: remarks.into(),
            cost,
            tag: None,
            status: DeliveryStatus::Undelivered,
        }
    }

    pub fn with_tag(mut self, tag: Option<Tag>) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks the id, remarks and the embedded client value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id == 0 {
            return Err(ValidationError::ZeroDeliveryId);
        }
        if self.remarks.trim().is_empty() {
            return Err(ValidationError::BlankRemarks);
        }
        self.client.validate()
    }

    /// Name of the referenced client.
    pub fn client_name(&self) -> &str {
        &self.client.name
    }

    pub fn is_delivered(&self) -> bool {
        self.status.is_delivered()
    }

    /// Same delivery (same id), regardless of other fields.
    pub fn is_same_delivery(&self, other: &Delivery) -> bool {
        self.id == other.id
    }
}

impl Identified for Delivery {
    type Key = DeliveryId;
    const KIND: EntityKind = EntityKind::Delivery;

    fn identity(&self) -> &DeliveryId {
        &self.id
    }
}

impl Display for Delivery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} on {}; Remarks: {}; Cost: ${}; Status: {}",
            self.id,
            self.client.name,
            self.scheduled_at.format(DELIVERY_DATE_TIME_FORMAT),
            self.remarks,
            self.cost,
            self.status.as_str()
        )?;
        if let Some(tag) = &self.tag {
            write!(f, "; Tag: [{tag}]")?;
        }
        Ok(())
    }
}
