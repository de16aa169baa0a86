//! The vehicle record and its request payloads.
//!
//! [`Vehicle`] is the persisted shape. [`VehicleInput`] is the loosely-typed
//! payload accepted by create and update requests; it becomes a
//! [`VehicleDraft`] only after passing [`crate::validation::validate`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{Timestamp, VehicleId};
use crate::validation::{is_known_status, is_safety_due_date, no_blank_drivers, not_blank};

// ---------------------------------------------------------------------------
// VehicleStatus
// ---------------------------------------------------------------------------

/// Operational state of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleStatus {
    OnRoad,
    InShop,
    OutOfService,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 3] = [
        VehicleStatus::OnRoad,
        VehicleStatus::InShop,
        VehicleStatus::OutOfService,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::OnRoad => "on-road",
            VehicleStatus::InShop => "in-shop",
            VehicleStatus::OutOfService => "out-of-service",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for VehicleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Vehicle
// ---------------------------------------------------------------------------

/// A persisted vehicle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub status: VehicleStatus,
    /// Odometer reading in kilometers.
    pub km: f64,
    /// Odometer reading at which the next oil change is due.
    pub oil_change_due: f64,
    pub safety_due: NaiveDate,
    pub drivers: Vec<String>,
    pub comment: String,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl Vehicle {
    /// Build a persisted record from a validated draft.
    pub fn from_draft(id: VehicleId, draft: VehicleDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            status: draft.status,
            km: draft.km,
            oil_change_due: draft.oil_change_due,
            safety_due: draft.safety_due,
            drivers: draft.drivers,
            comment: draft.comment,
            created_at: now,
            last_updated: now,
        }
    }

    /// Express this record as a fully-populated input payload.
    pub fn to_input(&self) -> VehicleInput {
        VehicleInput {
            name: Some(self.name.clone()),
            status: Some(self.status.as_str().to_string()),
            km: Some(self.km),
            oil_change_due: Some(self.oil_change_due),
            safety_due: Some(self.safety_due.format("%Y-%m-%d").to_string()),
            drivers: Some(self.drivers.clone()),
            comment: Some(self.comment.clone()),
        }
    }

    /// Overwrite the mutable fields with a validated draft.
    ///
    /// `id` and `created_at` never change; `last_updated` is left to the
    /// caller so the store controls the clock.
    pub fn apply(&mut self, draft: VehicleDraft) {
        self.name = draft.name;
        self.status = draft.status;
        self.km = draft.km;
        self.oil_change_due = draft.oil_change_due;
        self.safety_due = draft.safety_due;
        self.drivers = draft.drivers;
        self.comment = draft.comment;
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Create or update payload as received from a client.
///
/// Every field is optional so the same type serves full creates and partial
/// updates. Values are kept loosely typed (`status` and `safetyDue` as text)
/// so that bad values surface as field violations instead of decode errors.
/// Unknown fields such as `id` or `lastUpdated` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    #[validate(
        required(message = "name is required"),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "status is required"),
        custom(function = "is_known_status")
    )]
    pub status: Option<String>,

    #[validate(
        required(message = "km is required"),
        range(min = 0.0, message = "km must not be negative")
    )]
    pub km: Option<f64>,

    #[validate(
        required(message = "oilChangeDue is required"),
        range(min = 0.0, message = "oilChangeDue must not be negative")
    )]
    pub oil_change_due: Option<f64>,

    #[validate(
        required(message = "safetyDue is required"),
        custom(function = "is_safety_due_date")
    )]
    pub safety_due: Option<String>,

    #[validate(
        required(message = "drivers is required"),
        length(min = 1, message = "at least one driver is required"),
        custom(function = "no_blank_drivers")
    )]
    pub drivers: Option<Vec<String>>,

    pub comment: Option<String>,
}

impl VehicleInput {
    /// Merge this payload over an existing record.
    ///
    /// Fields present in `self` win; absent fields keep the current value.
    pub fn merged_over(&self, current: &Vehicle) -> VehicleInput {
        let base = current.to_input();
        VehicleInput {
            name: self.name.clone().or(base.name),
            status: self.status.clone().or(base.status),
            km: self.km.or(base.km),
            oil_change_due: self.oil_change_due.or(base.oil_change_due),
            safety_due: self.safety_due.clone().or(base.safety_due),
            drivers: self.drivers.clone().or(base.drivers),
            comment: self.comment.clone().or(base.comment),
        }
    }
}

/// A validated, strongly-typed vehicle ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDraft {
    pub name: String,
    pub status: VehicleStatus,
    pub km: f64,
    pub oil_change_due: f64,
    pub safety_due: NaiveDate,
    pub drivers: Vec<String>,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample() -> Vehicle {
        Vehicle {
            id: 7,
            name: "Bus 101".into(),
            status: VehicleStatus::OnRoad,
            km: 125_000.0,
            oil_change_due: 130_000.0,
            safety_due: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            drivers: vec!["John Smith".into()],
            comment: String::new(),
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in VehicleStatus::ALL {
            assert_eq!(status.as_str().parse::<VehicleStatus>().unwrap(), status);
        }
        assert!("parked".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn vehicle_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["oilChangeDue"], 130_000.0);
        assert_eq!(json["safetyDue"], "2024-12-31");
        assert_eq!(json["status"], "on-road");
        assert!(json.get("lastUpdated").is_some());
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let current = sample();
        let patch = VehicleInput {
            km: Some(126_000.0),
            ..Default::default()
        };

        let merged = patch.merged_over(&current);

        assert_eq!(merged.km, Some(126_000.0));
        assert_eq!(merged.name.as_deref(), Some("Bus 101"));
        assert_eq!(merged.drivers, Some(vec!["John Smith".to_string()]));
        assert_eq!(merged.safety_due.as_deref(), Some("2024-12-31"));
    }

    #[test]
    fn input_ignores_unknown_fields() {
        let input: VehicleInput =
            serde_json::from_str(r#"{"id": 99, "lastUpdated": "x", "km": 5}"#).unwrap();
        assert_eq!(input.km, Some(5.0));
        assert!(input.name.is_none());
    }
}
