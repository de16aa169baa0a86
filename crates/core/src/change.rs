//! Change events emitted by the record store.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, VehicleId};
use crate::vehicle::Vehicle;

/// Kind of mutation that produced a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
}

/// One entry of the store's change feed.
///
/// Insert and update events carry the full record. Delete events carry only
/// the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub operation: ChangeOperation,
    pub vehicle_id: VehicleId,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
    pub timestamp: Timestamp,
}

impl ChangeEvent {
    pub fn inserted(vehicle: &Vehicle) -> Self {
        Self::with_record(ChangeOperation::Insert, vehicle)
    }

    pub fn updated(vehicle: &Vehicle) -> Self {
        Self::with_record(ChangeOperation::Update, vehicle)
    }

    pub fn deleted(vehicle_id: VehicleId) -> Self {
        Self {
            operation: ChangeOperation::Delete,
            vehicle_id,
            vehicle: None,
            timestamp: Utc::now(),
        }
    }

    fn with_record(operation: ChangeOperation, vehicle: &Vehicle) -> Self {
        Self {
            operation,
            vehicle_id: vehicle.id,
            vehicle: Some(vehicle.clone()),
            timestamp: vehicle.last_updated,
        }
    }
}
