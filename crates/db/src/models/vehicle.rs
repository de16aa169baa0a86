//! Row mapping for the `vehicles` table.

use chrono::NaiveDate;
use fleet_core::types::{Timestamp, VehicleId};
use fleet_core::vehicle::{Vehicle, VehicleStatus};
use sqlx::FromRow;

use crate::error::StoreError;

/// A row from the `vehicles` table.
///
/// `status` is stored as text and parsed into [`VehicleStatus`] on the way
/// out; see [`TryFrom<VehicleRow> for Vehicle`](Vehicle).
#[derive(Debug, Clone, FromRow)]
pub struct VehicleRow {
    pub id: VehicleId,
    pub name: String,
    pub status: String,
    pub km: f64,
    pub oil_change_due: f64,
    pub safety_due: NaiveDate,
    pub drivers: Vec<String>,
    pub comment: String,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<VehicleStatus>()
            .map_err(|e| StoreError::Corrupt {
                id: row.id,
                reason: e.to_string(),
            })?;

        Ok(Vehicle {
            id: row.id,
            name: row.name,
            status,
            km: row.km,
            oil_change_due: row.oil_change_due,
            safety_due: row.safety_due,
            drivers: row.drivers,
            comment: row.comment,
            created_at: row.created_at,
            last_updated: row.last_updated,
        })
    }
}
