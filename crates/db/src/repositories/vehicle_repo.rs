//! PostgreSQL-backed [`VehicleStore`].
//!
//! Change notifications are produced by the `notify_vehicle_change` trigger
//! (see the migrations), so nothing here publishes events explicitly.

use async_trait::async_trait;
use fleet_core::types::VehicleId;
use fleet_core::validation::validate_update;
use fleet_core::vehicle::{Vehicle, VehicleDraft, VehicleInput};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::vehicle::VehicleRow;
use crate::store::VehicleStore;

/// Column list for `vehicles` queries.
const VEHICLE_COLUMNS: &str = "\
    id, name, status, km, oil_change_due, safety_due, drivers, comment, \
    created_at, last_updated";

/// Record store over the `vehicles` table.
#[derive(Clone)]
pub struct PgVehicleStore {
    pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn list_all(&self) -> Result<Vec<Vehicle>, StoreError> {
        let query = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY name, id");
        sqlx::query_as::<_, VehicleRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
    }

    async fn get_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        let query = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1");
        sqlx::query_as::<_, VehicleRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    async fn insert_draft(&self, draft: &VehicleDraft) -> Result<Vehicle, StoreError> {
        let query = format!(
            "INSERT INTO vehicles \
                (name, status, km, oil_change_due, safety_due, drivers, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {VEHICLE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VehicleRow>(&query)
            .bind(&draft.name)
            .bind(draft.status.as_str())
            .bind(draft.km)
            .bind(draft.oil_change_due)
            .bind(draft.safety_due)
            .bind(&draft.drivers)
            .bind(&draft.comment)
            .fetch_one(&self.pool)
            .await?;
        Vehicle::try_from(row)
    }

    async fn update_by_id(
        &self,
        id: VehicleId,
        patch: &VehicleInput,
    ) -> Result<Option<Vehicle>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so the merge is validated against what gets overwritten.
        let select = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1 FOR UPDATE");
        let Some(row) = sqlx::query_as::<_, VehicleRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let current = Vehicle::try_from(row)?;

        // Dropping `tx` on a validation error rolls back.
        let draft = validate_update(&current, patch)?;

        let update = format!(
            "UPDATE vehicles SET \
                name = $2, status = $3, km = $4, oil_change_due = $5, \
                safety_due = $6, drivers = $7, comment = $8, \
                last_updated = GREATEST(clock_timestamp(), last_updated + interval '1 microsecond') \
             WHERE id = $1 \
             RETURNING {VEHICLE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VehicleRow>(&update)
            .bind(id)
            .bind(&draft.name)
            .bind(draft.status.as_str())
            .bind(draft.km)
            .bind(draft.oil_change_due)
            .bind(draft.safety_due)
            .bind(&draft.drivers)
            .bind(&draft.comment)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Vehicle::try_from(row).map(Some)
    }

    async fn replace_all(&self, drafts: &[VehicleDraft]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        // DELETE rather than TRUNCATE so the row trigger reports each removal.
        let deleted = sqlx::query("DELETE FROM vehicles")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = 0u64;
        for draft in drafts {
            inserted += sqlx::query(
                "INSERT INTO vehicles \
                    (name, status, km, oil_change_due, safety_due, drivers, comment) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&draft.name)
            .bind(draft.status.as_str())
            .bind(draft.km)
            .bind(draft.oil_change_due)
            .bind(draft.safety_due)
            .bind(&draft.drivers)
            .bind(&draft.comment)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        tracing::info!(deleted, inserted, "Vehicle collection replaced");
        Ok(inserted)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
