//! Storage and change-feed traits.

use std::pin::Pin;

use async_trait::async_trait;
use fleet_core::change::ChangeEvent;
use fleet_core::types::VehicleId;
use fleet_core::validation::{validate, ValidationFailed};
use fleet_core::vehicle::{Vehicle, VehicleDraft, VehicleInput};
use futures::Stream;

use crate::error::StoreError;

/// Live stream of change events. The stream ending means the feed was
/// disconnected and must be re-established.
pub type ChangeStream = Pin<Box<dyn Stream<Item = Result<ChangeEvent, StoreError>> + Send>>;

/// The record store for vehicles.
///
/// Implementations are the sole owner of persisted state. Every successful
/// write must become visible on the backend's [`ChangeFeed`] once it is
/// durable, and never before.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// All vehicles ordered by name, then id.
    async fn list_all(&self) -> Result<Vec<Vehicle>, StoreError>;

    /// The vehicle with the given id, if any.
    async fn get_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError>;

    /// Persist an already-validated vehicle, assigning its id and timestamps.
    async fn insert_draft(&self, draft: &VehicleDraft) -> Result<Vehicle, StoreError>;

    /// Merge `patch` over the stored record, revalidate the merged result and
    /// write it, refreshing `last_updated`.
    ///
    /// Returns `Ok(None)` when no record matches. The read-merge-write runs
    /// atomically: on a validation failure the stored record is unchanged.
    async fn update_by_id(
        &self,
        id: VehicleId,
        patch: &VehicleInput,
    ) -> Result<Option<Vehicle>, StoreError>;

    /// Delete every record, then insert `drafts`. Returns the number inserted.
    async fn replace_all(&self, drafts: &[VehicleDraft]) -> Result<u64, StoreError>;

    /// Confirm the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Validate a create payload and persist it.
    async fn insert(&self, input: &VehicleInput) -> Result<Vehicle, StoreError> {
        let draft = validate(input)?;
        self.insert_draft(&draft).await
    }

    /// Validate every record, then replace the collection contents.
    ///
    /// Nothing is deleted unless all records pass validation.
    async fn bulk_replace(&self, inputs: &[VehicleInput]) -> Result<u64, StoreError> {
        let drafts = inputs
            .iter()
            .map(validate)
            .collect::<Result<Vec<_>, ValidationFailed>>()?;
        self.replace_all(&drafts).await
    }
}

/// A source of change events for the vehicle collection.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a new subscription. Only changes committed after this call
    /// returns are delivered.
    async fn subscribe(&self) -> Result<ChangeStream, StoreError>;
}
